//! Preprocessing and summary statistics.

use market_scan_analytics_models::{
    FieldStats, HistogramBin, ListingPoint, PRICE_BINS, RATING_BINS, ScatterPoint, Summary,
};
use market_scan_listing_models::ProductRecord;

/// Keeps rows whose price and rating are both present and greater than
/// zero.
#[must_use]
pub fn preprocess(records: &[ProductRecord]) -> Vec<ListingPoint> {
    records
        .iter()
        .filter_map(|record| match (record.price, record.rating) {
            (Some(price), Some(rating)) if price > 0.0 && rating > 0.0 => Some(ListingPoint {
                title: record.title.clone(),
                price,
                rating,
                reviews: record.review_count,
            }),
            _ => None,
        })
        .collect()
}

/// Summarizes a reloaded table.
#[must_use]
pub fn summarize(table: &str, records: &[ProductRecord]) -> Summary {
    let points = preprocess(records);

    let prices: Vec<f64> = points.iter().map(|p| p.price).collect();
    let ratings: Vec<f64> = points.iter().map(|p| p.rating).collect();
    #[allow(clippy::cast_precision_loss)]
    let reviews: Vec<f64> = points
        .iter()
        .filter_map(|p| p.reviews.map(|r| r as f64))
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let reviews_vs_rating: Vec<ScatterPoint> = points
        .iter()
        .filter_map(|p| {
            p.reviews.map(|r| ScatterPoint {
                x: r as f64,
                y: p.rating,
            })
        })
        .collect();

    Summary {
        table: table.to_owned(),
        total_rows: records.len() as u64,
        analyzed_rows: points.len() as u64,
        price: field_stats(&prices),
        rating: field_stats(&ratings),
        reviews: field_stats(&reviews),
        price_histogram: histogram(&prices, PRICE_BINS),
        rating_histogram: histogram(&ratings, RATING_BINS),
        price_vs_rating: points
            .iter()
            .map(|p| ScatterPoint {
                x: p.price,
                y: p.rating,
            })
            .collect(),
        reviews_vs_rating,
    }
}

/// Min, max, mean and median of `values`, or `None` if empty.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn field_stats(values: &[f64]) -> Option<FieldStats> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        f64::midpoint(sorted[n / 2 - 1], sorted[n / 2])
    };

    Some(FieldStats {
        min: sorted[0],
        max: sorted[n - 1],
        mean: sorted.iter().sum::<f64>() / n as f64,
        median,
    })
}

/// Splits `[min, max]` of `values` into `bins` equal-width bins.
///
/// The last bin is closed on both ends so the maximum is counted. When
/// every value is identical a single bin holds them all.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let Some(stats) = field_stats(values) else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }

    let (min, max) = (stats.min, stats.max);
    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len() as u64,
        }];
    }

    let width = (max - min) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: (i as f64).mul_add(width, min),
            upper: if i + 1 == bins {
                max
            } else {
                ((i + 1) as f64).mul_add(width, min)
            },
            count: 0,
        })
        .collect();

    for value in values {
        let index = (((value - min) / width) as usize).min(bins - 1);
        histogram[index].count += 1;
    }

    histogram
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        title: &str,
        price: Option<f64>,
        rating: Option<f64>,
        reviews: Option<i64>,
    ) -> ProductRecord {
        ProductRecord {
            price,
            rating,
            review_count: reviews,
            ..ProductRecord::titled(title)
        }
    }

    #[test]
    fn preprocess_requires_positive_price_and_rating() {
        let records = [
            record("kept", Some(9.5), Some(4.0), None),
            record("no price", None, Some(4.0), None),
            record("free", Some(0.0), Some(4.0), None),
            record("unrated", Some(9.5), Some(0.0), None),
            record("no rating", Some(9.5), None, None),
        ];

        let points = preprocess(&records);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].title, "kept");
    }

    #[test]
    fn field_stats_odd_and_even() {
        let odd = field_stats(&[3.0, 1.0, 2.0]).unwrap();
        assert!((odd.median - 2.0).abs() < f64::EPSILON);
        assert!((odd.mean - 2.0).abs() < f64::EPSILON);
        assert!((odd.min - 1.0).abs() < f64::EPSILON);
        assert!((odd.max - 3.0).abs() < f64::EPSILON);

        let even = field_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!((even.median - 2.5).abs() < f64::EPSILON);

        assert!(field_stats(&[]).is_none());
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();

        let bins = histogram(&values, PRICE_BINS);

        assert_eq!(bins.len(), PRICE_BINS);
        assert_eq!(bins.iter().map(|b| b.count).sum::<u64>(), 101);
        assert!((bins[0].lower - 0.0).abs() < f64::EPSILON);
        assert!((bins[PRICE_BINS - 1].upper - 100.0).abs() < f64::EPSILON);
        assert_eq!(bins[PRICE_BINS - 1].count, 6);
    }

    #[test]
    fn histogram_of_identical_values_is_one_bin() {
        let bins = histogram(&[4.5, 4.5, 4.5], RATING_BINS);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 3);
    }

    #[test]
    fn summary_scatter_sets_skip_missing_reviews() {
        let records = [
            record("a", Some(10.0), Some(4.0), Some(100)),
            record("b", Some(20.0), Some(4.5), None),
            record("c", None, Some(3.0), Some(7)),
        ];

        let summary = summarize("beer", &records);

        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.analyzed_rows, 2);
        assert_eq!(summary.price_vs_rating.len(), 2);
        assert_eq!(
            summary.reviews_vs_rating,
            [ScatterPoint { x: 100.0, y: 4.0 }]
        );
        let reviews = summary.reviews.unwrap();
        assert!((reviews.max - 100.0).abs() < f64::EPSILON);
        assert_eq!(
            summary.rating_histogram.iter().map(|b| b.count).sum::<u64>(),
            2
        );
    }

    #[test]
    fn summary_of_empty_table() {
        let summary = summarize("beer", &[]);
        assert_eq!(summary.analyzed_rows, 0);
        assert!(summary.price.is_none());
        assert!(summary.price_histogram.is_empty());
    }
}

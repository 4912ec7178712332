#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Result types for listing analytics.
//!
//! Everything here serializes to camelCase JSON so `analyze --json` output
//! can be fed straight into a plotting front end.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Bins in the price histogram.
pub const PRICE_BINS: usize = 20;

/// Bins in the rating histogram.
pub const RATING_BINS: usize = 10;

/// A listing that survived preprocessing: price and rating both present
/// and positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingPoint {
    pub title: String,
    pub price: f64,
    pub rating: f64,
    pub reviews: Option<i64>,
}

/// Min/max/mean/median of one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
}

/// One histogram bin. `upper` is exclusive except for the last bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// A point of a scatter plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

/// Aggregate view of one keyword table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Table the rows came from.
    pub table: String,
    /// Rows stored in the table.
    pub total_rows: u64,
    /// Rows kept by preprocessing.
    pub analyzed_rows: u64,
    /// `None` when no row survived preprocessing.
    pub price: Option<FieldStats>,
    pub rating: Option<FieldStats>,
    /// Over analyzed rows that carry a review count.
    pub reviews: Option<FieldStats>,
    pub price_histogram: Vec<HistogramBin>,
    pub rating_histogram: Vec<HistogramBin>,
    /// x = price, y = rating.
    pub price_vs_rating: Vec<ScatterPoint>,
    /// x = review count, y = rating. Rows without a review count are left
    /// out.
    pub reviews_vs_rating: Vec<ScatterPoint>,
}

/// Inclusive price and rating bounds. An unset bound defaults to the data
/// extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
}

/// Bounds a [`RangeFilter`] resolved to against a concrete data set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedRange {
    pub min_price: f64,
    pub max_price: f64,
    pub min_rating: f64,
    pub max_rating: f64,
}

/// Rows kept by a [`RangeFilter`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResult {
    /// `None` when there was nothing to filter.
    pub range: Option<ResolvedRange>,
    pub rows: Vec<ListingPoint>,
}

impl FilterResult {
    #[must_use]
    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

/// The fixed set of charts kept per keyword.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChartArtifact {
    PriceDistribution,
    PriceVsRating,
    RatingDistribution,
    ReviewsVsRating,
}

impl ChartArtifact {
    pub const ALL: &[Self] = &[
        Self::PriceDistribution,
        Self::PriceVsRating,
        Self::RatingDistribution,
        Self::ReviewsVsRating,
    ];

    /// File name inside the keyword's chart directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::PriceDistribution => "price_distribution.png",
            Self::PriceVsRating => "price_vs_rating.png",
            Self::RatingDistribution => "rating_distribution.png",
            Self::ReviewsVsRating => "reviews_vs_rating.png",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PriceDistribution => "Price distribution",
            Self::PriceVsRating => "Rating vs price",
            Self::RatingDistribution => "Rating distribution",
            Self::ReviewsVsRating => "Rating vs review count",
        }
    }
}

/// Which chart files exist for a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartReport {
    pub dir: PathBuf,
    pub present: Vec<ChartArtifact>,
    pub missing: Vec<ChartArtifact>,
}

impl ChartReport {
    /// Whether every [`ChartArtifact`] is on disk.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_file_names_match_variant_names() {
        for artifact in ChartArtifact::ALL {
            assert_eq!(
                artifact.file_name(),
                format!("{}.png", artifact.as_ref()),
                "{artifact:?}"
            );
        }
    }

    #[test]
    fn summary_serializes_camel_case() {
        let summary = Summary {
            table: "beer".to_owned(),
            total_rows: 0,
            analyzed_rows: 0,
            price: None,
            rating: None,
            reviews: None,
            price_histogram: Vec::new(),
            rating_histogram: Vec::new(),
            price_vs_rating: Vec::new(),
            reviews_vs_rating: Vec::new(),
        };

        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["analyzedRows"], 0);
        assert!(json["priceHistogram"].as_array().unwrap().is_empty());
        assert!(json["price"].is_null());
    }
}

//! Inclusive price/rating range filtering over preprocessed rows.

use market_scan_analytics_models::{FilterResult, ListingPoint, RangeFilter, ResolvedRange};

/// Resolves `range` against the extent of `rows`: unset bounds take the
/// data minimum or maximum. Returns `None` for an empty set.
#[must_use]
pub fn resolve(range: &RangeFilter, rows: &[ListingPoint]) -> Option<ResolvedRange> {
    let first = rows.first()?;
    let extent = rows.iter().fold(
        ResolvedRange {
            min_price: first.price,
            max_price: first.price,
            min_rating: first.rating,
            max_rating: first.rating,
        },
        |acc, row| ResolvedRange {
            min_price: acc.min_price.min(row.price),
            max_price: acc.max_price.max(row.price),
            min_rating: acc.min_rating.min(row.rating),
            max_rating: acc.max_rating.max(row.rating),
        },
    );

    Some(ResolvedRange {
        min_price: range.min_price.unwrap_or(extent.min_price),
        max_price: range.max_price.unwrap_or(extent.max_price),
        min_rating: range.min_rating.unwrap_or(extent.min_rating),
        max_rating: range.max_rating.unwrap_or(extent.max_rating),
    })
}

/// Keeps the rows inside `range`, bounds inclusive. A reversed bound pair
/// keeps nothing.
#[must_use]
pub fn apply(range: &RangeFilter, rows: &[ListingPoint]) -> FilterResult {
    let Some(resolved) = resolve(range, rows) else {
        return FilterResult {
            range: None,
            rows: Vec::new(),
        };
    };

    let rows = rows
        .iter()
        .filter(|row| {
            (resolved.min_price..=resolved.max_price).contains(&row.price)
                && (resolved.min_rating..=resolved.max_rating).contains(&row.rating)
        })
        .cloned()
        .collect();

    FilterResult {
        range: Some(resolved),
        rows,
    }
}

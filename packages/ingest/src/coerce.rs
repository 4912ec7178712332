//! Numeric coercion of extracted listings.
//!
//! Anything that does not parse cleanly becomes `None`. Nothing here ever
//! substitutes a zero or fails the run.

use market_scan_listing_models::{ProductRecord, RawListing};

/// Highest rating a storefront hands out.
pub const MAX_RATING: f64 = 5.0;

/// Converts one raw listing into a typed record.
#[must_use]
pub fn coerce(raw: RawListing) -> ProductRecord {
    ProductRecord {
        price: raw.price.as_deref().and_then(parse_price),
        rating: raw.rating.as_deref().and_then(parse_rating),
        review_count: raw.reviews.as_deref().and_then(parse_review_count),
        title: raw.title,
        image_url: raw.image_url,
        product_url: raw.product_url,
    }
}

/// Parses a price with thousands separators, e.g. `"1,299.00"`.
#[must_use]
pub fn parse_price(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
}

/// Parses a rating, rejecting anything outside `0..=5`.
#[must_use]
pub fn parse_rating(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|rating| (0.0..=MAX_RATING).contains(rating))
}

/// Parses a review count, rejecting negatives.
#[must_use]
pub fn parse_review_count(text: &str) -> Option<i64> {
    text.trim()
        .replace(',', "")
        .parse::<i64>()
        .ok()
        .filter(|count| *count >= 0)
}

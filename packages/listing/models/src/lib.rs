#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Product listing record types.
//!
//! A listing moves through two shapes on its way into storage:
//!
//! 1. [`RawListing`]: what the extractor pulled off the page. Numeric
//!    fields are still text and may hold anything.
//! 2. [`ProductRecord`]: the coerced form that is persisted. Numeric
//!    fields that failed to parse are `None`, never zero.
//!
//! The title is the de-duplication key for a keyword table and is never
//! missing; [`TITLE_PLACEHOLDER`] stands in when no title node was found.

use serde::{Deserialize, Serialize};

/// Title used when a result container has no title node.
pub const TITLE_PLACEHOLDER: &str = "N/A";

/// A product listing as extracted from one result container.
///
/// Every field other than `title` is independently optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawListing {
    /// Listing title, or [`TITLE_PLACEHOLDER`].
    pub title: String,
    /// Price text with the currency symbol stripped (e.g. `"12.99"`).
    pub price: Option<String>,
    /// Leading token of the rating text (e.g. `"4.5"` from `"4.5 out of 5 stars"`).
    pub rating: Option<String>,
    /// Review count text with thousands separators removed.
    pub reviews: Option<String>,
    /// Thumbnail image URL.
    pub image_url: Option<String>,
    /// Absolute product detail URL.
    pub product_url: Option<String>,
}

impl RawListing {
    /// Creates a listing with only a title set.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: None,
            rating: None,
            reviews: None,
            image_url: None,
            product_url: None,
        }
    }
}

/// A product listing after numeric coercion, as stored in a keyword table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Listing title. De-duplication key.
    pub title: String,
    /// Price in the site's currency.
    pub price: Option<f64>,
    /// Star rating in `0.0..=5.0`.
    pub rating: Option<f64>,
    /// Number of customer reviews.
    pub review_count: Option<i64>,
    /// Thumbnail image URL.
    pub image_url: Option<String>,
    /// Absolute product detail URL.
    pub product_url: Option<String>,
}

impl ProductRecord {
    /// Creates a record with only a title set.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            price: None,
            rating: None,
            review_count: None,
            image_url: None,
            product_url: None,
        }
    }
}

/// Result of persisting a batch of records into a keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersistOutcome {
    /// The table did not exist and was created with the batch.
    Created {
        /// Rows written.
        inserted: u64,
        /// Records whose title repeated an earlier record in the same batch.
        skipped: u64,
    },
    /// The table already existed; new titles were appended.
    Appended {
        /// Rows written.
        inserted: u64,
        /// Records whose title was already stored.
        skipped: u64,
    },
}

impl PersistOutcome {
    /// Number of rows written.
    #[must_use]
    pub const fn inserted(&self) -> u64 {
        match self {
            Self::Created { inserted, .. } | Self::Appended { inserted, .. } => *inserted,
        }
    }

    /// Number of records skipped because their title was already present.
    #[must_use]
    pub const fn skipped(&self) -> u64 {
        match self {
            Self::Created { skipped, .. } | Self::Appended { skipped, .. } => *skipped,
        }
    }

    /// Whether this persist created the table.
    #[must_use]
    pub const fn created_table(&self) -> bool {
        matches!(self, Self::Created { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_accessors_cover_both_branches() {
        let created = PersistOutcome::Created {
            inserted: 3,
            skipped: 1,
        };
        let appended = PersistOutcome::Appended {
            inserted: 0,
            skipped: 4,
        };

        assert_eq!(created.inserted(), 3);
        assert_eq!(created.skipped(), 1);
        assert!(created.created_table());
        assert_eq!(appended.inserted(), 0);
        assert_eq!(appended.skipped(), 4);
        assert!(!appended.created_table());
    }

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let json = serde_json::to_value(PersistOutcome::Appended {
            inserted: 1,
            skipped: 1,
        })
        .unwrap();
        assert_eq!(json["kind"], "APPENDED");
        assert_eq!(json["inserted"], 1);
    }
}

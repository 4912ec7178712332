#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Analytics over stored keyword tables.
//!
//! Reloads a table from the [`ProductStore`], drops rows without a usable
//! price and rating, and derives summary statistics, histogram bins,
//! scatter point sets and range-filtered views. Chart files are addressed
//! per table under the charts root.

pub mod charts;
pub mod filter;
pub mod stats;

use market_scan_analytics_models::{FilterResult, RangeFilter, Summary};
use market_scan_database::DbError;
use market_scan_database::store::ProductStore;
use market_scan_database::table_name::TableName;
use market_scan_listing_models::ProductRecord;
use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Nothing has been ingested for this keyword yet.
    #[error("Table {table} does not exist")]
    MissingTable {
        /// The table that was looked up.
        table: String,
    },
}

/// Loads every stored row for `keyword`.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingTable`] if the keyword has never been
/// ingested, or [`AnalyticsError::Database`] if the keyword is not a valid
/// table name or the query fails.
pub fn load(
    store: &ProductStore,
    keyword: &str,
) -> Result<(TableName, Vec<ProductRecord>), AnalyticsError> {
    let table = TableName::from_keyword(keyword)?;
    if !store.table_exists(&table)? {
        return Err(AnalyticsError::MissingTable {
            table: table.to_string(),
        });
    }

    let records = store.load(&table)?;
    if records.is_empty() {
        log::warn!("Table {table} has no rows");
    } else {
        log::info!("Loaded {} rows from {table}", records.len());
    }
    Ok((table, records))
}

/// Loads and summarizes the table for `keyword`.
///
/// # Errors
///
/// See [`load`].
pub fn analyze(store: &ProductStore, keyword: &str) -> Result<Summary, AnalyticsError> {
    let (table, records) = load(store, keyword)?;
    Ok(stats::summarize(table.as_str(), &records))
}

/// Loads the table for `keyword` and applies `range` to its preprocessed
/// rows.
///
/// # Errors
///
/// See [`load`].
pub fn filter_keyword(
    store: &ProductStore,
    keyword: &str,
    range: &RangeFilter,
) -> Result<FilterResult, AnalyticsError> {
    let (table, records) = load(store, keyword)?;
    let result = filter::apply(range, &stats::preprocess(&records));
    log::info!("{table}: {} row(s) within range", result.count());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use market_scan_listing_models::ProductRecord;

    use super::*;

    fn record(title: &str, price: Option<f64>, rating: Option<f64>) -> ProductRecord {
        ProductRecord {
            price,
            rating,
            ..ProductRecord::titled(title)
        }
    }

    fn seeded_store() -> ProductStore {
        let store = ProductStore::open_in_memory().unwrap();
        let table = TableName::from_keyword("Craft Beer").unwrap();
        store
            .persist(
                &table,
                &[
                    record("a", Some(10.0), Some(4.0)),
                    record("b", Some(20.0), Some(5.0)),
                    record("c", None, Some(3.0)),
                    record("d", Some(30.0), None),
                ],
            )
            .unwrap();
        store
    }

    #[test]
    fn analyze_counts_stored_and_analyzed_rows() {
        let store = seeded_store();

        let summary = analyze(&store, "craft-beer").unwrap();

        assert_eq!(summary.table, "craft_beer");
        assert_eq!(summary.total_rows, 4);
        assert_eq!(summary.analyzed_rows, 2);
    }

    #[test]
    fn missing_table_is_reported() {
        let store = ProductStore::open_in_memory().unwrap();

        let err = analyze(&store, "stout").unwrap_err();

        assert!(matches!(err, AnalyticsError::MissingTable { table } if table == "stout"));
    }

    #[test]
    fn filter_keyword_applies_bounds() {
        let store = seeded_store();
        let range = RangeFilter {
            min_price: Some(15.0),
            ..RangeFilter::default()
        };

        let result = filter_keyword(&store, "Craft Beer", &range).unwrap();

        assert_eq!(result.count(), 1);
        assert_eq!(result.rows[0].title, "b");
    }
}

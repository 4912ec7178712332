#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `DuckDB` storage for product listings.
//!
//! Every search keyword gets its own table in a single `DuckDB` file. The
//! table name is derived from the keyword by [`table_name::table_name`], validated
//! before use, and always quoted in SQL. Title lookups are parameterized.

pub mod db;
pub mod paths;
pub mod store;
pub mod table_name;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// `DuckDB` query or connection error.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// Filesystem error while preparing the data directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A keyword produced an identifier that is unsafe to use as a table
    /// name.
    #[error("Invalid table name {name:?}: {reason}")]
    InvalidTableName {
        /// The offending identifier.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

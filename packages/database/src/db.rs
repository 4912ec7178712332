//! Database connection utilities.

use std::path::Path;

use duckdb::Connection;

use crate::DbError;

/// Opens (or creates) the listing `DuckDB` at `path`, creating the parent
/// directory if needed.
///
/// # Errors
///
/// Returns [`DbError`] if the directory or connection cannot be created.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        crate::paths::ensure_dir(parent)?;
    }

    let conn = Connection::open(path)?;
    log::debug!("Opened listing database at {}", path.display());
    Ok(conn)
}

/// Opens the listing database at the path given by `MARKET_SCAN_DB`, or the
/// default `data/market_scan.duckdb`.
///
/// # Errors
///
/// Returns [`DbError`] if the directory or connection cannot be created.
pub fn open_from_env() -> Result<Connection, DbError> {
    open(&crate::paths::db_path())
}

/// Opens a throwaway in-memory database.
///
/// # Errors
///
/// Returns [`DbError`] if `DuckDB` fails to initialise.
pub fn open_in_memory() -> Result<Connection, DbError> {
    Ok(Connection::open_in_memory()?)
}

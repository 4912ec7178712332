#![allow(clippy::module_name_repetitions)]
//! Canonical file paths for the listing database and chart artifacts.
//!
//! Defaults are relative to the workspace root; `MARKET_SCAN_DB` and
//! `MARKET_SCAN_CHARTS_DIR` override them.

use std::path::{Path, PathBuf};

use crate::table_name::TableName;

/// Returns the workspace root directory.
///
/// Resolved at compile time from `CARGO_MANIFEST_DIR`.
#[must_use]
pub fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Returns the `data/` directory path.
#[must_use]
pub fn data_dir() -> PathBuf {
    project_root().join("data")
}

/// Returns the listing database path: `MARKET_SCAN_DB` if set, otherwise
/// `data/market_scan.duckdb`.
#[must_use]
pub fn db_path() -> PathBuf {
    std::env::var_os("MARKET_SCAN_DB")
        .map_or_else(|| data_dir().join("market_scan.duckdb"), PathBuf::from)
}

/// Returns the root chart directory: `MARKET_SCAN_CHARTS_DIR` if set,
/// otherwise `charts/`.
#[must_use]
pub fn charts_root() -> PathBuf {
    std::env::var_os("MARKET_SCAN_CHARTS_DIR")
        .map_or_else(|| project_root().join("charts"), PathBuf::from)
}

/// Returns the chart directory for one keyword table.
///
/// Named after the table so the database and the chart tree address a
/// keyword the same way.
#[must_use]
pub fn chart_dir(root: &Path, table: &TableName) -> PathBuf {
    root.join(table.as_str())
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_dir_follows_table_name() {
        let table = TableName::from_keyword("Craft Beer").unwrap();
        let dir = chart_dir(Path::new("/tmp/charts"), &table);
        assert_eq!(dir, PathBuf::from("/tmp/charts/craft_beer"));
    }

    #[test]
    fn project_root_contains_packages_dir() {
        assert!(project_root().join("packages").is_dir());
    }
}

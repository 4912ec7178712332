//! Per-keyword product tables with insert-if-title-absent persistence.
//!
//! [`ProductStore::persist`] follows a two-branch protocol:
//!
//! - **Table absent**: create it, then write the batch.
//! - **Table present**: write only records whose title is not stored yet.
//!
//! In both branches each record is checked against the table before it is
//! inserted, so a title that repeats inside one batch is written once.
//! Existing rows are never updated. There is no enclosing transaction:
//! rows written before a failure stay written.

use std::path::Path;

use duckdb::Connection;
use market_scan_listing_models::{PersistOutcome, ProductRecord};

use crate::DbError;
use crate::table_name::TableName;

/// Column list shared by every keyword table.
const COLUMNS: &str = "title, price, rating, reviews, image_url, product_url";

/// Handle to the listing database.
///
/// Open one per run and drop it (or call [`ProductStore::close`]) when the
/// run is done.
pub struct ProductStore {
    conn: Connection,
}

impl ProductStore {
    /// Wraps an existing connection.
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (or creates) the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection cannot be opened.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        crate::db::open(path).map(Self::new)
    }

    /// Opens the database configured by `MARKET_SCAN_DB`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection cannot be opened.
    pub fn open_from_env() -> Result<Self, DbError> {
        crate::db::open_from_env().map(Self::new)
    }

    /// Opens a throwaway in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if `DuckDB` fails to initialise.
    pub fn open_in_memory() -> Result<Self, DbError> {
        crate::db::open_in_memory().map(Self::new)
    }

    /// Closes the connection, surfacing any error from the final flush.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if `DuckDB` reports an error while closing.
    pub fn close(self) -> Result<(), DbError> {
        self.conn.close().map_err(|(_, e)| DbError::DuckDb(e))
    }

    /// Returns whether the keyword table exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the catalog query fails.
    pub fn table_exists(&self, table: &TableName) -> Result<bool, DbError> {
        let count: i64 = self
            .conn
            .prepare(
                "SELECT COUNT(*) FROM information_schema.tables
                 WHERE table_schema = 'main' AND table_name = ?",
            )?
            .query_row([table.as_str()], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Persists `records` into `table`, creating the table if absent and
    /// skipping every record whose title is already stored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if table creation, a title lookup, or an insert
    /// fails. Records inserted before the failure remain committed.
    pub fn persist(
        &self,
        table: &TableName,
        records: &[ProductRecord],
    ) -> Result<PersistOutcome, DbError> {
        let created = !self.table_exists(table)?;
        if created {
            self.create_table(table)?;
            log::info!("Created table {table}");
        }

        let mut exists_stmt = self.conn.prepare(&format!(
            "SELECT COUNT(*) FROM {} WHERE title = ?",
            table.quoted()
        ))?;
        let mut insert_stmt = self.conn.prepare(&format!(
            "INSERT INTO {} ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?)",
            table.quoted()
        ))?;

        let mut inserted = 0u64;
        let mut skipped = 0u64;

        for record in records {
            let existing: i64 =
                exists_stmt.query_row([record.title.as_str()], |row| row.get(0))?;
            if existing > 0 {
                log::debug!("{table}: '{}' already exists, skipping", record.title);
                skipped += 1;
                continue;
            }

            insert_stmt.execute(duckdb::params![
                record.title,
                record.price,
                record.rating,
                record.review_count,
                record.image_url,
                record.product_url,
            ])?;
            log::debug!("{table}: inserted '{}'", record.title);
            inserted += 1;
        }

        log::info!("{table}: {inserted} inserted, {skipped} skipped");

        Ok(if created {
            PersistOutcome::Created { inserted, skipped }
        } else {
            PersistOutcome::Appended { inserted, skipped }
        })
    }

    fn create_table(&self, table: &TableName) -> Result<(), DbError> {
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                title TEXT NOT NULL,
                price DOUBLE,
                rating DOUBLE,
                reviews BIGINT,
                image_url TEXT,
                product_url TEXT
            );",
            table.quoted()
        ))?;
        Ok(())
    }

    /// Drops the keyword table with all its rows.
    ///
    /// Returns `false` if the table did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the catalog query or the drop fails.
    pub fn drop_table(&self, table: &TableName) -> Result<bool, DbError> {
        if !self.table_exists(table)? {
            log::warn!("Table {table} does not exist");
            return Ok(false);
        }
        self.conn
            .execute_batch(&format!("DROP TABLE {};", table.quoted()))?;
        log::info!("Dropped table {table}");
        Ok(true)
    }

    /// Loads every row of the keyword table in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the table does not exist or the query fails.
    pub fn load(&self, table: &TableName) -> Result<Vec<ProductRecord>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM {} ORDER BY rowid",
            table.quoted()
        ))?;
        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(ProductRecord {
                title: row.get(0)?,
                price: row.get(1)?,
                rating: row.get(2)?,
                review_count: row.get(3)?,
                image_url: row.get(4)?,
                product_url: row.get(5)?,
            });
        }

        Ok(records)
    }

    /// Returns the number of rows in the keyword table.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the table does not exist or the query fails.
    pub fn row_count(&self, table: &TableName) -> Result<u64, DbError> {
        let count: i64 = self
            .conn
            .prepare(&format!("SELECT COUNT(*) FROM {}", table.quoted()))?
            .query_row([], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Lists every keyword table, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the catalog query fails.
    pub fn list_tables(&self) -> Result<Vec<String>, DbError> {
        let mut stmt = self.conn.prepare(
            "SELECT table_name FROM information_schema.tables
             WHERE table_schema = 'main' AND table_type = 'BASE TABLE'
             ORDER BY table_name",
        )?;
        let mut rows = stmt.query([])?;
        let mut names = Vec::new();

        while let Some(row) = rows.next()? {
            names.push(row.get(0)?);
        }

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(keyword: &str) -> TableName {
        TableName::from_keyword(keyword).unwrap()
    }

    fn titles(store: &ProductStore, table: &TableName) -> Vec<String> {
        let mut titles: Vec<String> = store
            .load(table)
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        titles.sort();
        titles
    }

    fn priced(title: &str, price: f64) -> ProductRecord {
        ProductRecord {
            price: Some(price),
            ..ProductRecord::titled(title)
        }
    }

    #[test]
    fn creates_table_then_skips_everything_on_rerun() {
        let store = ProductStore::open_in_memory().unwrap();
        let beer = table("beer");
        let batch = vec![
            ProductRecord::titled("A"),
            ProductRecord::titled("B"),
            ProductRecord::titled("C"),
        ];

        assert!(!store.table_exists(&beer).unwrap());
        let first = store.persist(&beer, &batch).unwrap();
        assert_eq!(
            first,
            PersistOutcome::Created {
                inserted: 3,
                skipped: 0
            }
        );
        assert!(store.table_exists(&beer).unwrap());

        let second = store.persist(&beer, &batch).unwrap();
        assert_eq!(
            second,
            PersistOutcome::Appended {
                inserted: 0,
                skipped: 3
            }
        );
        assert_eq!(store.row_count(&beer).unwrap(), 3);
    }

    #[test]
    fn appends_only_new_titles() {
        let store = ProductStore::open_in_memory().unwrap();
        let beer = table("beer");
        store
            .persist(&beer, &[ProductRecord::titled("A"), ProductRecord::titled("B")])
            .unwrap();

        let outcome = store
            .persist(&beer, &[ProductRecord::titled("B"), ProductRecord::titled("C")])
            .unwrap();

        assert_eq!(
            outcome,
            PersistOutcome::Appended {
                inserted: 1,
                skipped: 1
            }
        );
        assert_eq!(titles(&store, &beer), ["A", "B", "C"]);
    }

    #[test]
    fn existing_rows_are_never_refreshed() {
        let store = ProductStore::open_in_memory().unwrap();
        let beer = table("beer");
        store.persist(&beer, &[priced("A", 10.0)]).unwrap();
        store.persist(&beer, &[priced("A", 99.0)]).unwrap();

        let rows = store.load(&beer).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, Some(10.0));
    }

    #[test]
    fn repeated_title_within_new_batch_is_written_once() {
        let store = ProductStore::open_in_memory().unwrap();
        let beer = table("beer");

        let outcome = store
            .persist(
                &beer,
                &[
                    ProductRecord::titled("X"),
                    ProductRecord::titled("Y"),
                    ProductRecord::titled("X"),
                ],
            )
            .unwrap();

        assert_eq!(
            outcome,
            PersistOutcome::Created {
                inserted: 2,
                skipped: 1
            }
        );
        assert_eq!(titles(&store, &beer), ["X", "Y"]);
    }

    #[test]
    fn round_trips_missing_values_as_null() {
        let store = ProductStore::open_in_memory().unwrap();
        let beer = table("beer");
        let full = ProductRecord {
            title: "Full".to_owned(),
            price: Some(12.5),
            rating: Some(4.5),
            review_count: Some(1234),
            image_url: Some("https://img.example/full.jpg".to_owned()),
            product_url: Some("https://shop.example/dp/1".to_owned()),
        };
        let bare = ProductRecord::titled("Bare");

        store.persist(&beer, &[full.clone(), bare.clone()]).unwrap();

        assert_eq!(store.load(&beer).unwrap(), vec![full, bare]);
    }

    #[test]
    fn titles_with_quotes_are_bound_not_interpolated() {
        let store = ProductStore::open_in_memory().unwrap();
        let beer = table("beer");
        let tricky = ProductRecord::titled("O'Doul's \"Amber\"; DROP TABLE beer; --");

        store.persist(&beer, &[tricky.clone()]).unwrap();
        let outcome = store.persist(&beer, &[tricky]).unwrap();

        assert_eq!(outcome.skipped(), 1);
        assert!(store.table_exists(&beer).unwrap());
        assert_eq!(store.row_count(&beer).unwrap(), 1);
    }

    #[test]
    fn keyword_tables_are_independent() {
        let store = ProductStore::open_in_memory().unwrap();
        store
            .persist(&table("beer"), &[ProductRecord::titled("A")])
            .unwrap();
        let outcome = store
            .persist(&table("Craft Beer"), &[ProductRecord::titled("A")])
            .unwrap();

        assert!(outcome.created_table());
        assert_eq!(store.list_tables().unwrap(), ["beer", "craft_beer"]);
    }

    #[test]
    fn drop_table_removes_rows_and_table() {
        let store = ProductStore::open_in_memory().unwrap();
        let beer = table("beer");
        store.persist(&beer, &[ProductRecord::titled("A")]).unwrap();

        assert!(store.drop_table(&beer).unwrap());
        assert!(!store.table_exists(&beer).unwrap());
        assert!(!store.drop_table(&beer).unwrap());

        let outcome = store.persist(&beer, &[ProductRecord::titled("A")]).unwrap();
        assert!(outcome.created_table());
    }

    #[test]
    fn empty_batch_still_creates_table() {
        let store = ProductStore::open_in_memory().unwrap();
        let beer = table("beer");

        let outcome = store.persist(&beer, &[]).unwrap();

        assert_eq!(
            outcome,
            PersistOutcome::Created {
                inserted: 0,
                skipped: 0
            }
        );
        assert_eq!(store.row_count(&beer).unwrap(), 0);
    }

    #[test]
    fn failed_insert_keeps_earlier_rows() {
        let store = ProductStore::open_in_memory().unwrap();
        let beer = table("beer");
        store
            .conn
            .execute_batch(
                "CREATE TABLE beer (
                    title TEXT NOT NULL,
                    price DOUBLE CHECK (price < 100),
                    rating DOUBLE,
                    reviews BIGINT,
                    image_url TEXT,
                    product_url TEXT
                );",
            )
            .unwrap();

        let result = store.persist(
            &beer,
            &[priced("A", 5.0), priced("B", 500.0), priced("C", 7.0)],
        );

        assert!(matches!(result, Err(DbError::DuckDb(_))), "{result:?}");
        assert_eq!(store.row_count(&beer).unwrap(), 1);
        assert_eq!(titles(&store, &beer), ["A"]);
    }

    #[test]
    fn persists_across_reopen() {
        let dir = std::env::temp_dir().join("market_scan_store_test_reopen");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("listings.duckdb");
        let beer = table("beer");

        let store = ProductStore::open(&path).unwrap();
        store.persist(&beer, &[ProductRecord::titled("A")]).unwrap();
        store.close().unwrap();

        let store = ProductStore::open(&path).unwrap();
        let outcome = store.persist(&beer, &[ProductRecord::titled("A")]).unwrap();
        assert_eq!(
            outcome,
            PersistOutcome::Appended {
                inserted: 0,
                skipped: 1
            }
        );
        store.close().unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for ingesting keyword search results into per-keyword `DuckDB`
//! tables.
//!
//! One run crawls result pages `1..=N` for a keyword through an
//! [`IngestionCoordinator`], coerces the listings, and persists them with
//! [`ProductStore::persist`], which never stores a title twice.

pub mod coerce;
pub mod coordinator;
pub mod interactive;
pub mod render;

use std::sync::Arc;
use std::time::Instant;

use market_scan_database::DbError;
use market_scan_database::store::ProductStore;
use market_scan_database::table_name::TableName;
use market_scan_ingest_models::{IngestConfig, IngestReport, IngestStatus, ProgressCallback};
use market_scan_scraper::extract::RecordExtractor;
use market_scan_scraper::fetch::HttpPageFetcher;
use market_scan_scraper::site::{SiteDefinition, resolve_site};
use market_scan_scraper::{PageFetcher, ScrapeError};

pub use coordinator::{CrawlResult, IngestionCoordinator};

/// Errors that end an ingestion run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Every page failed or came back empty.
    #[error("No data obtained for '{keyword}'")]
    NoData {
        /// Keyword that was searched.
        keyword: String,
        /// Pages whose fetch failed.
        failed_pages: Vec<u32>,
    },

    /// The store rejected the table name or a write.
    #[error("Persist error: {0}")]
    Persist(#[from] DbError),

    /// The site definition could not be turned into a fetcher or extractor.
    #[error("Scrape error: {0}")]
    Scrape(#[from] ScrapeError),
}

impl IngestError {
    /// Outcome category for a failed run.
    #[must_use]
    pub const fn status(&self) -> IngestStatus {
        match self {
            Self::NoData { .. } => IngestStatus::NoData,
            Self::Persist(_) | Self::Scrape(_) => IngestStatus::InsertFailed,
        }
    }
}

/// Trims surrounding whitespace from a user-supplied keyword.
///
/// Every entry point runs keywords through this so the same keyword always
/// maps to the same table. Doubles as a `clap` value parser.
///
/// # Errors
///
/// Returns an error message if nothing is left after trimming.
pub fn normalize_keyword(input: &str) -> Result<String, String> {
    let keyword = input.trim();
    if keyword.is_empty() {
        return Err("keyword cannot be empty".to_owned());
    }
    Ok(keyword.to_owned())
}

/// Outcome category for any run result.
#[must_use]
pub const fn status_of(result: &Result<IngestReport, IngestError>) -> IngestStatus {
    match result {
        Ok(report) => report.status(),
        Err(e) => e.status(),
    }
}

/// Crawls `keyword` with `coordinator` and persists the records into the
/// keyword's table in `store`.
///
/// The table name is validated before any page is fetched.
///
/// # Errors
///
/// Returns [`IngestError::Persist`] if the keyword maps to an invalid table
/// name or the store fails, and [`IngestError::NoData`] if the crawl
/// produced no records. Nothing is written in the `NoData` case.
pub async fn ingest_keyword<F: PageFetcher>(
    store: &ProductStore,
    coordinator: &IngestionCoordinator<F>,
    keyword: &str,
    max_pages: u32,
) -> Result<IngestReport, IngestError> {
    let start = Instant::now();
    let table = TableName::from_keyword(keyword)?;
    log::info!("Ingesting '{keyword}' ({max_pages} page(s)) into table {table}");

    let crawl = coordinator.run(keyword, max_pages).await?;
    if !crawl.failed_pages.is_empty() {
        log::warn!(
            "{keyword}: {} page(s) failed: {:?}",
            crawl.failed_pages.len(),
            crawl.failed_pages
        );
    }

    let outcome = store.persist(&table, &crawl.records).inspect_err(|e| {
        log::error!("{keyword}: failed to store records in {table}: {e}");
    })?;

    let elapsed = start.elapsed();
    log::info!(
        "Ingest complete for '{keyword}': {} inserted, {} skipped, took {:.1}s",
        outcome.inserted(),
        outcome.skipped(),
        elapsed.as_secs_f64()
    );

    Ok(IngestReport {
        keyword: keyword.to_owned(),
        table: table.to_string(),
        pages_requested: max_pages,
        failed_pages: crawl.failed_pages,
        records_fetched: crawl.records.len() as u64,
        outcome,
        duration: elapsed,
    })
}

/// Builds the HTTP coordinator for `site`.
///
/// # Errors
///
/// Returns [`IngestError::Scrape`] if the site's headers, URLs or selectors
/// are invalid.
pub fn http_coordinator(
    site: &SiteDefinition,
    progress: Arc<dyn ProgressCallback>,
) -> Result<IngestionCoordinator<HttpPageFetcher>, IngestError> {
    let fetcher = HttpPageFetcher::new(site)?;
    let extractor = RecordExtractor::new(site)?;
    Ok(IngestionCoordinator::new(fetcher, extractor, site.pacing).with_progress(progress))
}

/// Runs one full ingestion over HTTP as described by `config`.
///
/// # Errors
///
/// See [`ingest_keyword`] and [`http_coordinator`]. An unknown site id is
/// reported as [`IngestError::Scrape`].
pub async fn run_ingest(
    store: &ProductStore,
    config: &IngestConfig,
    progress: Arc<dyn ProgressCallback>,
) -> Result<IngestReport, IngestError> {
    let site = resolve_site(config.site.as_deref())?;
    log::info!("Using site {} ({})", site.name, site.id);
    let coordinator = http_coordinator(&site, progress)?;
    ingest_keyword(store, &coordinator, &config.keyword, config.max_pages).await
}

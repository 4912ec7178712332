#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ingestion configuration, progress, and result types.

use std::sync::Arc;
use std::time::Duration;

use market_scan_listing_models::PersistOutcome;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Pages fetched when the caller does not say otherwise.
pub const DEFAULT_PAGES: u32 = 5;

/// Upper bound accepted for the page count.
pub const MAX_PAGES: u32 = 100;

/// What to ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Free-text search keyword.
    pub keyword: String,
    /// Number of result pages to fetch, starting at page 1.
    pub max_pages: u32,
    /// Site definition id; `None` resolves through `MARKET_SCAN_SITE`.
    pub site: Option<String>,
}

impl IngestConfig {
    /// Creates a config for `keyword` with [`DEFAULT_PAGES`] pages.
    #[must_use]
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            max_pages: DEFAULT_PAGES,
            site: None,
        }
    }

    /// Sets the page count, clamped to `1..=MAX_PAGES`.
    #[must_use]
    pub fn with_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages.clamp(1, MAX_PAGES);
        self
    }

    /// Selects a site definition by id.
    #[must_use]
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }
}

/// Result of a completed ingestion run that reached the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Keyword as entered.
    pub keyword: String,
    /// Table the records were persisted into.
    pub table: String,
    /// Number of pages requested.
    pub pages_requested: u32,
    /// Pages whose fetch failed and were skipped.
    pub failed_pages: Vec<u32>,
    /// Records extracted across all pages, duplicates included.
    pub records_fetched: u64,
    /// What the store did with them.
    pub outcome: PersistOutcome,
    /// Wall-clock time of the whole run.
    pub duration: Duration,
}

impl IngestReport {
    /// Outcome category of this run.
    #[must_use]
    pub const fn status(&self) -> IngestStatus {
        IngestStatus::from_outcome(&self.outcome)
    }
}

/// The four outcome categories a run can end in.
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
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestStatus {
    /// Records persisted and none skipped.
    Success,
    /// Records persisted, at least one skipped as already present.
    DuplicatesSkipped,
    /// No records after all pages.
    NoData,
    /// The run failed before or while storing: an invalid table name, an
    /// unusable site definition, or a store error.
    InsertFailed,
}

impl IngestStatus {
    /// Categorizes a persist outcome.
    #[must_use]
    pub const fn from_outcome(outcome: &PersistOutcome) -> Self {
        if outcome.skipped() > 0 {
            Self::DuplicatesSkipped
        } else {
            Self::Success
        }
    }

    /// Process exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::InsertFailed => 1,
            Self::NoData => 2,
            Self::DuplicatesSkipped => 3,
        }
    }

    /// Human-readable summary for this category.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Success => "Scrape complete: all records were stored.",
            Self::DuplicatesSkipped => {
                "Scrape complete: some records already existed and were skipped."
            }
            Self::NoData => {
                "Scrape finished but no data was obtained. Check the keyword or the network connection."
            }
            Self::InsertFailed => "Ingestion failed.",
        }
    }
}

/// Trait for reporting progress from long-running operations.
///
/// Implementations must be `Send + Sync` so one can be shared through an
/// `Arc` across await points.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work (enables percentage/ETA).
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);

    /// Mark progress as complete and remove the progress indicator.
    fn finish_and_clear(&self);
}

/// A [`ProgressCallback`] that ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

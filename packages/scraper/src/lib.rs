#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Search-results scraping for product listings.
//!
//! Provides the [`PageFetcher`] trait with an HTTP implementation
//! ([`fetch::HttpPageFetcher`]), the [`extract::RecordExtractor`] that turns
//! one results page into [`RawListing`]s, and the embedded [`site`]
//! registry describing each supported storefront.
//!
//! This crate knows nothing about storage. It fetches pages and pulls raw
//! text out of them; numeric coercion and persistence happen downstream.
//!
//! [`RawListing`]: market_scan_listing_models::RawListing

pub mod extract;
pub mod fetch;
pub mod site;

/// Errors that can occur during scraping operations.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Numeric HTTP status code.
        status: u16,
        /// The URL that was requested.
        url: String,
    },

    /// A selector or URL could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A site definition is missing or malformed.
    #[error("Config error: {0}")]
    Config(String),
}

/// Fetches one page of search results for a keyword.
///
/// Implementations return the raw markup of the page. A failed fetch is
/// reported as an error and never retried here; the caller decides whether
/// the run continues.
pub trait PageFetcher: Send + Sync {
    /// Fetches the 1-indexed results page `page` for `keyword`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] if the request fails or the server answers
    /// with a non-2xx status.
    fn fetch_page(
        &self,
        keyword: &str,
        page: u32,
    ) -> impl std::future::Future<Output = Result<String, ScrapeError>> + Send;
}

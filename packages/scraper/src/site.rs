//! Storefront definitions loaded from embedded TOML configs.
//!
//! Each `.toml` file in `packages/scraper/sites/` is baked into the binary
//! at compile time via [`include_str!`]. Adding a storefront means adding a
//! TOML file and listing it below.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::ScrapeError;

/// Site used when none is requested explicitly.
pub const DEFAULT_SITE_ID: &str = "amazon_us";

/// TOML configs embedded at compile time.
const SITE_TOMLS: &[(&str, &str)] = &[
    ("amazon_us", include_str!("../sites/amazon_us.toml")),
    ("amazon_uk", include_str!("../sites/amazon_uk.toml")),
];

/// Everything needed to fetch and parse one storefront's search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteDefinition {
    /// Unique identifier (e.g. `"amazon_us"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Origin that relative product links are resolved against.
    pub base_url: String,
    /// Path of the search endpoint, relative to `base_url`.
    pub search_path: String,
    /// Query parameter carrying the keyword.
    pub keyword_param: String,
    /// Query parameter carrying the 1-indexed page number.
    pub page_param: String,
    /// Currency symbol stripped from price text.
    #[serde(default)]
    pub currency_symbol: String,
    /// Fixed request headers sent with every page fetch.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// CSS selectors for result containers and their fields.
    pub selectors: SelectorConfig,
    /// Courtesy delay between successive page fetches.
    #[serde(default)]
    pub pacing: PacingConfig,
}

impl SiteDefinition {
    /// Absolute URL of the search endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Parse`] if `base_url` or `search_path` do not
    /// form a valid URL.
    pub fn search_url(&self) -> Result<reqwest::Url, ScrapeError> {
        self.base()?.join(&self.search_path).map_err(|e| {
            ScrapeError::Parse(format!("invalid search path '{}': {e}", self.search_path))
        })
    }

    /// Parsed `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Parse`] if `base_url` is not a valid URL.
    pub fn base(&self) -> Result<reqwest::Url, ScrapeError> {
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| ScrapeError::Parse(format!("invalid base URL '{}': {e}", self.base_url)))
    }
}

/// CSS selectors for one storefront's results markup.
///
/// The first element matching a field selector inside a container wins.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// One product listing.
    pub container: String,
    /// Title node; its text is the listing title.
    pub title: String,
    /// Price node; its text is the price.
    pub price: String,
    /// Rating node; the first token of its text is the star rating.
    pub rating: String,
    /// Review count node.
    pub reviews: String,
    /// Thumbnail `<img>`; its `src` is the image URL.
    pub image: String,
    /// Product `<a>`; its `href` is the product URL.
    pub link: String,
}

/// Inclusive range of whole seconds to wait between page fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PacingConfig {
    /// Lower bound in seconds.
    pub min_secs: u64,
    /// Upper bound in seconds.
    pub max_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_secs: 2,
            max_secs: 5,
        }
    }
}

impl PacingConfig {
    /// No delay at all. Only useful against local fixtures.
    pub const NONE: Self = Self {
        min_secs: 0,
        max_secs: 0,
    };

    /// Bounds as `(low, high)`, swapping a reversed range.
    #[must_use]
    pub const fn bounds(&self) -> (u64, u64) {
        if self.min_secs <= self.max_secs {
            (self.min_secs, self.max_secs)
        } else {
            (self.max_secs, self.min_secs)
        }
    }
}

/// Parses a site definition from TOML text.
///
/// # Errors
///
/// Returns [`ScrapeError::Config`] if the TOML is malformed or missing
/// required fields.
pub fn parse_site_toml(toml_str: &str) -> Result<SiteDefinition, ScrapeError> {
    toml::de::from_str(toml_str).map_err(|e| ScrapeError::Config(e.to_string()))
}

/// Returns all embedded site definitions.
///
/// # Panics
///
/// Panics if any embedded TOML config is malformed (the configs ship with
/// the binary, so this is caught by the registry tests).
#[must_use]
pub fn all_sites() -> Vec<SiteDefinition> {
    SITE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_site_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up a site definition by id.
///
/// # Errors
///
/// Returns [`ScrapeError::Config`] if no site with that id exists.
pub fn find_site(id: &str) -> Result<SiteDefinition, ScrapeError> {
    all_sites().into_iter().find(|s| s.id == id).ok_or_else(|| {
        ScrapeError::Config(format!(
            "Unknown site '{id}'. Available: {}",
            SITE_TOMLS
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(", ")
        ))
    })
}

/// Resolves the site to use: an explicit id, then `MARKET_SCAN_SITE`, then
/// [`DEFAULT_SITE_ID`].
///
/// # Errors
///
/// Returns [`ScrapeError::Config`] if the resolved id is unknown.
pub fn resolve_site(cli_site: Option<&str>) -> Result<SiteDefinition, ScrapeError> {
    let id = cli_site
        .map(ToOwned::to_owned)
        .or_else(|| std::env::var("MARKET_SCAN_SITE").ok())
        .unwrap_or_else(|| DEFAULT_SITE_ID.to_owned());
    find_site(&id)
}

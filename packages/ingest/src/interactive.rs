#![allow(clippy::module_name_repetitions)]

//! Interactive menu for `market_scan`.
//!
//! Provides a menu-driven interface using `dialoguer` for running every
//! subcommand without memorizing CLI flags.

use std::path::Path;

use dialoguer::{Confirm, Input, Select};
use market_scan_analytics::charts;
use market_scan_analytics_models::RangeFilter;
use market_scan_cli_utils::{IndicatifProgress, MultiProgress};
use market_scan_database::store::ProductStore;
use market_scan_database::table_name::TableName;
use market_scan_ingest_models::{DEFAULT_PAGES, IngestConfig, MAX_PAGES};
use market_scan_scraper::site::{DEFAULT_SITE_ID, all_sites};

use crate::render;

/// Top-level actions available in the interactive menu.
enum Action {
    Ingest,
    ListTables,
    Analyze,
    Filter,
    Charts,
    Drop,
    ListSites,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Ingest,
        Self::ListTables,
        Self::Analyze,
        Self::Filter,
        Self::Charts,
        Self::Drop,
        Self::ListSites,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Ingest => "Scrape a keyword",
            Self::ListTables => "List keyword tables",
            Self::Analyze => "Summarize a keyword",
            Self::Filter => "Filter a keyword by price and rating",
            Self::Charts => "Show chart directory",
            Self::Drop => "Drop a keyword table",
            Self::ListSites => "List sites",
        }
    }
}

/// Runs the interactive menu and returns the process exit code.
///
/// `db` overrides the database path the same way `--db` does.
///
/// # Errors
///
/// Returns an error if a prompt fails, the database cannot be opened, or a
/// selected read-only operation fails. Ingestion failures are reported
/// through the exit code instead.
pub async fn run(
    db: Option<&Path>,
    multi: &MultiProgress,
) -> Result<u8, Box<dyn std::error::Error>> {
    let store = match db {
        Some(path) => ProductStore::open(path)?,
        None => ProductStore::open_from_env()?,
    };

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    let code = match Action::ALL[idx] {
        Action::Ingest => ingest(&store, multi).await?,
        Action::ListTables => {
            render::tables(&store)?;
            0
        }
        Action::Analyze => {
            let keyword = prompt_keyword()?;
            let summary = market_scan_analytics::analyze(&store, &keyword)?;
            render::summary(&summary);
            0
        }
        Action::Filter => {
            filter(&store)?;
            0
        }
        Action::Charts => {
            let table = TableName::from_keyword(&prompt_keyword()?)?;
            render::chart_report(&charts::report_for(&table));
            0
        }
        Action::Drop => {
            drop_table(&store)?;
            0
        }
        Action::ListSites => {
            render::sites();
            0
        }
    };

    store.close()?;
    Ok(code)
}

/// Prompts for a keyword, page count and site, then runs the ingestion.
async fn ingest(
    store: &ProductStore,
    multi: &MultiProgress,
) -> Result<u8, Box<dyn std::error::Error>> {
    let keyword = prompt_keyword()?;

    let pages: u32 = Input::new()
        .with_prompt(format!("Pages to scrape (1-{MAX_PAGES})"))
        .default(DEFAULT_PAGES)
        .interact_text()?;
    if !(1..=MAX_PAGES).contains(&pages) {
        return Err(format!("Page count must be between 1 and {MAX_PAGES}").into());
    }

    let sites = all_sites();
    let site_labels: Vec<String> = sites
        .iter()
        .map(|s| format!("{} ({})", s.id, s.name))
        .collect();
    let default_site = sites
        .iter()
        .position(|s| s.id == DEFAULT_SITE_ID)
        .unwrap_or(0);
    let site_idx = Select::new()
        .with_prompt("Site")
        .items(&site_labels)
        .default(default_site)
        .interact()?;

    let config = IngestConfig::new(keyword)
        .with_pages(pages)
        .with_site(sites[site_idx].id.clone());

    let progress =
        IndicatifProgress::pages_bar(multi, &format!("Scraping '{}'", config.keyword));
    let result = crate::run_ingest(store, &config, progress).await;
    Ok(render::ingest_result(&result).exit_code())
}

/// Prompts for optional bounds and prints the matching rows.
fn filter(store: &ProductStore) -> Result<(), Box<dyn std::error::Error>> {
    let keyword = prompt_keyword()?;
    let range = RangeFilter {
        min_price: prompt_optional_f64("Minimum price (empty for data minimum)")?,
        max_price: prompt_optional_f64("Maximum price (empty for data maximum)")?,
        min_rating: prompt_optional_f64("Minimum rating (empty for data minimum)")?,
        max_rating: prompt_optional_f64("Maximum rating (empty for data maximum)")?,
    };

    let result = market_scan_analytics::filter_keyword(store, &keyword, &range)?;
    render::filter_result(&result);
    Ok(())
}

/// Lets the user pick an existing table and drops it after confirmation.
fn drop_table(store: &ProductStore) -> Result<(), Box<dyn std::error::Error>> {
    let names = store.list_tables()?;
    if names.is_empty() {
        println!("No keyword tables yet.");
        return Ok(());
    }

    let idx = Select::new()
        .with_prompt("Table to drop")
        .items(&names)
        .default(0)
        .interact()?;
    let table = TableName::parse(names[idx].as_str())?;

    let confirmed = Confirm::new()
        .with_prompt(format!("Drop table {table} and all of its rows?"))
        .default(false)
        .interact()?;
    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    if store.drop_table(&table)? {
        println!("Dropped {table}.");
    }
    Ok(())
}

fn prompt_keyword() -> Result<String, Box<dyn std::error::Error>> {
    let keyword: String = Input::new().with_prompt("Keyword").interact_text()?;
    Ok(crate::normalize_keyword(&keyword)?)
}

/// Prompts for an optional decimal. Empty input returns `None`.
fn prompt_optional_f64(prompt: &str) -> Result<Option<f64>, Box<dyn std::error::Error>> {
    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    if input.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(input.trim().parse()?))
    }
}

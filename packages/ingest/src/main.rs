#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for keyword listing ingestion and analysis.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use market_scan_analytics::charts;
use market_scan_analytics_models::RangeFilter;
use market_scan_cli_utils::IndicatifProgress;
use market_scan_database::store::ProductStore;
use market_scan_database::table_name::TableName;
use market_scan_ingest::{normalize_keyword, render, run_ingest};
use market_scan_ingest_models::{DEFAULT_PAGES, IngestConfig, MAX_PAGES};

#[derive(Parser)]
#[command(name = "market_scan", about = "Keyword product listing scraper and analyzer")]
struct Cli {
    /// `DuckDB` file to use (overrides `MARKET_SCAN_DB`)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape result pages for a keyword and store new listings
    Ingest {
        /// Search keyword (e.g., "craft beer")
        #[arg(value_parser = normalize_keyword)]
        keyword: String,
        /// Number of result pages to fetch
        #[arg(
            long,
            default_value_t = DEFAULT_PAGES,
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PAGES)),
        )]
        pages: u32,
        /// Site definition id (overrides `MARKET_SCAN_SITE`)
        #[arg(long)]
        site: Option<String>,
    },
    /// Delete a keyword's table and all of its rows
    Drop {
        #[arg(value_parser = normalize_keyword)]
        keyword: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List keyword tables with row counts
    Tables,
    /// Summarize a keyword's stored listings
    Analyze {
        #[arg(value_parser = normalize_keyword)]
        keyword: String,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show listings within a price and rating range (bounds inclusive)
    Filter {
        #[arg(value_parser = normalize_keyword)]
        keyword: String,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        min_rating: Option<f64>,
        #[arg(long)]
        max_rating: Option<f64>,
    },
    /// Show a keyword's chart directory and which charts exist
    Charts {
        #[arg(value_parser = normalize_keyword)]
        keyword: String,
    },
    /// List the embedded site definitions
    Sites,
}

fn open_store(db: Option<&Path>) -> Result<ProductStore, Box<dyn std::error::Error>> {
    Ok(match db {
        Some(path) => ProductStore::open(path)?,
        None => ProductStore::open_from_env()?,
    })
}

#[allow(clippy::too_many_lines)]
#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let multi = market_scan_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let code = market_scan_ingest::interactive::run(cli.db.as_deref(), &multi).await?;
        return Ok(ExitCode::from(code));
    };

    match command {
        Commands::Ingest {
            keyword,
            pages,
            site,
        } => {
            let mut config = IngestConfig::new(keyword).with_pages(pages);
            if let Some(site) = site {
                config = config.with_site(site);
            }

            let store = open_store(cli.db.as_deref())?;
            let progress =
                IndicatifProgress::pages_bar(&multi, &format!("Scraping '{}'", config.keyword));
            let result = run_ingest(&store, &config, progress).await;
            let status = render::ingest_result(&result);
            store.close()?;

            return Ok(ExitCode::from(status.exit_code()));
        }
        Commands::Drop { keyword, yes } => {
            let table = TableName::from_keyword(&keyword)?;
            let confirmed = yes
                || Confirm::new()
                    .with_prompt(format!("Drop table {table} and all of its rows?"))
                    .default(false)
                    .interact()?;
            if !confirmed {
                println!("Cancelled.");
                return Ok(ExitCode::SUCCESS);
            }

            let store = open_store(cli.db.as_deref())?;
            if store.drop_table(&table)? {
                println!("Dropped {table}.");
            } else {
                println!("Table {table} does not exist.");
            }
            store.close()?;
        }
        Commands::Tables => {
            let store = open_store(cli.db.as_deref())?;
            render::tables(&store)?;
        }
        Commands::Analyze { keyword, json } => {
            let store = open_store(cli.db.as_deref())?;
            let summary = market_scan_analytics::analyze(&store, &keyword)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                render::summary(&summary);
            }
        }
        Commands::Filter {
            keyword,
            min_price,
            max_price,
            min_rating,
            max_rating,
        } => {
            let store = open_store(cli.db.as_deref())?;
            let range = RangeFilter {
                min_price,
                max_price,
                min_rating,
                max_rating,
            };
            let result = market_scan_analytics::filter_keyword(&store, &keyword, &range)?;
            render::filter_result(&result);
        }
        Commands::Charts { keyword } => {
            let table = TableName::from_keyword(&keyword)?;
            render::chart_report(&charts::report_for(&table));
        }
        Commands::Sites => render::sites(),
    }

    Ok(ExitCode::SUCCESS)
}

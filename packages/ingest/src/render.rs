//! Plain-text output shared by the subcommands and the interactive menu.

use market_scan_analytics_models::{ChartReport, FilterResult, FieldStats, Summary};
use market_scan_database::DbError;
use market_scan_database::store::ProductStore;
use market_scan_database::table_name::TableName;
use market_scan_ingest_models::{IngestReport, IngestStatus};

use crate::{IngestError, status_of};

/// Prints the outcome of an ingestion run and returns its category.
pub fn ingest_result(result: &Result<IngestReport, IngestError>) -> IngestStatus {
    let status = status_of(result);
    println!("{}", status.message());

    match result {
        Ok(report) => {
            println!("  table:    {}", report.table);
            println!(
                "  pages:    {} requested, {} failed",
                report.pages_requested,
                report.failed_pages.len()
            );
            if !report.failed_pages.is_empty() {
                println!("  failed:   {:?}", report.failed_pages);
            }
            println!("  fetched:  {}", report.records_fetched);
            println!("  inserted: {}", report.outcome.inserted());
            println!("  skipped:  {}", report.outcome.skipped());
            if report.outcome.created_table() {
                println!("  (created new table)");
            }
            println!("  took:     {:.1}s", report.duration.as_secs_f64());
        }
        Err(e) => println!("  {e}"),
    }

    status
}

/// Prints every keyword table with its row count.
///
/// # Errors
///
/// Returns [`DbError`] if listing or counting fails.
pub fn tables(store: &ProductStore) -> Result<(), DbError> {
    let names = store.list_tables()?;
    if names.is_empty() {
        println!("No keyword tables yet.");
        return Ok(());
    }

    println!("{:<40} ROWS", "TABLE");
    println!("{}", "-".repeat(50));
    for name in names {
        match TableName::parse(name.as_str()) {
            Ok(table) => println!("{:<40} {}", name, store.row_count(&table)?),
            Err(_) => println!("{name:<40} ?"),
        }
    }
    Ok(())
}

/// Prints the embedded site definitions.
pub fn sites() {
    println!("{:<20} NAME", "ID");
    println!("{}", "-".repeat(50));
    for site in market_scan_scraper::site::all_sites() {
        println!("{:<20} {}", site.id, site.name);
    }
}

fn stats_line(label: &str, stats: Option<&FieldStats>) {
    match stats {
        Some(s) => println!(
            "  {label:<8} min {:>10.2}  max {:>10.2}  mean {:>10.2}  median {:>10.2}",
            s.min, s.max, s.mean, s.median
        ),
        None => println!("  {label:<8} -"),
    }
}

/// Prints a table summary with its histograms.
pub fn summary(summary: &Summary) {
    println!(
        "{}: {} stored row(s), {} with price and rating",
        summary.table, summary.total_rows, summary.analyzed_rows
    );
    stats_line("price", summary.price.as_ref());
    stats_line("rating", summary.rating.as_ref());
    stats_line("reviews", summary.reviews.as_ref());

    for (label, bins) in [
        ("Price distribution", &summary.price_histogram),
        ("Rating distribution", &summary.rating_histogram),
    ] {
        if bins.is_empty() {
            continue;
        }
        println!("\n{label}:");
        let widest = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
        for bin in bins {
            let width = usize::try_from(bin.count * 40 / widest).unwrap_or(0);
            println!(
                "  {:>9.2} - {:<9.2} {:>5} {}",
                bin.lower,
                bin.upper,
                bin.count,
                "#".repeat(width)
            );
        }
    }
}

/// Prints the rows a range filter kept.
pub fn filter_result(result: &FilterResult) {
    if let Some(range) = &result.range {
        println!(
            "price {:.2}..={:.2}, rating {:.1}..={:.1}: {} record(s)",
            range.min_price,
            range.max_price,
            range.min_rating,
            range.max_rating,
            result.count()
        );
    } else {
        println!("No rows with both price and rating.");
        return;
    }

    for row in &result.rows {
        println!(
            "  {:>9.2}  {:>3.1}  {:>7}  {}",
            row.price,
            row.rating,
            row.reviews.map_or_else(|| "-".to_owned(), |r| r.to_string()),
            row.title
        );
    }
}

/// Prints a chart directory and which artifacts it holds.
pub fn chart_report(report: &ChartReport) {
    println!("{}", report.dir.display());
    for artifact in &report.present {
        println!("  [x] {} ({})", artifact.file_name(), artifact.label());
    }
    for artifact in &report.missing {
        println!("  [ ] {} ({})", artifact.file_name(), artifact.label());
    }
    if report.is_complete() {
        println!("All charts present.");
    }
}

//! Per-keyword chart directories.
//!
//! Each keyword table owns `<charts root>/<table>/` holding the fixed
//! [`ChartArtifact`] set.

use std::path::{Path, PathBuf};

use market_scan_analytics_models::{ChartArtifact, ChartReport};
use market_scan_database::paths;
use market_scan_database::table_name::TableName;

/// Chart directory for `table` under the configured charts root.
#[must_use]
pub fn chart_dir(table: &TableName) -> PathBuf {
    paths::chart_dir(&paths::charts_root(), table)
}

/// Path of one artifact inside `dir`.
#[must_use]
pub fn artifact_path(dir: &Path, artifact: ChartArtifact) -> PathBuf {
    dir.join(artifact.file_name())
}

/// Reports which artifacts exist in `dir`.
#[must_use]
pub fn report(dir: &Path) -> ChartReport {
    let (present, missing): (Vec<ChartArtifact>, Vec<ChartArtifact>) = ChartArtifact::ALL
        .iter()
        .copied()
        .partition(|artifact| artifact_path(dir, *artifact).is_file());

    if !missing.is_empty() {
        log::debug!(
            "{}: missing {}",
            dir.display(),
            missing
                .iter()
                .map(|a| a.file_name())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    ChartReport {
        dir: dir.to_path_buf(),
        present,
        missing,
    }
}

/// Reports artifacts for `table` under the configured charts root.
#[must_use]
pub fn report_for(table: &TableName) -> ChartReport {
    report(&chart_dir(table))
}

//! End-of-run persistence: stores, list pruning and the change report

use std::path::PathBuf;

use chrono::Local;
use tracing::info;

use crate::config::{FilesConfig, ReportConfig};
use crate::version::store::{save_progress, save_records, write_replacing};
use crate::watch::coordinator::{OutcomeCounts, RunOutcome};
use crate::watch::error::WatchError;
use crate::watch::{package_list, report};

/// What a finished run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub counts: OutcomeCounts,
    pub changed: usize,
    /// Distinct identifiers removed from the list
    pub pruned: usize,
    /// Set only when at least one package changed
    pub report: Option<PathBuf>,
}

/// Persists the outcome of a run. Steps run in order and the first I/O error aborts.
pub fn finish_run(
    outcome: RunOutcome,
    files: &FilesConfig,
    report_config: &ReportConfig,
) -> Result<RunSummary, WatchError> {
    let RunOutcome {
        state,
        total,
        counts,
    } = outcome;

    save_progress(&files.progress, &state.progress)?;
    save_records(&files.records, &state.records)?;

    let pruned = if state.removed.is_empty() {
        0
    } else {
        let pruned = package_list::prune(&files.packages_list, &state.removed)?;
        info!(
            "Removed {} not found packages from {:?}",
            pruned, files.packages_list
        );
        pruned
    };

    let report = if state.changes.is_empty() {
        info!("No updated packages found");
        None
    } else {
        let html = report::render(report_config, &state.changes, Local::now())?;
        write_replacing(&files.report, html.as_bytes())?;
        info!(
            "HTML report with {} updated packages written to {:?}",
            state.changes.len(),
            files.report
        );
        Some(files.report.clone())
    };

    Ok(RunSummary {
        total,
        counts,
        changed: state.changes.len(),
        pruned,
        report,
    })
}

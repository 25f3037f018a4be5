//! Run coordination layer
//!
//! Loads the identifier list and stores, runs the concurrent pass and
//! persists the result.
//!
//! # Modules
//!
//! - [`coordinator`]: Admission-gated fetch/extract/reconcile over all identifiers
//! - [`finish`]: End-of-run persistence and summary
//! - [`package_list`]: Identifier list loading and pruning
//! - [`report`]: HTML report rendering
//! - [`error`]: Errors that abort a run

pub mod coordinator;
pub mod error;
pub mod finish;
pub mod package_list;
pub mod report;

use tracing::info;

use crate::config::WatchConfig;
use crate::version::extractor::Extractor;
use crate::version::fetchers::CatalogFetcher;
use crate::version::reconciler::RunState;
use crate::version::store::{load_progress, load_records};
use crate::watch::coordinator::Coordinator;
use crate::watch::error::WatchError;
use crate::watch::finish::{RunSummary, finish_run};

/// Runs one full pass with the HTTP fetcher described by `config`.
pub async fn execute(config: &WatchConfig) -> Result<RunSummary, WatchError> {
    let extractor = Extractor::new(&config.selectors)?;
    let fetcher = CatalogFetcher::from_config(&config.fetch)?;

    let identifiers = package_list::load(&config.files.packages_list)?;
    let records = load_records(&config.files.records)?;
    let progress = load_progress(&config.files.progress)?;
    info!(
        "Loaded {} identifiers, {} records, {} checked",
        identifiers.len(),
        records.len(),
        progress.len()
    );

    let coordinator = Coordinator::new(
        fetcher,
        extractor,
        config.fetch.concurrency,
        RunState::new(records, progress),
    );
    let outcome = coordinator.run(&identifiers).await;

    finish_run(outcome, &config.files, &config.report)
}

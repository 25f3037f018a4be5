//! Concurrent fetch-extract-reconcile pass over the identifier list

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::version::error::FetchError;
use crate::version::extractor::Extractor;
use crate::version::fetcher::PageFetcher;
use crate::version::reconciler::{Reconciliation, RunState};

/// Terminal state of one package in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    /// Already checked by an earlier run; no request was made
    Skipped,
    Reconciled(Reconciliation),
    /// The catalog answered 404; the identifier will be pruned
    NotFound,
    /// Left unchecked for the next run
    Failed,
}

/// Number of packages per terminal state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub skipped: usize,
    pub reconciled: usize,
    /// Fetched, but the page had no version
    pub no_version: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl OutcomeCounts {
    fn tally(outcomes: &[PackageOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut counts, outcome| {
            match outcome {
                PackageOutcome::Skipped => counts.skipped += 1,
                PackageOutcome::Reconciled(Reconciliation::NoVersion) => counts.no_version += 1,
                PackageOutcome::Reconciled(_) => counts.reconciled += 1,
                PackageOutcome::NotFound => counts.not_found += 1,
                PackageOutcome::Failed => counts.failed += 1,
            }
            counts
        })
    }
}

/// Result of a completed pass, before anything is persisted
#[derive(Debug)]
pub struct RunOutcome {
    pub state: RunState,
    pub total: usize,
    pub counts: OutcomeCounts,
}

/// `Processing <id> (<count>/<total>) - <percent>%`, percent with two decimals
fn progress_line(identifier: &str, count: usize, total: usize) -> String {
    let percent = if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    };
    format!(
        "Processing {} ({}/{}) - {:.2}%",
        identifier, count, total, percent
    )
}

/// Drives one run over a list of identifiers.
///
/// All packages start together; an admission gate lets at most `concurrency`
/// of them fetch, extract and reconcile at the same time. The shared
/// [`RunState`] is only locked for non-suspending sections.
pub struct Coordinator<F: PageFetcher> {
    fetcher: F,
    extractor: Extractor,
    gate: Semaphore,
    state: Mutex<RunState>,
    processed: AtomicUsize,
}

impl<F: PageFetcher> Coordinator<F> {
    pub fn new(fetcher: F, extractor: Extractor, concurrency: usize, state: RunState) -> Self {
        Self {
            fetcher,
            extractor,
            gate: Semaphore::new(concurrency.max(1)),
            state: Mutex::new(state),
            processed: AtomicUsize::new(0),
        }
    }

    /// Processes every identifier and waits for all of them to finish.
    pub async fn run(self, identifiers: &[String]) -> RunOutcome {
        let total = identifiers.len();
        info!("Checking {} packages", total);

        let outcomes = join_all(
            identifiers
                .iter()
                .map(|identifier| self.process_package(identifier, total)),
        )
        .await;

        let counts = OutcomeCounts::tally(&outcomes);
        let state = self
            .state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        RunOutcome {
            state,
            total,
            counts,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report_progress(&self, identifier: &str, total: usize) {
        let count = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
        info!("{}", progress_line(identifier, count, total));
    }

    async fn process_package(&self, identifier: &str, total: usize) -> PackageOutcome {
        let Ok(_permit) = self.gate.acquire().await else {
            error!("Admission gate closed before {} could start", identifier);
            return PackageOutcome::Failed;
        };

        self.report_progress(identifier, total);

        let checked = self.lock_state().is_checked(identifier);
        if checked {
            debug!("Skipping {}: already checked", identifier);
            return PackageOutcome::Skipped;
        }

        match self.fetcher.fetch_page(identifier).await {
            Ok(html) => {
                let fields = self.extractor.extract(&html);
                let source_url = self.fetcher.source_url(identifier);
                let outcome = self.lock_state().reconcile(identifier, fields, &source_url);

                match outcome {
                    Reconciliation::NoVersion => debug!("No version found for {}", identifier),
                    Reconciliation::Changed => info!("New version published for {}", identifier),
                    Reconciliation::Created | Reconciliation::Unchanged => {}
                }
                PackageOutcome::Reconciled(outcome)
            }
            Err(FetchError::NotFound(_)) => {
                warn!(
                    "Package {} does not exist and will be removed from the list",
                    identifier
                );
                self.lock_state().mark_not_found(identifier);
                PackageOutcome::NotFound
            }
            Err(e) => {
                error!("Failed to fetch {}: {}", identifier, e);
                PackageOutcome::Failed
            }
        }
    }
}

//! Reconciliation of fresh observations against the persisted records

use indexmap::IndexSet;
use serde::Serialize;

use crate::version::extractor::ExtractedFields;
use crate::version::store::{PackageRecord, Progress, ProgressStore, RecordStore};

/// One detected version transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub identifier: String,
    pub display_name: String,
    pub old_version: String,
    pub new_version: String,
    pub source_url: String,
}

/// What reconciling a single observation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The page had no version; nothing was touched
    NoVersion,
    /// First observation of the package
    Created,
    Unchanged,
    Changed,
}

/// Mutable state of one run, shared by all package tasks
#[derive(Debug, Default)]
pub struct RunState {
    pub records: RecordStore,
    pub progress: ProgressStore,
    /// In completion order
    pub changes: Vec<ChangeEvent>,
    /// Identifiers the catalog answered 404 for
    pub removed: IndexSet<String>,
}

impl RunState {
    pub fn new(records: RecordStore, progress: ProgressStore) -> Self {
        Self {
            records,
            progress,
            ..Self::default()
        }
    }

    pub fn is_checked(&self, identifier: &str) -> bool {
        self.progress.get(identifier) == Some(&Progress::Checked)
    }

    /// Merges a fresh observation into the record of `identifier`.
    ///
    /// An empty version leaves every store untouched so the package is
    /// fetched again on the next run.
    pub fn reconcile(
        &mut self,
        identifier: &str,
        fields: ExtractedFields,
        source_url: &str,
    ) -> Reconciliation {
        if fields.version.is_empty() {
            return Reconciliation::NoVersion;
        }

        let outcome = match self.records.get_mut(identifier) {
            None => {
                self.records.insert(
                    identifier.to_string(),
                    PackageRecord::first_seen(&fields.name, &fields.version),
                );
                Reconciliation::Created
            }
            Some(record) if record.current_version == fields.version => {
                record.previous_version = record.current_version.clone();
                Reconciliation::Unchanged
            }
            Some(record) => {
                let old_version =
                    std::mem::replace(&mut record.current_version, fields.version.clone());
                record.previous_version = old_version.clone();

                let display_name = if fields.name.is_empty() {
                    record.display_name.clone()
                } else {
                    fields.name
                };
                self.changes.push(ChangeEvent {
                    identifier: identifier.to_string(),
                    display_name,
                    old_version,
                    new_version: fields.version,
                    source_url: source_url.to_string(),
                });
                Reconciliation::Changed
            }
        };

        self.progress.insert(identifier.to_string(), Progress::Checked);
        outcome
    }

    /// Records a 404; the record and progress stores are left alone.
    pub fn mark_not_found(&mut self, identifier: &str) {
        self.removed.insert(identifier.to_string());
    }
}

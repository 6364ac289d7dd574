//! Per-project outcome classification and the run log

use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::core::RinthResult;

/// Classified result of one project task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new artifact landed
    Downloaded { filename: String },

    /// A newer artifact replaced an older one
    Updated {
        old_filename: String,
        new_filename: String,
    },

    /// The matched artifact was already present
    SkippedExisting,

    /// No compatible version, or the fallback offer was declined
    NoVersionFound,

    /// Remote fetch or filesystem write failed
    Failed { detail: String },
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Downloaded { .. } => OutcomeKind::Downloaded,
            Outcome::Updated { .. } => OutcomeKind::Updated,
            Outcome::SkippedExisting => OutcomeKind::SkippedExisting,
            Outcome::NoVersionFound => OutcomeKind::NoVersionFound,
            Outcome::Failed { .. } => OutcomeKind::Failed,
        }
    }
}

/// Outcome kinds, for grouping and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Downloaded,
    Updated,
    SkippedExisting,
    NoVersionFound,
    Failed,
}

impl OutcomeKind {
    pub fn label(self) -> &'static str {
        match self {
            OutcomeKind::Downloaded => "downloaded",
            OutcomeKind::Updated => "updated",
            OutcomeKind::SkippedExisting => "already existing",
            OutcomeKind::NoVersionFound => "no version found",
            OutcomeKind::Failed => "failed",
        }
    }

    /// Run log file for this kind; failures only surface on the console
    fn log_file(self) -> Option<&'static str> {
        match self {
            OutcomeKind::Downloaded => Some("downloaded.log"),
            OutcomeKind::Updated => Some("updated.log"),
            OutcomeKind::SkippedExisting => Some("already_existing.log"),
            OutcomeKind::NoVersionFound => Some("no_version_found.log"),
            OutcomeKind::Failed => None,
        }
    }

    const ALL: [OutcomeKind; 5] = [
        OutcomeKind::Downloaded,
        OutcomeKind::Updated,
        OutcomeKind::SkippedExisting,
        OutcomeKind::NoVersionFound,
        OutcomeKind::Failed,
    ];
}

/// One recorded outcome
#[derive(Debug, Clone)]
pub struct OutcomeRecord {
    pub project_id: String,
    pub title: String,
    pub outcome: Outcome,
}

#[derive(Default)]
struct Inner {
    records: HashMap<String, OutcomeRecord>,
    line_counts: HashMap<OutcomeKind, usize>,
}

/// Accumulates classified results for end-of-run reporting
///
/// Keyed by project identifier; a revisit overwrites the previous record
/// (tolerated defensively, the visit set should prevent it). Each record also
/// appends one numbered line to the matching run log file.
pub struct OutcomeLog {
    state_dir: PathBuf,
    inner: Mutex<Inner>,
}

impl OutcomeLog {
    /// Create the log, truncating the four run log files
    pub fn create(state_dir: &Path) -> RinthResult<Self> {
        for kind in OutcomeKind::ALL {
            if let Some(name) = kind.log_file() {
                std::fs::write(state_dir.join(name), "")?;
            }
        }
        Ok(Self {
            state_dir: state_dir.to_path_buf(),
            inner: Mutex::new(Inner::default()),
        })
    }

    /// Record a project's outcome and append its run log line
    pub fn record(&self, record: OutcomeRecord) -> RinthResult<()> {
        let mut inner = self.inner.lock();
        let kind = record.outcome.kind();

        if let Some(name) = kind.log_file() {
            let count = inner.line_counts.entry(kind).or_insert(0);
            *count += 1;
            let line = format!("{}. {}\n", count, describe(&record));

            let mut file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(self.state_dir.join(name))?;
            file.write_all(line.as_bytes())?;
        }

        inner.records.insert(record.project_id.clone(), record);
        Ok(())
    }

    /// Counts per outcome kind
    pub fn summary(&self) -> Summary {
        let inner = self.inner.lock();
        let mut summary = Summary::default();
        for record in inner.records.values() {
            match record.outcome.kind() {
                OutcomeKind::Downloaded => summary.downloaded += 1,
                OutcomeKind::Updated => summary.updated += 1,
                OutcomeKind::SkippedExisting => summary.skipped_existing += 1,
                OutcomeKind::NoVersionFound => summary.no_version_found += 1,
                OutcomeKind::Failed => summary.failed += 1,
            }
        }
        summary
    }

    /// All records, sorted by project identifier
    pub fn records(&self) -> Vec<OutcomeRecord> {
        let inner = self.inner.lock();
        let mut records: Vec<OutcomeRecord> = inner.records.values().cloned().collect();
        records.sort_by(|a, b| a.project_id.cmp(&b.project_id));
        records
    }
}

fn describe(record: &OutcomeRecord) -> String {
    let base = format!("Project: {} | ID: {}", record.title, record.project_id);
    match &record.outcome {
        Outcome::Downloaded { filename } => format!("{} | File: {}", base, filename),
        Outcome::Updated { old_filename, new_filename } => {
            format!("{} | File: {} (replaced {})", base, new_filename, old_filename)
        }
        Outcome::SkippedExisting | Outcome::NoVersionFound => base,
        Outcome::Failed { detail } => format!("{} | {}", base, detail),
    }
}

/// End-of-run counts per outcome kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub downloaded: usize,
    pub updated: usize,
    pub skipped_existing: usize,
    pub no_version_found: usize,
    pub failed: usize,
}

impl Summary {
    pub fn total(&self) -> usize {
        self.downloaded + self.updated + self.skipped_existing + self.no_version_found + self.failed
    }
}

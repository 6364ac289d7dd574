//! Recursive dependency expansion
//!
//! Each selected release can require other projects; those are fed back into
//! the fetch pipeline. The shared [`VisitSet`] guarantees every project
//! identifier is expanded at most once per run, which also breaks dependency
//! cycles without treating them as errors.

use dashmap::DashSet;

use crate::catalog::types::ProjectVersion;

/// Project identifiers already processed or enqueued in this run
///
/// Grows monotonically for the run's duration. Insertion is an atomic
/// test-and-insert, so two workers racing on the same identifier agree on a
/// single winner.
#[derive(Debug, Default)]
pub struct VisitSet {
    seen: DashSet<String>,
}

impl VisitSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically mark an identifier as visited. Returns true if this call
    /// was the first to see it.
    pub fn insert(&self, id: &str) -> bool {
        self.seen.insert(id.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Required dependency identifiers of a release that have not been visited
/// yet. Winners are added to `visited` before this returns, so a concurrent
/// expansion of the same dependency elsewhere loses the race and skips it.
pub fn expand(version: &ProjectVersion, visited: &VisitSet) -> Vec<String> {
    version
        .required_dependencies()
        .filter(|id| visited.insert(id))
        .map(str::to_string)
        .collect()
}

//! Concurrent fetch pipeline
//!
//! A bounded pool of workers drains a growable queue of project identifiers.
//! Each task runs match -> confirm -> download -> classify for one project
//! and feeds newly discovered required dependencies back into the queue, so
//! the pool only stops once the queue is empty and no task is still running.

pub mod confirm;
pub mod outcome;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use console::style;
use parking_lot::Mutex;

use crate::catalog::types::{Project, ProjectVersion};
use crate::catalog::CatalogApi;
use crate::index::{normalize_filename, ContentKind, LocalIndex};
use crate::matcher::{self, MatchResult, MatchTarget};
use crate::resolver::{self, VisitSet};

pub use confirm::{AutoGate, FallbackGate, FallbackRequest, InteractiveGate};
pub use outcome::{Outcome, OutcomeLog, OutcomeRecord, Summary};

/// Growable work queue with quiescent termination
///
/// New identifiers can arrive while the pool is draining, so the queue only
/// reports exhaustion when it is empty AND no task is mid-flight. Tasks push
/// their discovered dependencies before signalling completion, which keeps
/// that check sound.
struct WorkQueue {
    jobs: Mutex<VecDeque<String>>,
    active: AtomicUsize,
    notify: tokio::sync::Notify,
}

impl WorkQueue {
    fn new() -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
            active: AtomicUsize::new(0),
            notify: tokio::sync::Notify::new(),
        }
    }

    fn push(&self, id: String) {
        self.jobs.lock().push_back(id);
        self.notify.notify_waiters();
    }

    /// Next identifier to process, or None once the pool is quiescent
    async fn next(&self) -> Option<String> {
        loop {
            let notified = self.notify.notified();
            {
                let mut jobs = self.jobs.lock();
                if let Some(id) = jobs.pop_front() {
                    self.active.fetch_add(1, Ordering::SeqCst);
                    return Some(id);
                }
                // Queue is empty; pushes only come from active tasks, so
                // zero active means no more work can appear
                if self.active.load(Ordering::SeqCst) == 0 {
                    self.notify.notify_waiters();
                    return None;
                }
            }
            notified.await;
        }
    }

    fn task_done(&self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }
}

/// The resolution-and-fetch engine for one run
pub struct FetchPipeline {
    catalog: Arc<dyn CatalogApi>,
    index: Arc<LocalIndex>,
    gate: Arc<dyn FallbackGate>,
    outcomes: Arc<OutcomeLog>,
    visited: VisitSet,
    target: MatchTarget,
    concurrency: usize,
}

impl FetchPipeline {
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        index: Arc<LocalIndex>,
        gate: Arc<dyn FallbackGate>,
        outcomes: Arc<OutcomeLog>,
        target: MatchTarget,
        concurrency: usize,
    ) -> Self {
        Self {
            catalog,
            index,
            gate,
            outcomes,
            visited: VisitSet::new(),
            target,
            concurrency,
        }
    }

    /// Process the seed identifiers and everything they transitively
    /// require. Returns once the work queue has drained and every in-flight
    /// task, including its dependency expansions, has completed.
    pub async fn run(&self, seeds: &[String]) {
        let queue = WorkQueue::new();
        for id in seeds {
            if self.visited.insert(id) {
                queue.push(id.clone());
            }
        }

        let workers = (0..self.concurrency.max(1)).map(|worker| {
            let queue = &queue;
            async move {
                tracing::debug!(worker, "worker started");
                while let Some(project_id) = queue.next().await {
                    self.process(&project_id, queue).await;
                    queue.task_done();
                }
                tracing::debug!(worker, "worker drained");
            }
        });

        futures::future::join_all(workers).await;
    }

    /// Run one project task, record its outcome, enqueue its dependencies
    async fn process(&self, project_id: &str, queue: &WorkQueue) {
        let (title, outcome, matched) = self.run_task(project_id).await;

        announce(project_id, &title, &outcome);
        if let Err(e) = self.outcomes.record(OutcomeRecord {
            project_id: project_id.to_string(),
            title,
            outcome: outcome.clone(),
        }) {
            tracing::warn!(project = project_id, "failed to write run log: {}", e);
        }

        // Failed and no-version tasks have nothing trustworthy to expand
        if let Some(version) = matched {
            for dep in resolver::expand(&version, &self.visited) {
                tracing::debug!(project = project_id, dependency = %dep, "queueing dependency");
                queue.push(dep);
            }
        }
    }

    /// The per-project state machine:
    /// Pending -> Matching -> {Confirming ->} Downloading -> Classified.
    /// Returns the display title, the classified outcome, and the matched
    /// version when dependency expansion should follow.
    async fn run_task(&self, project_id: &str) -> (String, Outcome, Option<ProjectVersion>) {
        let project = match self.catalog.get_project(project_id).await {
            Ok(project) => project,
            Err(e) => {
                return (
                    project_id.to_string(),
                    Outcome::Failed { detail: e.to_string() },
                    None,
                )
            }
        };
        let title = project.display_name().to_string();

        let versions = match self.catalog.get_versions(&project.id).await {
            Ok(versions) => versions,
            Err(e) => return (title, Outcome::Failed { detail: e.to_string() }, None),
        };

        let (version, is_fallback) = match matcher::select(&versions, &self.target) {
            MatchResult::Exact(v) => (v, false),
            MatchResult::Fallback(v) => (v, true),
            MatchResult::NoMatch => {
                if let Some(closest) =
                    matcher::highest_supported(&versions, &self.target.game_version)
                {
                    tracing::debug!(project = %title, %closest, "no compatible version");
                }
                return (title, Outcome::NoVersionFound, None);
            }
        };

        let file = match version.primary_file() {
            Some(file) => file,
            None => {
                // select() only returns versions with a usable file
                return (
                    title,
                    Outcome::Failed { detail: "matched version has no usable file".to_string() },
                    None,
                );
            }
        };

        let kind = match ContentKind::classify(project.project_type, version.is_datapack()) {
            Some(kind) => kind,
            None => {
                return (
                    title,
                    Outcome::Failed { detail: "unsupported project type".to_string() },
                    None,
                )
            }
        };

        let filename = normalize_filename(&file.filename);
        let existing = self.index.find(&known_ids(&project));

        // Already present under the exact filename: done, no prompt needed
        let same_file = existing
            .as_ref()
            .map(|entry| entry.filename == filename)
            .unwrap_or(false);
        if same_file || self.index.has_file(kind, &filename) {
            return (title, Outcome::SkippedExisting, Some(version.clone()));
        }

        if is_fallback {
            let request = FallbackRequest {
                project_title: title.clone(),
                filename: filename.clone(),
                target: self.target.game_version.clone(),
                supports: matcher::highest_supported(
                    std::slice::from_ref(version),
                    &self.target.game_version,
                ),
            };
            match self.gate.confirm(request).await {
                Ok(true) => {}
                Ok(false) => return (title, Outcome::NoVersionFound, None),
                Err(e) => return (title, Outcome::Failed { detail: e.to_string() }, None),
            }
        }

        let dest = self.index.artifact_path(kind, &filename);
        if let Err(e) = self.catalog.download_file(file, &dest).await {
            return (title, Outcome::Failed { detail: e.to_string() }, None);
        }

        let outcome = match existing {
            Some(old) if old.filename != filename => {
                let old_path = self.index.artifact_path(old.kind, &old.filename);
                if let Err(e) = std::fs::remove_file(&old_path) {
                    tracing::warn!(file = %old.filename, "could not remove old artifact: {}", e);
                }
                if let Err(e) = self.index.remove_file(old.kind, &old.filename) {
                    tracing::warn!(file = %old.filename, "could not unindex old artifact: {}", e);
                }
                Outcome::Updated {
                    old_filename: old.filename,
                    new_filename: filename.clone(),
                }
            }
            _ => Outcome::Downloaded { filename: filename.clone() },
        };

        if let Err(e) = self.index.record(&project.id, kind, &filename) {
            return (title, Outcome::Failed { detail: format!("index write failed: {}", e) }, None);
        }

        (title, outcome, Some(version.clone()))
    }
}

/// Identifiers an already-present artifact may be indexed under
fn known_ids(project: &Project) -> Vec<&str> {
    let mut ids = vec![project.id.as_str()];
    if !project.slug.is_empty() && project.slug != project.id {
        ids.push(project.slug.as_str());
    }
    ids
}

fn announce(project_id: &str, title: &str, outcome: &Outcome) {
    match outcome {
        Outcome::Downloaded { filename } => {
            println!("{} {} ({})", style("downloaded").green().bold(), title, filename)
        }
        Outcome::Updated { old_filename, new_filename } => println!(
            "{} {} ({} -> {})",
            style("updated").cyan().bold(),
            title,
            old_filename,
            new_filename
        ),
        Outcome::SkippedExisting => {
            println!("{} {} already present", style("skipped").dim(), title)
        }
        Outcome::NoVersionFound => {
            println!("{} no version found for {}", style("missing").yellow().bold(), title)
        }
        Outcome::Failed { detail } => println!(
            "{} {} ({}): {}",
            style("failed").red().bold(),
            title,
            project_id,
            detail
        ),
    }
}

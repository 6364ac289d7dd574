//! Core engine wiring the Rinth components together

use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::{CatalogApi, CatalogClient};
use crate::core::{Config, RinthResult};
use crate::index::LocalIndex;
use crate::matcher::MatchTarget;
use crate::pipeline::{FallbackGate, FetchPipeline, OutcomeLog};

/// Main engine for a Rinth run
pub struct Engine {
    /// Sync root holding the content category directories
    pub root: PathBuf,

    /// Configuration
    pub config: Config,

    /// Catalog client
    pub catalog: Arc<CatalogClient>,

    /// Local artifact index, scanned at construction
    pub index: Arc<LocalIndex>,
}

impl Engine {
    /// Create an engine for the given sync root: builds the API client and
    /// scans the destination directories
    pub fn new(config: Config, root: PathBuf) -> RinthResult<Self> {
        let catalog = Arc::new(CatalogClient::new(&config.api)?);
        let index = Arc::new(LocalIndex::scan(&root)?);

        Ok(Self {
            root,
            config,
            catalog,
            index,
        })
    }

    /// Create the outcome log for this run, truncating previous run logs
    pub fn outcome_log(&self) -> RinthResult<Arc<OutcomeLog>> {
        Ok(Arc::new(OutcomeLog::create(self.index.state_dir())?))
    }

    /// Create a fetch pipeline for this run
    pub fn pipeline(
        &self,
        target: MatchTarget,
        gate: Arc<dyn FallbackGate>,
        outcomes: Arc<OutcomeLog>,
    ) -> FetchPipeline {
        let catalog: Arc<dyn CatalogApi> = self.catalog.clone();
        FetchPipeline::new(
            catalog,
            self.index.clone(),
            gate,
            outcomes,
            target,
            self.config.sync.concurrency,
        )
    }
}

//! rinth sync - Synchronize the local tree with a remote collection

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;

use crate::catalog::CatalogApi;
use crate::cli::output;
use crate::core::{Config, Engine, RinthResult};
use crate::matcher::{GameVersion, MatchTarget};
use crate::pipeline::{AutoGate, FallbackGate, InteractiveGate};

#[derive(Args)]
pub struct SyncArgs {
    /// Collection identifier to synchronize
    #[arg(short, long)]
    pub collection: String,

    /// Target game version (e.g. 1.21.8)
    #[arg(short = 'v', long)]
    pub game_version: GameVersion,

    /// Target loader (e.g. fabric)
    #[arg(short, long)]
    pub loader: String,

    /// Lowest game version acceptable as a fallback
    #[arg(short, long)]
    pub fallback: Option<GameVersion>,

    /// Maximum concurrent project tasks
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Accept every fallback offer without prompting
    #[arg(long, conflicts_with = "no")]
    pub yes: bool,

    /// Reject every fallback offer without prompting
    #[arg(long)]
    pub no: bool,

    /// Sync root directory (default: from config, else current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

pub async fn execute(args: SyncArgs) -> RinthResult<()> {
    let start_time = Instant::now();

    let mut config = Config::load(&env::current_dir()?)?;
    if let Some(concurrency) = args.concurrency {
        config.sync.concurrency = concurrency;
    }
    let root = config.sync_root(args.root.as_deref())?;

    let engine = Engine::new(config, root)?;

    // A collection that cannot be enumerated aborts the run before the
    // pool starts; everything after this is per-project
    let progress = output::spinner(&format!("Fetching collection {}...", args.collection));
    let collection = engine.catalog.get_collection(&args.collection).await;
    progress.finish_and_clear();
    let collection = collection?;

    let name = if collection.name.is_empty() {
        collection.id.clone()
    } else {
        collection.name.clone()
    };
    output::info(&format!(
        "{} projects in '{}', targeting {} / {}",
        collection.projects.len(),
        name,
        args.game_version,
        args.loader
    ));

    let target = MatchTarget {
        game_version: args.game_version,
        loader: args.loader.to_lowercase(),
        fallback_floor: args.fallback,
    };

    let gate: Arc<dyn FallbackGate> = if args.yes {
        Arc::new(AutoGate::new(true))
    } else if args.no {
        Arc::new(AutoGate::new(false))
    } else {
        Arc::new(InteractiveGate::new())
    };

    let outcomes = engine.outcome_log()?;
    let pipeline = engine.pipeline(target, gate, outcomes.clone());
    pipeline.run(&collection.projects).await;

    output::summary(&outcomes.summary(), start_time.elapsed());

    Ok(())
}

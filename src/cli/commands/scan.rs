//! rinth scan - Index manually added files interactively
//!
//! Files dropped into the category directories by hand have no index row, so
//! the sync presence check can only match them by filename heuristics. This
//! command walks the unidentified files and asks for their project
//! identifiers, persisting every accepted mapping.

use std::env;
use std::path::PathBuf;

use clap::Args;
use dialoguer::Input;

use crate::cli::output;
use crate::core::{Config, RinthResult};
use crate::index::LocalIndex;

#[derive(Args)]
pub struct ScanArgs {
    /// Sync root directory (default: from config, else current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

pub async fn execute(args: ScanArgs) -> RinthResult<()> {
    let config = Config::load(&env::current_dir()?)?;
    let root = config.sync_root(args.root.as_deref())?;

    let index = LocalIndex::scan(&root)?;
    let unidentified = index.unidentified();

    if unidentified.is_empty() {
        output::success("Every file is indexed");
        return Ok(());
    }

    output::info(&format!("{} file(s) without a project mapping", unidentified.len()));

    let mut assigned = 0usize;
    for entry in unidentified {
        let id: String = Input::new()
            .with_prompt(format!(
                "Project id for '{}/{}' (blank skips)",
                entry.kind.dir_name(),
                entry.filename
            ))
            .allow_empty(true)
            .interact_text()?;

        let id = id.trim();
        if id.is_empty() {
            output::warning(&format!("{} left unindexed", entry.filename));
            continue;
        }

        index.assign(entry.kind, &entry.filename, id)?;
        output::success(&format!("{} -> {}", entry.filename, id));
        assigned += 1;
    }

    output::success(&format!("Indexed {} file(s)", assigned));
    Ok(())
}

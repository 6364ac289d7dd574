//! Rinth - A fast collection synchronizer for Modrinth
//!
//! Rinth keeps a local directory tree of game content (mods, resourcepacks,
//! shaderpacks, datapacks) in lockstep with a remote Modrinth collection,
//! resolving each project to the best release for a target game-version and
//! loader and pulling in required dependencies.

mod catalog;
mod cli;
mod core;
mod index;
mod matcher;
mod pipeline;
mod resolver;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};
use core::RinthResult;

#[tokio::main]
async fn main() -> RinthResult<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Execute command
    let result = match cli.command {
        Commands::Sync(args) => cli::commands::sync::execute(args).await,
        Commands::Scan(args) => cli::commands::scan::execute(args).await,
    };

    if let Err(ref e) = result {
        eprintln!("{} {}", console::style("error:").red().bold(), e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}

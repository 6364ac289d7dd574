//! CLI module for Rinth
//!
//! Provides command-line interface using clap.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::*;

/// Rinth - A fast collection synchronizer for Modrinth
#[derive(Parser)]
#[command(name = "rinth")]
#[command(author = "Rinth Contributors")]
#[command(version)]
#[command(about = "Keep a local mods directory in lockstep with a Modrinth collection", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synchronize the local tree with a remote collection
    #[command(visible_alias = "s")]
    Sync(sync::SyncArgs),

    /// Index manually added files interactively
    Scan(scan::ScanArgs),
}

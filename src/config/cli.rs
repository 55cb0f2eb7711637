//! Command-line interface

use crate::types::DuplicatesStrategy;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "warpack")]
#[command(about = "Assemble web archive layouts from lazily resolved copy specifications", version)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a layout and print every archive entry in order
    List {
        /// Path to the layout file
        layout: PathBuf,

        /// Print one JSON object per entry
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        resolve: ResolveArgs,
    },

    /// Resolve a layout and materialise it into a directory
    Stage {
        /// Path to the layout file
        layout: PathBuf,

        /// Output directory (created if missing)
        out_dir: PathBuf,

        /// Hash every staged file against its source
        #[arg(long)]
        verify: bool,

        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,

        #[command(flatten)]
        resolve: ResolveArgs,
    },
}

/// Resolution flags shared by every subcommand
#[derive(Debug, Clone, Default, Args)]
pub struct ResolveArgs {
    /// Duplicate destination policy
    #[arg(long, value_enum)]
    pub duplicates: Option<DuplicatesStrategy>,

    /// Maximum providers evaluated at once
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-provider timeout in seconds (0 disables it)
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

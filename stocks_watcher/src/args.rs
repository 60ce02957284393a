//! Command-line arguments for the stock watcher.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Command used to run the fetch routine (an interpreter or executable).
    #[clap(long, default_value = "python3")]
    pub command: String,

    /// Path to the quote-retrieval script. It is invoked with two positional
    /// arguments: its own path and the staging path it must write to.
    #[clap(long)]
    pub script: PathBuf,

    /// Staging path the fetch routine writes its raw result to.
    #[clap(long)]
    pub staging: PathBuf,

    /// Canonical snapshot path published for viewers.
    #[clap(long)]
    pub snapshot: PathBuf,

    /// Refresh interval in seconds.
    #[clap(long, default_value_t = 20)]
    pub interval: u64,

    /// Fetch timeout in seconds; the routine is killed once it is exceeded.
    #[clap(long, default_value_t = 60)]
    pub fetch_timeout: u64,

    /// Run a single refresh cycle and exit.
    #[clap(long)]
    pub once: bool,
}

//! Command-line arguments for the stock viewer.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the published snapshot file.
    #[clap(long)]
    pub snapshot: PathBuf,

    /// Re-read and re-render every N seconds instead of exiting.
    #[clap(long)]
    pub follow: Option<u64>,
}

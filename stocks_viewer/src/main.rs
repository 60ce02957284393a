//! Stock snapshot viewer.
//!
//! Reads the snapshot file the watcher publishes and renders a portfolio
//! summary to stdout: one row per symbol plus balance/original/difference
//! totals. The viewer is a pure reader — it never blocks the watcher, and any
//! number of viewers may run concurrently against the same snapshot path.
//!
//! A missing or unreadable snapshot renders an explicit empty state rather
//! than failing: mid-refresh states and first-run conditions are expected,
//! not exceptional.
//!
//! Usage example (CLI):
//! ```bash
//! stocks_viewer --snapshot ~/stocks/output.json --follow 20
//! ```
#![warn(missing_docs)]
mod args;
mod model;

use std::thread;
use std::time::Duration;

use clap::Parser;
use log::debug;

use stocks_common::SnapshotReader;

use crate::args::Args;
use crate::model::portfolio;

fn main() {
    init_logger();
    let args = Args::parse();
    let reader = SnapshotReader::new(&args.snapshot);

    match args.follow {
        Some(secs) => {
            let interval = Duration::from_secs(secs.max(1));
            debug!(
                "following {} every {:?}",
                reader.path().display(),
                interval
            );
            loop {
                // Re-read every pass; the watcher may have replaced the file.
                print!("{}", portfolio::render(&reader.read()));
                println!();
                thread::sleep(interval);
            }
        }
        None => print!("{}", portfolio::render(&reader.read())),
    }
}

fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}

//! Stock snapshot watcher.
//!
//! This binary owns the write side of the pipeline. On a fixed interval (and
//! on demand) it runs one refresh cycle:
//!
//! - `QuoteFetcher` — shells out to the external quote-retrieval routine,
//!   handing it the staging path it must write its raw result to.
//! - `SnapshotReader` — loads the staging result tolerantly (bad fields
//!   degrade, bad entries are skipped).
//! - `SnapshotWriter` — republishes the result to the canonical snapshot
//!   path via an atomic replace, so viewer processes never see a torn file.
//!
//! The `RefreshScheduler` keeps cycles strictly sequential: overlapping
//! triggers coalesce, and a failure anywhere in a cycle is logged while the
//! previously published snapshot stays visible to viewers. Ctrl+C shuts the
//! scheduler down between cycles; an in-flight fetch is only cancelled by
//! its own timeout.
//!
//! Usage example (CLI):
//! ```bash
//! stocks_watcher --script ./get_stonks.py \
//!     --staging /tmp/stocks-staging.json \
//!     --snapshot ~/stocks/output.json \
//!     --interval 20
//! ```
#![warn(missing_docs)]
mod args;
mod fetcher;
mod scheduler;

use std::time::Duration;

use clap::Parser;
use log::info;

use stocks_common::{Result, SnapshotReader, SnapshotWriter, StoreError};

use crate::args::Args;
use crate::fetcher::QuoteFetcher;
use crate::scheduler::{RefreshCycle, RefreshScheduler};

/// One refresh unit of work: run the fetch routine, then republish its
/// staging result as the canonical snapshot.
struct SnapshotRefresh {
    fetcher: QuoteFetcher,
    staging: SnapshotReader,
    writer: SnapshotWriter,
}

impl RefreshCycle for SnapshotRefresh {
    fn fetch(&mut self) -> Result<()> {
        self.fetcher.fetch()
    }

    fn publish(&mut self) -> Result<()> {
        let snapshot = self.staging.read();
        // An empty staging result is treated as a failed cycle so the
        // previously published snapshot survives.
        if snapshot.is_empty() {
            return Err(StoreError::Write(format!(
                "staging result at {} is empty or unreadable",
                self.staging.path().display()
            )));
        }
        self.writer.write(&snapshot)
    }
}

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let cycle = SnapshotRefresh {
        fetcher: QuoteFetcher::new(
            args.command.as_str(),
            &args.script,
            &args.staging,
            Duration::from_secs(args.fetch_timeout),
        ),
        staging: SnapshotReader::new(&args.staging),
        writer: SnapshotWriter::new(&args.snapshot),
    };
    let (mut scheduler, handle) = RefreshScheduler::new(cycle, refresh_interval(args.interval));

    if args.once {
        scheduler.refresh_now();
        return Ok(());
    }

    {
        let handle = handle.clone();
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down watcher...");
            handle.shutdown();
        })
        .expect("Error setting Ctrl+C handler");
    }

    // First snapshot right away instead of after a full interval.
    handle.trigger();
    info!("Watcher is running. Press Ctrl+C to exit.");
    scheduler.run();
    Ok(())
}

/// Interval between scheduled refreshes; a zero value would spin the
/// scheduler in a busy fetch loop, so it is clamped to one second.
fn refresh_interval(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

fn init_logger() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn refresh(dir: &Path, script_body: &str) -> SnapshotRefresh {
        let script = dir.join("fetch.sh");
        fs::write(&script, script_body).unwrap();
        let staging = dir.join("staging.json");
        SnapshotRefresh {
            fetcher: QuoteFetcher::new("sh", &script, &staging, Duration::from_secs(10)),
            staging: SnapshotReader::new(&staging),
            writer: SnapshotWriter::new(dir.join("output.json")),
        }
    }

    #[test]
    fn cycle_publishes_what_the_routine_staged() {
        let dir = tempdir().unwrap();
        let cycle = refresh(
            dir.path(),
            "printf '{\"AAPL\": {\"Price\": 150.0, \"Value\": 1500.0}}' > \"$1\"\n",
        );

        let (mut scheduler, _handle) = RefreshScheduler::new(cycle, Duration::from_secs(3600));
        scheduler.refresh_now();

        let published = SnapshotReader::new(dir.path().join("output.json")).read();
        assert_eq!(published.get("AAPL").unwrap().price, Some(150.0));
        assert_eq!(published.total_value(), 1500.0);
    }

    #[test]
    fn failed_fetch_keeps_the_previous_snapshot() {
        let dir = tempdir().unwrap();
        let good = refresh(dir.path(), "printf '{\"AAPL\": {\"Price\": 150.0}}' > \"$1\"\n");
        let (mut scheduler, _handle) = RefreshScheduler::new(good, Duration::from_secs(3600));
        scheduler.refresh_now();

        let failing = refresh(dir.path(), "exit 1\n");
        let (mut scheduler, _handle) = RefreshScheduler::new(failing, Duration::from_secs(3600));
        scheduler.refresh_now();

        let published = SnapshotReader::new(dir.path().join("output.json")).read();
        assert_eq!(published.len(), 1);
        assert_eq!(published.get("AAPL").unwrap().price, Some(150.0));
    }

    #[test]
    fn zero_interval_is_clamped_to_one_second() {
        assert_eq!(refresh_interval(0), Duration::from_secs(1));
        assert_eq!(refresh_interval(20), Duration::from_secs(20));
    }

    #[test]
    fn empty_staging_result_is_a_publish_error() {
        let dir = tempdir().unwrap();
        let mut cycle = refresh(dir.path(), "exit 0\n");

        cycle.fetch().unwrap();
        let err = cycle.publish().unwrap_err();

        assert!(err.to_string().contains("empty or unreadable"));
        assert!(!dir.path().join("output.json").exists());
    }
}

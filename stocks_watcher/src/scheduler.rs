//! Interval-and-trigger refresh scheduling.
//!
//! The scheduler drives refresh cycles — fetch, then publish — on a fixed
//! interval and whenever a [`RefreshHandle::trigger`] arrives. It is a single
//! cooperative loop, not a free-running timer: a new cycle starts only after
//! the previous one finished, so two fetches can never overlap against the
//! same snapshot path. Triggers that pile up while a cycle is in flight
//! collapse into at most one follow-up cycle.
//!
//! A failing cycle logs its error and returns the scheduler to idle; it never
//! halts future cycles, and the previously published snapshot stays visible.
//!
//! The scheduler knows nothing about processes, files, or rendering: the
//! cycle body is supplied through the [`RefreshCycle`] trait, which keeps the
//! loop testable in isolation.
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, select, tick, unbounded};
use log::{debug, error, info};
use strum::Display;

use stocks_common::Result;

/// Phases a refresh cycle moves through: Idle → Fetching → Writing → Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Phase {
    /// Waiting for the next tick or trigger.
    Idle,
    /// The external fetch routine is running.
    Fetching,
    /// The staging result is being republished as the canonical snapshot.
    Writing,
}

/// One unit of refresh work, split along the scheduler's phases.
pub trait RefreshCycle {
    /// Runs the fetch step (the `Fetching` phase).
    fn fetch(&mut self) -> Result<()>;
    /// Publishes the fetched result (the `Writing` phase).
    fn publish(&mut self) -> Result<()>;
}

/// Cloneable handle for requesting refreshes and shutting the scheduler down
/// from other threads (e.g. a Ctrl+C handler).
#[derive(Clone)]
pub struct RefreshHandle {
    trigger_tx: Sender<()>,
    shutdown_tx: Sender<()>,
}

impl RefreshHandle {
    /// Requests an on-demand refresh. Requests arriving while a cycle is in
    /// flight coalesce into a single follow-up cycle.
    pub fn trigger(&self) {
        let _ = self.trigger_tx.send(());
    }

    /// Asks the scheduler to stop. Takes effect between cycles.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Drives [`RefreshCycle`]s on an interval and on demand.
pub struct RefreshScheduler<C: RefreshCycle> {
    cycle: C,
    interval: Duration,
    trigger_rx: Receiver<()>,
    shutdown_rx: Receiver<()>,
}

impl<C: RefreshCycle> RefreshScheduler<C> {
    /// Creates a scheduler around `cycle` together with its control handle.
    pub fn new(cycle: C, interval: Duration) -> (Self, RefreshHandle) {
        let (trigger_tx, trigger_rx) = unbounded();
        let (shutdown_tx, shutdown_rx) = unbounded();
        (
            RefreshScheduler {
                cycle,
                interval,
                trigger_rx,
                shutdown_rx,
            },
            RefreshHandle {
                trigger_tx,
                shutdown_tx,
            },
        )
    }

    /// Runs cycles until a shutdown message arrives.
    pub fn run(mut self) {
        info!("scheduler running, refresh interval {:?}", self.interval);
        let ticker = tick(self.interval);
        let trigger_rx = self.trigger_rx.clone();
        let shutdown_rx = self.shutdown_rx.clone();
        loop {
            select! {
                recv(shutdown_rx) -> _ => break,
                recv(ticker) -> _ => self.refresh_now(),
                recv(trigger_rx) -> msg => if msg.is_ok() {
                    // collapse triggers queued while the last cycle ran
                    while trigger_rx.try_recv().is_ok() {}
                    self.refresh_now();
                },
            }
        }
        info!("scheduler stopped");
    }

    /// Runs a single fetch-then-publish cycle.
    ///
    /// A failure in either phase is logged and leaves the previously
    /// published snapshot in place; the scheduler returns to idle either way.
    pub fn refresh_now(&mut self) {
        debug!("refresh cycle: {}", Phase::Fetching);
        if let Err(e) = self.cycle.fetch() {
            error!("fetch failed, keeping previous snapshot: {}", e);
            debug!("refresh cycle: {}", Phase::Idle);
            return;
        }

        debug!("refresh cycle: {}", Phase::Writing);
        if let Err(e) = self.cycle.publish() {
            error!("publish failed, keeping previous snapshot: {}", e);
        }
        debug!("refresh cycle: {}", Phase::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use stocks_common::StoreError;

    struct StubCycle {
        fetches: Arc<AtomicUsize>,
        publishes: Arc<AtomicUsize>,
        fail_first_fetches: usize,
        delay: Duration,
    }

    impl StubCycle {
        fn new(fail_first_fetches: usize, delay: Duration) -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let fetches = Arc::new(AtomicUsize::new(0));
            let publishes = Arc::new(AtomicUsize::new(0));
            (
                StubCycle {
                    fetches: fetches.clone(),
                    publishes: publishes.clone(),
                    fail_first_fetches,
                    delay,
                },
                fetches,
                publishes,
            )
        }
    }

    impl RefreshCycle for StubCycle {
        fn fetch(&mut self) -> Result<()> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            if n < self.fail_first_fetches {
                return Err(StoreError::Fetch("stub failure".to_string()));
            }
            Ok(())
        }

        fn publish(&mut self) -> Result<()> {
            self.publishes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    // Interval far beyond the test duration so only explicit triggers fire.
    const QUIET: Duration = Duration::from_secs(3600);

    #[test]
    fn trigger_runs_one_cycle() {
        let (cycle, fetches, publishes) = StubCycle::new(0, Duration::ZERO);
        let (scheduler, handle) = RefreshScheduler::new(cycle, QUIET);
        let worker = thread::spawn(move || scheduler.run());

        handle.trigger();
        thread::sleep(Duration::from_millis(300));
        handle.shutdown();
        worker.join().unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 1);
        assert_eq!(publishes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_fetch_skips_publish_but_not_later_cycles() {
        let (cycle, fetches, publishes) = StubCycle::new(1, Duration::ZERO);
        let (scheduler, handle) = RefreshScheduler::new(cycle, QUIET);
        let worker = thread::spawn(move || scheduler.run());

        handle.trigger();
        thread::sleep(Duration::from_millis(300));
        handle.trigger();
        thread::sleep(Duration::from_millis(300));
        handle.shutdown();
        worker.join().unwrap();

        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        assert_eq!(publishes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn triggers_during_a_cycle_coalesce() {
        let (cycle, fetches, _publishes) = StubCycle::new(0, Duration::from_millis(150));
        let (scheduler, handle) = RefreshScheduler::new(cycle, QUIET);
        let worker = thread::spawn(move || scheduler.run());

        handle.trigger();
        thread::sleep(Duration::from_millis(30));
        for _ in 0..5 {
            handle.trigger();
        }
        thread::sleep(Duration::from_millis(800));
        handle.shutdown();
        worker.join().unwrap();

        let count = fetches.load(Ordering::SeqCst);
        assert!(
            (1..=2).contains(&count),
            "expected the queued triggers to coalesce, got {count} cycles"
        );
    }

    #[test]
    fn interval_ticks_drive_cycles() {
        let (cycle, fetches, _publishes) = StubCycle::new(0, Duration::ZERO);
        let (scheduler, handle) = RefreshScheduler::new(cycle, Duration::from_millis(50));
        let worker = thread::spawn(move || scheduler.run());

        thread::sleep(Duration::from_millis(400));
        handle.shutdown();
        worker.join().unwrap();

        assert!(fetches.load(Ordering::SeqCst) >= 2);
    }
}

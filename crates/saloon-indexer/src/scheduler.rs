use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use saloon_core::{Error, Result};

use crate::jobs::{JobOutcome, JobQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Default)]
struct Counters {
    completed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunCounts {
    pub completed: u64,
    pub failed: u64,
    pub skipped: u64,
}

/// Drives one registered job: once at start, then once per `interval`.
///
/// Runs are awaited inline, so they never overlap; a run longer than the
/// interval delays the next tick instead of stacking ticks up.
pub struct Scheduler {
    queue: Arc<JobQueue>,
    job: String,
    interval: Duration,
}

impl Scheduler {
    pub fn new(queue: Arc<JobQueue>, job: impl Into<String>, interval: Duration) -> Self {
        Self { queue, job: job.into(), interval }
    }

    /// Start the loop on its own tokio task. Must be called inside a runtime.
    pub fn spawn(self) -> Result<SchedulerHandle> {
        if !self.queue.contains(&self.job) {
            return Err(Error::NotFound(format!("job '{}'", self.job)));
        }
        if self.interval.is_zero() {
            return Err(Error::InvalidConfig("scheduler interval must be positive".into()));
        }
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(SchedulerState::Idle);
        let (trigger_tx, trigger_rx) = mpsc::channel(1);
        let counters = Arc::new(Counters::default());
        let task = tokio::spawn(self.run(shutdown_rx, trigger_rx, state_tx, Arc::clone(&counters)));
        Ok(SchedulerHandle { shutdown_tx, trigger_tx, state_rx, counters, task })
    }

    async fn run(
        self,
        mut shutdown_rx: watch::Receiver<bool>,
        mut trigger_rx: mpsc::Receiver<()>,
        state_tx: watch::Sender<SchedulerState>,
        counters: Arc<Counters>,
    ) {
        info!(job = %self.job, interval_secs = self.interval.as_secs(), "indexing scheduler started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown_rx) => break,
                _ = ticker.tick() => {}
                Some(()) = trigger_rx.recv() => debug!(job = %self.job, "manual run requested"),
            }
            if !self.run_once(&mut shutdown_rx, &state_tx, &counters).await {
                break;
            }
        }

        state_tx.send_replace(SchedulerState::Stopped);
        info!(job = %self.job, "indexing scheduler stopped");
    }

    /// Returns false when shutdown was requested while the job ran.
    async fn run_once(
        &self,
        shutdown_rx: &mut watch::Receiver<bool>,
        state_tx: &watch::Sender<SchedulerState>,
        counters: &Counters,
    ) -> bool {
        state_tx.send_replace(SchedulerState::Running);
        let outcome = tokio::select! {
            biased;
            _ = shutdown_requested(shutdown_rx) => {
                warn!(job = %self.job, "shutdown requested, abandoning indexing run");
                return false;
            }
            outcome = self.queue.perform(&self.job) => outcome,
        };
        match outcome {
            Ok(JobOutcome::Completed { elapsed }) => {
                counters.completed.fetch_add(1, Ordering::Relaxed);
                debug!(job = %self.job, elapsed_ms = elapsed.as_millis() as u64, "indexing run finished");
            }
            Ok(JobOutcome::Skipped) => {
                counters.skipped.fetch_add(1, Ordering::Relaxed);
                info!(job = %self.job, "previous indexing run still in flight, skipped");
            }
            Err(e) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                if e.aborts_run() {
                    warn!(job = %self.job, error = %e, "indexing run failed");
                } else {
                    error!(job = %self.job, error = %e, "indexing run failed, index may need attention");
                }
            }
        }
        state_tx.send_replace(SchedulerState::Idle);
        true
    }
}

/// Resolves once shutdown is signalled or the handle is gone.
async fn shutdown_requested(rx: &mut watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

/// Control surface of a spawned [`Scheduler`]. Dropping it stops the loop.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    trigger_tx: mpsc::Sender<()>,
    state_rx: watch::Receiver<SchedulerState>,
    counters: Arc<Counters>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn state(&self) -> SchedulerState {
        *self.state_rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state_rx.clone()
    }

    pub fn counts(&self) -> RunCounts {
        RunCounts {
            completed: self.counters.completed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            skipped: self.counters.skipped.load(Ordering::Relaxed),
        }
    }

    /// Ask for an extra run as soon as the loop is idle. Returns false when
    /// a request is already pending; requests coalesce.
    pub fn trigger(&self) -> bool {
        self.trigger_tx.try_send(()).is_ok()
    }

    /// Stop the loop and wait for its task. An in-flight run is abandoned.
    pub async fn shutdown(self) -> Result<()> {
        self.shutdown_tx.send_replace(true);
        self.task.await.map_err(|e| Error::Operation(format!("scheduler task failed: {}", e)))
    }
}

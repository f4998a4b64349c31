/// Reconcile loop driving a [`JobRunner`]
///
/// The worker owns the set of running jobs. New jobs arrive over the intake channel, and every
/// poll interval the whole set is handed to `find_completed`. Jobs that completed or failed are
/// dropped from the set and published on the outcome channel, so each outcome is reported once.
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{BridgeError, BridgeResult};
use crate::runner::JobRunner;
use crate::types::{BacalhauJobRunningEvent, JobOutcomeEvent};

const CHANNEL_CAPACITY: usize = 1024;

pub struct ReconcileWorker {
    runner: Arc<dyn JobRunner>,
    poll_interval: Duration,
    tracked: Vec<BacalhauJobRunningEvent>,
    intake: mpsc::Receiver<BacalhauJobRunningEvent>,
    outcomes: mpsc::Sender<JobOutcomeEvent>,
    shutdown: CancellationToken,
}

impl ReconcileWorker {
    /// Returns the worker, the sender new running jobs are tracked through and the receiver
    /// outcomes are published on.
    pub fn new(
        runner: Arc<dyn JobRunner>,
        poll_interval: Duration,
        shutdown: CancellationToken,
    ) -> (Self, mpsc::Sender<BacalhauJobRunningEvent>, mpsc::Receiver<JobOutcomeEvent>) {
        let (intake_tx, intake) = mpsc::channel(CHANNEL_CAPACITY);
        let (outcomes, outcomes_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let worker = Self { runner, poll_interval, tracked: Vec::new(), intake, outcomes, shutdown };
        (worker, intake_tx, outcomes_rx)
    }

    pub fn tracked(&self) -> &[BacalhauJobRunningEvent] {
        &self.tracked
    }

    /// Starts tracking `job`, a job that is already tracked is ignored.
    pub fn track(&mut self, job: BacalhauJobRunningEvent) {
        if self.tracked.iter().any(|tracked| tracked.job_id() == job.job_id()) {
            debug!(job_id = %job.job_id(), "Job already tracked");
            return;
        }
        debug!(order_id = %job.order_id(), job_id = %job.job_id(), "Tracking job");
        self.tracked.push(job);
    }

    /// Runs one reconcile pass and returns how many jobs were retired.
    pub async fn reconcile_once(&mut self) -> BridgeResult<usize> {
        if self.tracked.is_empty() {
            return Ok(0);
        }

        let (completed, failed) = self.runner.find_completed(&self.tracked).await;

        let retired: HashSet<String> = completed
            .iter()
            .map(|event| event.job_id().to_string())
            .chain(failed.iter().map(|event| event.job_id().to_string()))
            .collect();
        self.tracked.retain(|job| !retired.contains(job.job_id()));

        let outcomes = completed
            .into_iter()
            .map(JobOutcomeEvent::Completed)
            .chain(failed.into_iter().map(JobOutcomeEvent::Failed));
        for outcome in outcomes {
            self.outcomes
                .send(outcome)
                .await
                .map_err(|_| BridgeError::WorkerError("outcome receiver dropped".to_string()))?;
        }

        debug!(retired = retired.len(), still_running = self.tracked.len(), "Reconcile pass finished");
        Ok(retired.len())
    }

    /// Runs until the shutdown token is cancelled.
    pub async fn run(mut self) -> BridgeResult<()> {
        info!(poll_interval = ?self.poll_interval, tracked = self.tracked.len(), "Starting reconcile worker");

        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!(tracked = self.tracked.len(), "Reconcile worker received shutdown signal");
                    break;
                }
                Some(job) = self.intake.recv() => self.track(job),
                _ = interval.tick() => {
                    self.reconcile_once().await?;
                }
            }
        }

        Ok(())
    }
}

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lilypad_compute_client_interface::{ComputeClient, JobSnapshot, ListRequest};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{BridgeError, BridgeResult};
use crate::runner::classify::{classify, JobOutcome};
use crate::runner::{
    order_annotation, JobRunner, LILYPAD_JOB_ANNOTATION, LIST_PAGE_SIZE, LIST_SORT_FIELD, LIST_TIMEOUT,
};
use crate::types::{
    BacalhauJobCompletedEvent, BacalhauJobFailedEvent, BacalhauJobRunningEvent, ContractSubmittedEvent,
};

/// [`JobRunner`] backed by a [`ComputeClient`].
pub struct BacalhauJobRunner {
    client: Arc<dyn ComputeClient>,
    list_timeout: Duration,
    shutdown: CancellationToken,
}

impl BacalhauJobRunner {
    pub fn new(client: Arc<dyn ComputeClient>) -> Self {
        Self { client, list_timeout: LIST_TIMEOUT, shutdown: CancellationToken::new() }
    }

    /// Cancelling `shutdown` aborts an in-flight listing, the reconcile pass then reports nothing.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    async fn list_lilypad_jobs(&self) -> BridgeResult<Vec<JobSnapshot>> {
        let request = ListRequest {
            include_tags: vec![LILYPAD_JOB_ANNOTATION.to_string()],
            max_jobs: LIST_PAGE_SIZE,
            sort_by: LIST_SORT_FIELD.to_string(),
            sort_reverse: true,
        };

        tokio::select! {
            _ = self.shutdown.cancelled() => Err(BridgeError::Cancelled),
            listed = tokio::time::timeout(self.list_timeout, self.client.list(request)) => match listed {
                Ok(jobs) => jobs.map_err(BridgeError::JobListing),
                Err(_) => Err(BridgeError::JobListingTimeout(self.list_timeout)),
            },
        }
    }
}

#[async_trait]
impl JobRunner for BacalhauJobRunner {
    #[tracing::instrument(skip_all, fields(order_id = %event.order_id()))]
    async fn create(&self, event: ContractSubmittedEvent) -> BridgeResult<BacalhauJobRunningEvent> {
        debug!(log_type = "starting", "Creating Bacalhau job");

        let mut spec = event.spec();
        spec.annotations.push(LILYPAD_JOB_ANNOTATION.to_string());
        spec.annotations.push(order_annotation(event.order_id()));

        let job = self.client.submit(spec).await.map_err(|e| {
            error!(error = %e, "Failed to submit Bacalhau job");
            BridgeError::JobSubmission(e)
        })?;

        info!(log_type = "completed", job_id = %job, "Created Bacalhau job");
        Ok(event.job_created(job))
    }

    async fn find_completed(
        &self,
        jobs: &[BacalhauJobRunningEvent],
    ) -> (Vec<BacalhauJobCompletedEvent>, Vec<BacalhauJobFailedEvent>) {
        debug!(jobs = jobs.len(), "Looking at job states");

        let mut completed = Vec::with_capacity(jobs.len());
        let mut failed = Vec::with_capacity(jobs.len());

        let snapshots = match self.list_lilypad_jobs().await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                error!(error = %e, "Failed to list Bacalhau jobs, skipping this pass");
                return (completed, failed);
            }
        };

        for job in jobs {
            let Some(snapshot) = snapshots.iter().find(|snapshot| snapshot.id == job.job_id()) else {
                continue;
            };

            match classify(snapshot) {
                JobOutcome::Running => {
                    debug!(order_id = %job.order_id(), job_id = %job.job_id(), "Bacalhau job still in progress");
                }
                JobOutcome::Completed => {
                    info!(order_id = %job.order_id(), job_id = %job.job_id(), "Bacalhau job completed");
                    completed.push(job.completed());
                }
                JobOutcome::Failed => {
                    info!(order_id = %job.order_id(), job_id = %job.job_id(), "Bacalhau job failed");
                    failed.push(job.failed());
                }
                JobOutcome::Unknown => {
                    warn!(order_id = %job.order_id(), job_id = %job.job_id(), "Bacalhau job in unknown state");
                }
            }
        }

        (completed, failed)
    }
}

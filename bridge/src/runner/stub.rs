//! Canned [`JobRunner`] for exercising code that consumes runner output.

use std::sync::Arc;

use async_trait::async_trait;
use lilypad_compute_client_interface::{ComputeClientError, JobHandle};

use crate::error::{BridgeError, BridgeResult};
use crate::runner::JobRunner;
use crate::types::{
    BacalhauJobCompletedEvent, BacalhauJobFailedEvent, BacalhauJobRunningEvent, ContractSubmittedEvent,
};

pub type CreateHandler = Arc<dyn Fn(ContractSubmittedEvent) -> BridgeResult<BacalhauJobRunningEvent> + Send + Sync>;
pub type FindCompletedHandler = Arc<
    dyn Fn(&[BacalhauJobRunningEvent]) -> (Vec<BacalhauJobCompletedEvent>, Vec<BacalhauJobFailedEvent>) + Send + Sync,
>;

/// Every order gets a job named `stub-job-<order id>`.
pub fn successful_create() -> CreateHandler {
    Arc::new(|event: ContractSubmittedEvent| {
        let job = JobHandle::new(format!("stub-job-{}", event.order_id()));
        Ok(event.job_created(job))
    })
}

pub fn error_create() -> CreateHandler {
    Arc::new(|_: ContractSubmittedEvent| {
        Err(BridgeError::JobSubmission(ComputeClientError::Unavailable("error creating job".to_string())))
    })
}

/// Every job passed in completed.
pub fn successful_find() -> FindCompletedHandler {
    Arc::new(|jobs: &[BacalhauJobRunningEvent]| (jobs.iter().map(|job| job.completed()).collect(), Vec::new()))
}

/// Every job passed in failed.
pub fn failed_find() -> FindCompletedHandler {
    Arc::new(|jobs: &[BacalhauJobRunningEvent]| (Vec::new(), jobs.iter().map(|job| job.failed()).collect()))
}

/// Falls back to [`successful_create`] and [`successful_find`] for unset handlers.
#[derive(Clone, Default)]
pub struct StubJobRunner {
    pub create_handler: Option<CreateHandler>,
    pub find_completed_handler: Option<FindCompletedHandler>,
}

impl StubJobRunner {
    pub fn new(create_handler: CreateHandler, find_completed_handler: FindCompletedHandler) -> Self {
        Self { create_handler: Some(create_handler), find_completed_handler: Some(find_completed_handler) }
    }
}

#[async_trait]
impl JobRunner for StubJobRunner {
    async fn create(&self, event: ContractSubmittedEvent) -> BridgeResult<BacalhauJobRunningEvent> {
        match &self.create_handler {
            Some(handler) => handler(event),
            None => successful_create()(event),
        }
    }

    async fn find_completed(
        &self,
        jobs: &[BacalhauJobRunningEvent],
    ) -> (Vec<BacalhauJobCompletedEvent>, Vec<BacalhauJobFailedEvent>) {
        match &self.find_completed_handler {
            Some(handler) => handler(jobs),
            None => successful_find()(jobs),
        }
    }
}

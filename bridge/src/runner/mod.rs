pub mod bacalhau;
pub mod classify;
pub mod stub;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BridgeResult;
use crate::types::{
    BacalhauJobCompletedEvent, BacalhauJobFailedEvent, BacalhauJobRunningEvent, ContractSubmittedEvent, OrderId,
};

pub use bacalhau::BacalhauJobRunner;
pub use classify::{classify, JobOutcome};
pub use stub::StubJobRunner;

/// Annotation carried by every job the bridge submits
pub const LILYPAD_JOB_ANNOTATION: &str = "lilypad-job";

/// Upper bound on the jobs fetched by one reconcile pass
pub const LIST_PAGE_SIZE: usize = 100;
/// Listing that takes longer ends the reconcile pass with no outcomes
pub const LIST_TIMEOUT: Duration = Duration::from_secs(5);
/// Listed newest first by this field
pub const LIST_SORT_FIELD: &str = "created_at";

/// Annotation tying a job back to the order it runs for.
pub fn order_annotation(order_id: OrderId) -> String {
    // TODO: hide the order id once the contract side can decrypt annotations
    format!("{}-{}", LILYPAD_JOB_ANNOTATION, order_id)
}

/// Runs contract orders as jobs on the compute network.
///
/// `create` is the submitting half, `find_completed` the reconciling half. Jobs returned by
/// `find_completed` are finished for good and must not be passed to it again.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Submits the job for `event`. On error nothing was created and the event can be retried.
    async fn create(&self, event: ContractSubmittedEvent) -> BridgeResult<BacalhauJobRunningEvent>;

    /// Returns the subsets of `jobs` that completed and that failed. Jobs in neither are still
    /// running as far as the caller is concerned.
    async fn find_completed(
        &self,
        jobs: &[BacalhauJobRunningEvent],
    ) -> (Vec<BacalhauJobCompletedEvent>, Vec<BacalhauJobFailedEvent>);
}

pub mod in_memory;
pub mod types;

use async_trait::async_trait;
use mockall::automock;

pub use crate::in_memory::InMemoryComputeClient;
pub use crate::types::{
    Deal, DockerSpec, EngineType, ExecutionPlan, JobHandle, JobSnapshot, JobSpec, JobState, ListRequest, NodeState,
    PublisherType, ShardState, ShardStateType, VerifierType,
};

/// Compute client provides an abstraction over the batch-compute network that runs the jobs
/// created for contract orders:
/// - Accept a job spec (carrying caller supplied annotations) and hand back the id the network
///   assigned to it
/// - List the jobs it knows about, filtered by annotation, with their per-shard execution state
///
/// Listing is eventually consistent: a freshly submitted job may be missing from the list, and
/// the shard states of a job can lag behind its real progress.
#[automock]
#[async_trait]
pub trait ComputeClient: Send + Sync {
    async fn submit(&self, spec: JobSpec) -> Result<JobHandle, ComputeClientError>;
    async fn list(&self, request: ListRequest) -> Result<Vec<JobSnapshot>, ComputeClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ComputeClientError {
    #[error("Internal compute client error: {0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
    #[error("Job spec is invalid: {0}")]
    InvalidSpec(String),
    #[error("Job was rejected by the compute network: {0}")]
    Rejected(String),
    #[error("Compute network is unavailable: {0}")]
    Unavailable(String),
}

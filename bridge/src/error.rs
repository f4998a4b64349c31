use std::time::Duration;

use lilypad_compute_client_interface::ComputeClientError;
use thiserror::Error;

/// Result type for bridge operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Error types for the bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The compute network did not accept the job, the order event is left untouched
    #[error("error submitting job: {0}")]
    JobSubmission(#[source] ComputeClientError),

    #[error("error listing jobs: {0}")]
    JobListing(#[source] ComputeClientError),

    #[error("listing jobs timed out after {0:?}")]
    JobListingTimeout(Duration),

    #[error("operation cancelled by shutdown")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid job spec in {path}: {message}")]
    InvalidJobSpec { path: String, message: String },

    /// Worker error
    #[error("Worker error: {0}")]
    WorkerError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

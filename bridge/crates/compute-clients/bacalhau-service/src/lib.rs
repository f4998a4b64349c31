pub mod client;
pub mod constants;
pub mod error;
pub mod signing;
pub mod types;

use std::path::PathBuf;

use async_trait::async_trait;
use lilypad_compute_client_interface::{ComputeClient, ComputeClientError, JobHandle, JobSnapshot, JobSpec, ListRequest};
use serde_json::value::RawValue;
use url::Url;

use crate::client::BacalhauClient;
use crate::constants::JOB_API_VERSION;
use crate::error::BacalhauError;
use crate::signing::ClientKey;
use crate::types::{
    BacalhauJob, BacalhauJobCreatePayload, BacalhauJobMetadata, BacalhauJobStatus, BacalhauListRequest,
    BacalhauSubmitRequest,
};

#[derive(Debug, Clone)]
pub struct BacalhauValidatedArgs {
    pub bacalhau_api_url: Url,
    /// PEM file holding the RSA key submissions are signed with, created when missing
    pub bacalhau_key_path: PathBuf,
}

/// Bacalhau is the batch-compute network the contract orders are executed on.
pub struct BacalhauService {
    pub bacalhau_client: BacalhauClient,
    pub client_key: ClientKey,
}

#[async_trait]
impl ComputeClient for BacalhauService {
    #[tracing::instrument(skip(self, spec))]
    async fn submit(&self, spec: JobSpec) -> Result<JobHandle, ComputeClientError> {
        tracing::debug!(log_type = "starting", annotations = ?spec.annotations, "Submitting job to Bacalhau.");
        let payload = BacalhauJobCreatePayload {
            client_id: self.client_key.client_id().to_string(),
            job: BacalhauJob {
                api_version: JOB_API_VERSION.to_string(),
                metadata: BacalhauJobMetadata::default(),
                spec,
                status: BacalhauJobStatus::default(),
            },
        };
        let data = serde_json::to_string(&payload)
            .map_err(|e| ComputeClientError::InvalidSpec(format!("job spec does not serialize: {}", e)))?;
        let signature = self.client_key.sign(data.as_bytes());
        let data = RawValue::from_string(data)
            .map_err(|e| ComputeClientError::InvalidSpec(format!("job spec does not serialize: {}", e)))?;

        let request =
            BacalhauSubmitRequest { data, signature, client_public_key: self.client_key.public_key().to_string() };

        let response = self.bacalhau_client.submit_job(&request).await?;
        if response.job.metadata.id.is_empty() {
            return Err(ComputeClientError::Rejected("requester node returned a job without an id".to_string()));
        }

        tracing::debug!(log_type = "completed", job_id = %response.job.metadata.id, "Job submitted to Bacalhau.");
        Ok(JobHandle::new(response.job.metadata.id))
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, request: ListRequest) -> Result<Vec<JobSnapshot>, ComputeClientError> {
        // No client id: jobs are matched by tag whichever client submitted them
        let request = BacalhauListRequest {
            client_id: String::new(),
            max_jobs: request.max_jobs,
            return_all: false,
            include_tags: request.include_tags,
            exclude_tags: Vec::new(),
            sort_by: request.sort_by,
            sort_reverse: request.sort_reverse,
        };

        let response = self.bacalhau_client.list_jobs(&request).await?;
        let jobs = response.jobs.unwrap_or_default();
        tracing::debug!(jobs = jobs.len(), "Listed Bacalhau jobs.");
        Ok(jobs.into_iter().map(JobSnapshot::from).collect())
    }
}

impl BacalhauService {
    pub fn new(bacalhau_client: BacalhauClient, client_key: ClientKey) -> Self {
        Self { bacalhau_client, client_key }
    }

    pub fn new_with_args(bacalhau_params: &BacalhauValidatedArgs) -> Result<Self, BacalhauError> {
        let client_key = ClientKey::load_or_create(&bacalhau_params.bacalhau_key_path)?;
        let bacalhau_client = BacalhauClient::new(bacalhau_params.bacalhau_api_url.clone());
        Ok(Self::new(bacalhau_client, client_key))
    }

    pub fn with_test_params(port: u16, client_key: ClientKey) -> Result<Self, url::ParseError> {
        let url = Url::parse(&format!("http://127.0.0.1:{}", port))?;
        Ok(Self::new(BacalhauClient::new(url), client_key))
    }
}

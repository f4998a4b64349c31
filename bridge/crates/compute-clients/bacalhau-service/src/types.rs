use lilypad_compute_client_interface::{JobSnapshot, JobSpec, JobState};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BacalhauJobMetadata {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "ClientID")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BacalhauJobStatus {
    #[serde(default)]
    pub state: JobState,
}

/// A job as the requester node reports it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BacalhauJob {
    #[serde(default, rename = "APIVersion")]
    pub api_version: String,
    #[serde(default)]
    pub metadata: BacalhauJobMetadata,
    #[serde(default)]
    pub spec: JobSpec,
    #[serde(default)]
    pub status: BacalhauJobStatus,
}

impl From<BacalhauJob> for JobSnapshot {
    fn from(job: BacalhauJob) -> Self {
        JobSnapshot { id: job.metadata.id, spec: job.spec, state: job.status.state }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BacalhauJobCreatePayload {
    #[serde(rename = "ClientID")]
    pub client_id: String,
    pub job: BacalhauJob,
}

/// Body of `POST /submit`.
///
/// `data` is the serialized [`BacalhauJobCreatePayload`] kept verbatim, since `signature` covers
/// exactly those bytes.
#[derive(Debug, Clone, Serialize)]
pub struct BacalhauSubmitRequest {
    pub data: Box<RawValue>,
    pub signature: String,
    pub client_public_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BacalhauSubmitResponse {
    pub job: BacalhauJob,
}

/// Body of `POST /list`
#[derive(Debug, Clone, Serialize)]
pub struct BacalhauListRequest {
    pub client_id: String,
    pub max_jobs: usize,
    pub return_all: bool,
    pub include_tags: Vec<String>,
    pub exclude_tags: Vec<String>,
    pub sort_by: String,
    pub sort_reverse: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BacalhauListResponse {
    /// `null` when no job matched
    #[serde(default)]
    pub jobs: Option<Vec<BacalhauJob>>,
}

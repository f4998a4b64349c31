//! Deterministic [`ComputeClient`] keeping every job in process memory.
//!
//! Job ids are handed out sequentially (`job-0`, `job-1`, ...) and listing always returns jobs
//! in submission order, so tests can drive the network's view of a job shard by shard.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::types::{JobHandle, JobSnapshot, JobSpec, JobState, ListRequest, ShardStateType};
use crate::{ComputeClient, ComputeClientError};

#[derive(Default)]
struct InMemoryState {
    next_id: u64,
    jobs: Vec<JobSnapshot>,
    submit_failure: Option<String>,
    list_failure: Option<String>,
    list_delay: Option<Duration>,
    list_calls: usize,
}

#[derive(Default)]
pub struct InMemoryComputeClient {
    state: Mutex<InMemoryState>,
}

impl InMemoryComputeClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Makes every following `submit` fail with [`ComputeClientError::Unavailable`].
    pub fn fail_submissions(&self, reason: impl Into<String>) {
        self.state().submit_failure = Some(reason.into());
    }

    /// Makes every following `list` fail with [`ComputeClientError::Unavailable`].
    pub fn fail_listing(&self, reason: impl Into<String>) {
        self.state().list_failure = Some(reason.into());
    }

    /// Delays every following `list` by `delay` before answering.
    pub fn delay_listing(&self, delay: Duration) {
        self.state().list_delay = Some(delay);
    }

    pub fn recover(&self) {
        let mut state = self.state();
        state.submit_failure = None;
        state.list_failure = None;
        state.list_delay = None;
    }

    /// Adds a job that was not submitted through this client.
    pub fn insert(&self, snapshot: JobSnapshot) {
        self.state().jobs.push(snapshot);
    }

    /// Replaces the reported state of `job_id`, one shard per entry of `shards`, each on its own
    /// node. Returns false when the job is unknown.
    pub fn set_shard_states(&self, job_id: &str, shards: &[ShardStateType]) -> bool {
        let mut job_state = JobState::default();
        for (index, shard) in shards.iter().enumerate() {
            job_state.set_shard(format!("node-{index}"), 0, *shard);
        }
        self.set_state(job_id, job_state)
    }

    pub fn set_state(&self, job_id: &str, job_state: JobState) -> bool {
        let mut state = self.state();
        match state.jobs.iter_mut().find(|job| job.id == job_id) {
            Some(job) => {
                job.state = job_state;
                true
            }
            None => false,
        }
    }

    pub fn submitted(&self) -> Vec<JobSnapshot> {
        self.state().jobs.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state().list_calls
    }
}

#[async_trait]
impl ComputeClient for InMemoryComputeClient {
    async fn submit(&self, spec: JobSpec) -> Result<JobHandle, ComputeClientError> {
        let mut state = self.state();
        if let Some(reason) = &state.submit_failure {
            return Err(ComputeClientError::Unavailable(reason.clone()));
        }

        let id = format!("job-{}", state.next_id);
        state.next_id += 1;
        state.jobs.push(JobSnapshot { id: id.clone(), spec, state: JobState::default() });
        Ok(JobHandle::new(id))
    }

    async fn list(&self, request: ListRequest) -> Result<Vec<JobSnapshot>, ComputeClientError> {
        let delay = {
            let mut state = self.state();
            state.list_calls += 1;
            if let Some(reason) = &state.list_failure {
                return Err(ComputeClientError::Unavailable(reason.clone()));
            }
            state.list_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state();
        let matching = state.jobs.iter().filter(|job| {
            request.include_tags.is_empty()
                || job.spec.annotations.iter().any(|annotation| request.include_tags.contains(annotation))
        });
        let mut jobs: Vec<JobSnapshot> = matching.cloned().collect();
        if request.sort_reverse {
            jobs.reverse();
        }
        jobs.truncate(request.max_jobs);
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn tagged(tag: &str) -> JobSpec {
        JobSpec { annotations: vec![tag.to_string()], ..JobSpec::default() }
    }

    fn request(tag: &str, max_jobs: usize, sort_reverse: bool) -> ListRequest {
        ListRequest {
            include_tags: vec![tag.to_string()],
            max_jobs,
            sort_by: "created_at".to_string(),
            sort_reverse,
        }
    }

    #[tokio::test]
    async fn submit_assigns_sequential_ids() {
        let client = InMemoryComputeClient::new();
        assert_eq!(client.submit(JobSpec::default()).await.unwrap(), JobHandle::new("job-0"));
        assert_eq!(client.submit(JobSpec::default()).await.unwrap(), JobHandle::new("job-1"));
        assert_eq!(client.submitted().len(), 2);
    }

    #[tokio::test]
    async fn list_filters_by_tag_and_bounds_the_result() {
        let client = InMemoryComputeClient::new();
        for _ in 0..3 {
            client.submit(tagged("ours")).await.unwrap();
        }
        client.submit(tagged("theirs")).await.unwrap();

        let newest_first = client.list(request("ours", 2, true)).await.unwrap();
        let ids: Vec<_> = newest_first.iter().map(|job| job.id.as_str()).collect();
        assert_eq!(ids, vec!["job-2", "job-1"]);

        let oldest_first = client.list(request("ours", 10, false)).await.unwrap();
        assert_eq!(oldest_first.len(), 3);
        assert_eq!(oldest_first[0].id, "job-0");
        assert_eq!(client.list_calls(), 2);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_unavailable() {
        let client = InMemoryComputeClient::new();
        client.fail_submissions("down");
        client.fail_listing("down");

        assert_matches!(client.submit(JobSpec::default()).await, Err(ComputeClientError::Unavailable(_)));
        assert_matches!(client.list(request("ours", 1, true)).await, Err(ComputeClientError::Unavailable(_)));

        client.recover();
        assert!(client.submit(JobSpec::default()).await.is_ok());
    }

    #[tokio::test]
    async fn set_shard_states_updates_known_jobs_only() {
        let client = InMemoryComputeClient::new();
        let handle = client.submit(tagged("ours")).await.unwrap();

        assert!(client.set_shard_states(&handle.id, &[ShardStateType::Completed, ShardStateType::Error]));
        assert!(!client.set_shard_states("missing", &[ShardStateType::Completed]));

        let job = &client.submitted()[0];
        assert_eq!(job.state.count(ShardStateType::Completed), 1);
        assert_eq!(job.state.count(ShardStateType::Error), 1);
    }
}

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum EngineType {
    #[default]
    Docker,
    Wasm,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum VerifierType {
    #[default]
    Noop,
    Deterministic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum PublisherType {
    Noop,
    Ipfs,
    #[default]
    Estuary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DockerSpec {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub entrypoint: Vec<String>,
    #[serde(default, rename = "EnvironmentVariables")]
    pub env: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Deal {
    #[serde(default)]
    pub concurrency: u32,
}

impl Default for Deal {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    #[serde(default, rename = "ShardsTotal")]
    pub total_shards: u32,
}

impl Default for ExecutionPlan {
    fn default() -> Self {
        Self { total_shards: 1 }
    }
}

/// What the compute network should run for an order.
///
/// [`JobSpec::default`] carries the production defaults (docker engine, noop verifier, estuary
/// publisher, a single execution of a single shard); order specs are expected to override the
/// workload fields only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobSpec {
    #[serde(default)]
    pub engine: EngineType,
    #[serde(default)]
    pub verifier: VerifierType,
    #[serde(default)]
    pub publisher: PublisherType,
    #[serde(default)]
    pub docker: DockerSpec,
    /// Free-form labels, filterable through [`ListRequest::include_tags`]
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub deal: Deal,
    #[serde(default)]
    pub execution_plan: ExecutionPlan,
    /// Seconds, 0 means the network default
    #[serde(default)]
    pub timeout: f64,
}

impl JobSpec {
    /// Number of execution units the network creates for this spec.
    ///
    /// Unset (zero) concurrency or shard counts are treated as 1, matching the network.
    pub fn total_execution_count(&self) -> usize {
        let concurrency = self.deal.concurrency.max(1) as usize;
        let shards = self.execution_plan.total_shards.max(1) as usize;
        concurrency * shards
    }
}

/// Id of a job as assigned by the compute network
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: String,
}

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum ShardStateType {
    #[default]
    New,
    InProgress,
    Cancelled,
    Error,
    Completed,
    /// Anything the network reports that this client does not know about
    #[serde(other)]
    Unknown,
}

impl ShardStateType {
    /// No further transition happens once a shard reaches one of these.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ShardStateType::Completed | ShardStateType::Error | ShardStateType::Cancelled)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShardState {
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub shard_index: u32,
    #[serde(default)]
    pub state: ShardStateType,
    /// Human readable detail, usually the error message for errored shards
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeState {
    #[serde(default)]
    pub shards: BTreeMap<u32, ShardState>,
}

/// Per-node, per-shard execution state of a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobState {
    #[serde(default)]
    pub nodes: BTreeMap<String, NodeState>,
}

impl JobState {
    pub fn shard_states(&self) -> impl Iterator<Item = &ShardState> {
        self.nodes.values().flat_map(|node| node.shards.values())
    }

    pub fn count(&self, state: ShardStateType) -> usize {
        self.shard_states().filter(|shard| shard.state == state).count()
    }

    pub fn terminal_count(&self) -> usize {
        self.shard_states().filter(|shard| shard.state.is_terminal()).count()
    }

    /// Records `state` for a shard, replacing whatever the node reported for it before.
    pub fn set_shard(&mut self, node_id: impl Into<String>, shard_index: u32, state: ShardStateType) {
        let node_id = node_id.into();
        self.nodes.entry(node_id.clone()).or_default().shards.insert(
            shard_index,
            ShardState { node_id, shard_index, state, status: String::new() },
        );
    }
}

/// A view of a job as last reported by the compute network. Never updated in place, every
/// listing produces new snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobSnapshot {
    pub id: String,
    pub spec: JobSpec,
    pub state: JobState,
}

impl JobSnapshot {
    pub fn total_execution_count(&self) -> usize {
        self.spec.total_execution_count()
    }
}

/// Filter and bounds for [`crate::ComputeClient::list`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    /// Jobs carrying any of these annotations are returned
    pub include_tags: Vec<String>,
    pub max_jobs: usize,
    pub sort_by: String,
    pub sort_reverse: bool,
}

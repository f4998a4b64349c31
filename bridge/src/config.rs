use std::fmt;
use std::path::Path;
use std::sync::Arc;

use lilypad_bacalhau_service::{BacalhauService, BacalhauValidatedArgs};
use lilypad_compute_client_interface::{ComputeClient, JobSpec};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::{BacalhauCliArgs, ServiceCliArgs, ServiceParams};
use crate::error::{BridgeError, BridgeResult};
use crate::runner::{BacalhauJobRunner, JobRunner};

/// Validated configuration and the clients built from it.
pub struct Config {
    compute_client: Arc<dyn ComputeClient>,
    service: ServiceParams,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config").field("service", &self.service).finish_non_exhaustive()
    }
}

impl Config {
    pub fn new(compute_client: Arc<dyn ComputeClient>, service: ServiceParams) -> Self {
        Self { compute_client, service }
    }

    pub fn compute_client(&self) -> Arc<dyn ComputeClient> {
        Arc::clone(&self.compute_client)
    }

    pub fn service(&self) -> &ServiceParams {
        &self.service
    }

    /// Runner over the configured compute client, its listings abort once `shutdown` is cancelled.
    pub fn job_runner(&self, shutdown: CancellationToken) -> Arc<dyn JobRunner> {
        Arc::new(BacalhauJobRunner::new(self.compute_client()).with_shutdown(shutdown))
    }
}

/// Validates the arguments and builds the compute client, loading or creating its signing key.
///
/// Called once by the entry point before any runner or worker is constructed.
pub fn init(bacalhau_args: &BacalhauCliArgs, service_args: &ServiceCliArgs) -> BridgeResult<Config> {
    let bacalhau_params = BacalhauValidatedArgs::try_from(bacalhau_args.clone())?;
    let service = ServiceParams::try_from(service_args.clone())?;

    info!(
        api_url = %bacalhau_params.bacalhau_api_url,
        key_path = %bacalhau_params.bacalhau_key_path.display(),
        poll_interval = ?service.poll_interval,
        "Bridge configuration initialized"
    );

    let bacalhau_service = BacalhauService::new_with_args(&bacalhau_params)
        .map_err(|e| BridgeError::ConfigError(format!("Bacalhau client: {}", e)))?;
    let compute_client: Arc<dyn ComputeClient> = Arc::new(bacalhau_service);
    Ok(Config::new(compute_client, service))
}

/// Reads a job spec from `path`, as JSON when the extension is `json` and as YAML otherwise.
pub fn load_job_spec(path: &Path) -> BridgeResult<JobSpec> {
    let raw = std::fs::read_to_string(path)?;
    let invalid = |message: String| BridgeError::InvalidJobSpec { path: path.display().to_string(), message };

    let is_json = path.extension().is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))
    } else {
        serde_yaml::from_str(&raw).map_err(|e| invalid(e.to_string()))
    }
}

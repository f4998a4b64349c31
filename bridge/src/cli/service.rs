use std::time::Duration;

use clap::Args;

use crate::error::BridgeError;

#[derive(Debug, Clone, Args)]
pub struct ServiceCliArgs {
    /// Seconds between two reconcile passes over the running jobs.
    #[arg(env = "LILYPAD_POLL_INTERVAL_SECS", long, default_value_t = 10)]
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceParams {
    pub poll_interval: Duration,
}

impl TryFrom<ServiceCliArgs> for ServiceParams {
    type Error = BridgeError;

    fn try_from(args: ServiceCliArgs) -> Result<Self, Self::Error> {
        if args.poll_interval_secs == 0 {
            return Err(BridgeError::ConfigError("poll interval must be at least one second".to_string()));
        }
        Ok(Self { poll_interval: Duration::from_secs(args.poll_interval_secs) })
    }
}

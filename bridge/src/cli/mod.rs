use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::types::OrderId;

pub mod bacalhau;
pub mod service;

pub use bacalhau::BacalhauCliArgs;
pub use service::{ServiceCliArgs, ServiceParams};

#[derive(Parser, Debug)]
#[command(
    name = "lilypad-bridge",
    about = "Lilypad bridge - runs contract orders as Bacalhau jobs",
    long_about = "Submits the job for a Lilypad contract order to Bacalhau and reconciles the job until it \
    completes or fails.",
    after_help = "Examples:\n  \
    lilypad-bridge submit --order-id 42 --spec job.yaml --wait\n  \
    lilypad-bridge watch --job 42:92d5d4ee-3765-4f78-8353-623f5f26df08"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit the job for an order
    Submit {
        #[command(flatten)]
        submit_command: Box<SubmitCmd>,
    },
    /// Reconcile already submitted jobs until they complete or fail
    Watch {
        #[command(flatten)]
        watch_command: Box<WatchCmd>,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct SubmitCmd {
    /// Contract order the job runs for, decimal or 0x-prefixed hex
    #[arg(long, value_name = "ID")]
    pub order_id: OrderId,

    /// Job spec file, JSON when the extension is `.json`, YAML otherwise
    #[arg(long, value_name = "PATH")]
    pub spec: PathBuf,

    /// Keep reconciling the job until it completes or fails
    #[arg(long)]
    pub wait: bool,

    #[clap(flatten)]
    pub bacalhau_args: BacalhauCliArgs,

    #[clap(flatten)]
    pub service_args: ServiceCliArgs,
}

#[derive(Parser, Debug, Clone)]
pub struct WatchCmd {
    /// Job to reconcile as `<order id>:<job id>`, repeat for several jobs
    #[arg(long = "job", value_name = "ORDER:JOB", required = true, value_parser = parse_tracked_job)]
    pub jobs: Vec<TrackedJob>,

    #[clap(flatten)]
    pub bacalhau_args: BacalhauCliArgs,

    #[clap(flatten)]
    pub service_args: ServiceCliArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedJob {
    pub order_id: OrderId,
    pub job_id: String,
}

fn parse_tracked_job(value: &str) -> Result<TrackedJob, String> {
    let (order_id, job_id) =
        value.split_once(':').ok_or_else(|| format!("expected <order id>:<job id>, got {value:?}"))?;
    let job_id = job_id.trim();
    if job_id.is_empty() {
        return Err(format!("missing job id in {value:?}"));
    }
    Ok(TrackedJob { order_id: order_id.parse()?, job_id: job_id.to_string() })
}

use std::sync::Arc;

use clap::Parser as _;
use dotenvy::dotenv;
use lilypad_bridge::cli::{Cli, Commands, SubmitCmd, WatchCmd};
use lilypad_bridge::config::{self, load_job_spec, Config};
use lilypad_bridge::runner::JobRunner;
use lilypad_bridge::types::{BacalhauJobRunningEvent, ContractSubmittedEvent, JobOutcomeEvent};
use lilypad_bridge::utils::logging::init_logging;
use lilypad_bridge::worker::ReconcileWorker;
use lilypad_bridge::{BridgeError, BridgeResult};
use lilypad_compute_client_interface::JobHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Submit { submit_command } => submit(submit_command).await,
        Commands::Watch { watch_command } => watch(watch_command).await,
    };

    if let Err(e) = result {
        error!(error = %e, error_chain = ?e, "Lilypad bridge failed");
        panic!("Lilypad bridge failed: {}", e);
    }
}

async fn submit(cmd: &SubmitCmd) -> BridgeResult<()> {
    let config = config::init(&cmd.bacalhau_args, &cmd.service_args)?;
    let spec = load_job_spec(&cmd.spec)?;

    let shutdown = CancellationToken::new();
    let runner = config.job_runner(shutdown.clone());
    let running = runner.create(ContractSubmittedEvent::new(cmd.order_id, spec)).await?;
    info!(order_id = %running.order_id(), job_id = %running.job_id(), "Order submitted");

    if cmd.wait {
        wait_for_outcomes(&config, runner, shutdown, vec![running]).await?;
    }
    Ok(())
}

async fn watch(cmd: &WatchCmd) -> BridgeResult<()> {
    let config = config::init(&cmd.bacalhau_args, &cmd.service_args)?;

    // Jobs created by an earlier run, reconciling them does not need their job spec
    let jobs = cmd
        .jobs
        .iter()
        .map(|job| {
            ContractSubmittedEvent::new(job.order_id, Default::default()).job_created(JobHandle::new(&job.job_id))
        })
        .collect();

    let shutdown = CancellationToken::new();
    let runner = config.job_runner(shutdown.clone());
    wait_for_outcomes(&config, runner, shutdown, jobs).await
}

/// Reconciles `jobs` until every one of them completed or failed, or ctrl-c is received.
async fn wait_for_outcomes(
    config: &Config,
    runner: Arc<dyn JobRunner>,
    shutdown: CancellationToken,
    jobs: Vec<BacalhauJobRunningEvent>,
) -> BridgeResult<()> {
    let (mut worker, _intake, mut outcomes) =
        ReconcileWorker::new(runner, config.service().poll_interval, shutdown.clone());
    for job in jobs {
        worker.track(job);
    }
    let mut pending = worker.tracked().len();
    let worker_handle = tokio::spawn(worker.run());

    while pending > 0 {
        tokio::select! {
            outcome = outcomes.recv() => match outcome {
                Some(JobOutcomeEvent::Completed(event)) => {
                    info!(order_id = %event.order_id(), job_id = %event.job_id(), "Job completed");
                    pending -= 1;
                }
                Some(JobOutcomeEvent::Failed(event)) => {
                    warn!(order_id = %event.order_id(), job_id = %event.job_id(), "Job failed");
                    pending -= 1;
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!(pending, "Interrupted, jobs left unresolved");
                break;
            }
        }
    }

    shutdown.cancel();
    worker_handle.await.map_err(|e| BridgeError::WorkerError(e.to_string()))?
}

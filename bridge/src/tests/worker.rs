use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use tokio_util::sync::CancellationToken;

use super::running_job;
use crate::error::BridgeError;
use crate::runner::stub::{failed_find, successful_create, successful_find};
use crate::runner::{MockJobRunner, StubJobRunner};
use crate::types::{JobOutcomeEvent, OrderId};
use crate::worker::ReconcileWorker;

const POLL_INTERVAL: Duration = Duration::from_secs(10);

#[tokio::test]
async fn completed_jobs_are_published_and_untracked() {
    let runner = StubJobRunner::new(successful_create(), successful_find());
    let (mut worker, _intake, mut outcomes) =
        ReconcileWorker::new(Arc::new(runner), POLL_INTERVAL, CancellationToken::new());
    worker.track(running_job(1, "job-1"));
    worker.track(running_job(2, "job-2"));

    assert_eq!(worker.reconcile_once().await.unwrap(), 2);

    assert!(worker.tracked().is_empty());
    assert_matches!(outcomes.recv().await, Some(JobOutcomeEvent::Completed(event)) if event.job_id() == "job-1");
    assert_matches!(outcomes.recv().await, Some(JobOutcomeEvent::Completed(event)) if event.job_id() == "job-2");
}

#[tokio::test]
async fn failed_jobs_are_published_once() {
    let runner = StubJobRunner { find_completed_handler: Some(failed_find()), ..StubJobRunner::default() };
    let (mut worker, _intake, mut outcomes) =
        ReconcileWorker::new(Arc::new(runner), POLL_INTERVAL, CancellationToken::new());
    worker.track(running_job(3, "job-3"));

    assert_eq!(worker.reconcile_once().await.unwrap(), 1);
    assert_eq!(worker.reconcile_once().await.unwrap(), 0);

    let outcome = outcomes.recv().await.unwrap();
    assert_matches!(&outcome, JobOutcomeEvent::Failed(_));
    assert_eq!(outcome.job_id(), "job-3");
    assert!(outcomes.try_recv().is_err());
}

#[tokio::test]
async fn jobs_still_running_stay_tracked() {
    let first = running_job(1, "job-1");
    let second = running_job(2, "job-2");
    let retired = second.completed();

    let mut runner = MockJobRunner::new();
    runner
        .expect_find_completed()
        .withf(|jobs| jobs.len() == 2)
        .times(1)
        .returning(move |_| (vec![retired.clone()], Vec::new()));
    let (mut worker, _intake, mut outcomes) =
        ReconcileWorker::new(Arc::new(runner), POLL_INTERVAL, CancellationToken::new());
    worker.track(first.clone());
    worker.track(second);

    assert_eq!(worker.reconcile_once().await.unwrap(), 1);

    assert_eq!(worker.tracked(), &[first]);
    assert_eq!(outcomes.recv().await.unwrap().job_id(), "job-2");
}

#[tokio::test]
async fn idle_worker_does_not_call_the_runner() {
    let mut runner = MockJobRunner::new();
    runner.expect_find_completed().never();
    let (mut worker, _intake, _outcomes) =
        ReconcileWorker::new(Arc::new(runner), POLL_INTERVAL, CancellationToken::new());

    assert_eq!(worker.reconcile_once().await.unwrap(), 0);
}

#[test]
fn tracking_the_same_job_twice_is_ignored() {
    let (mut worker, _intake, _outcomes) =
        ReconcileWorker::new(Arc::new(StubJobRunner::default()), POLL_INTERVAL, CancellationToken::new());

    worker.track(running_job(1, "job-1"));
    worker.track(running_job(1, "job-1"));

    assert_eq!(worker.tracked().len(), 1);
}

#[tokio::test]
async fn dropped_outcome_receiver_is_an_error() {
    let (mut worker, _intake, outcomes) =
        ReconcileWorker::new(Arc::new(StubJobRunner::default()), POLL_INTERVAL, CancellationToken::new());
    drop(outcomes);
    worker.track(running_job(1, "job-1"));

    assert_matches!(worker.reconcile_once().await, Err(BridgeError::WorkerError(_)));
}

#[tokio::test(start_paused = true)]
async fn run_reconciles_jobs_from_the_intake_until_shutdown() {
    let shutdown = CancellationToken::new();
    let (worker, intake, mut outcomes) =
        ReconcileWorker::new(Arc::new(StubJobRunner::default()), POLL_INTERVAL, shutdown.clone());
    let handle = tokio::spawn(worker.run());

    intake.send(running_job(7, "job-7")).await.unwrap();
    let outcome = outcomes.recv().await.unwrap();
    assert_matches!(&outcome, JobOutcomeEvent::Completed(_));
    assert_eq!(outcome.order_id(), OrderId::from(7));

    shutdown.cancel();
    assert!(handle.await.unwrap().is_ok());
}

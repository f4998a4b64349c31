use lilypad_compute_client_interface::{JobSnapshot, JobState, ShardStateType};

/// Where a job stands according to one snapshot. Recomputed on every poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum JobOutcome {
    Running,
    Completed,
    Failed,
    /// Every shard is terminal but the tally is neither a clean completion nor has errors
    Unknown,
}

/// Some reported shard is not terminal yet, or fewer shards reached a terminal state than the
/// job has executions.
pub fn is_still_running(state: &JobState, total_executions: usize) -> bool {
    state.shard_states().any(|shard| !shard.state.is_terminal()) || state.terminal_count() < total_executions
}

/// Exactly one completed shard per execution.
pub fn is_complete(state: &JobState, total_executions: usize) -> bool {
    state.count(ShardStateType::Completed) == total_executions
}

pub fn has_errors(state: &JobState) -> bool {
    state.shard_states().any(|shard| shard.state == ShardStateType::Error)
}

/// Classifies a job, checking in order: still running, complete, errored.
pub fn classify(snapshot: &JobSnapshot) -> JobOutcome {
    let total_executions = snapshot.total_execution_count();
    let state = &snapshot.state;

    if is_still_running(state, total_executions) {
        JobOutcome::Running
    } else if is_complete(state, total_executions) {
        JobOutcome::Completed
    } else if has_errors(state) {
        JobOutcome::Failed
    } else {
        JobOutcome::Unknown
    }
}

#[cfg(test)]
mod tests {
    use lilypad_compute_client_interface::JobSpec;
    use rstest::rstest;

    use super::*;
    use ShardStateType::{Cancelled, Completed, Error, InProgress, New};

    fn snapshot(concurrency: u32, shards_total: u32, states: &[ShardStateType]) -> JobSnapshot {
        let mut spec = JobSpec::default();
        spec.deal.concurrency = concurrency;
        spec.execution_plan.total_shards = shards_total;

        let mut state = JobState::default();
        for (index, shard) in states.iter().enumerate() {
            state.set_shard(format!("node-{index}"), 0, *shard);
        }
        JobSnapshot { id: "job".to_string(), spec, state }
    }

    #[rstest]
    // every execution completed
    #[case(3, 1, vec![Completed, Completed, Completed], JobOutcome::Completed)]
    #[case(1, 1, vec![Completed], JobOutcome::Completed)]
    // one execution errored, the other completed
    #[case(2, 1, vec![Completed, Error], JobOutcome::Failed)]
    #[case(2, 1, vec![Error, Error], JobOutcome::Failed)]
    // nothing reported yet
    #[case(1, 1, vec![], JobOutcome::Running)]
    #[case(3, 1, vec![Completed, Completed, InProgress], JobOutcome::Running)]
    // an errored shard does not end the job while others are still executing
    #[case(3, 1, vec![Error, InProgress, New], JobOutcome::Running)]
    // more shards reported than executions, one of them still executing
    #[case(1, 1, vec![Completed, InProgress], JobOutcome::Running)]
    #[case(1, 1, vec![Error, New], JobOutcome::Running)]
    // terminal, no errors, but not a clean completion
    #[case(2, 1, vec![Completed, Cancelled], JobOutcome::Unknown)]
    #[case(1, 1, vec![Completed, Completed], JobOutcome::Unknown)]
    fn classify_works(
        #[case] concurrency: u32,
        #[case] shards_total: u32,
        #[case] states: Vec<ShardStateType>,
        #[case] expected: JobOutcome,
    ) {
        assert_eq!(classify(&snapshot(concurrency, shards_total, &states)), expected);
    }

    #[test]
    fn shards_and_concurrency_multiply_into_executions() {
        let job = snapshot(2, 2, &[Completed, Completed, Completed]);
        assert_eq!(classify(&job), JobOutcome::Running);

        let job = snapshot(2, 2, &[Completed, Completed, Completed, Completed]);
        assert_eq!(classify(&job), JobOutcome::Completed);
    }

    #[test]
    fn unset_execution_counts_default_to_one() {
        assert_eq!(classify(&snapshot(0, 0, &[Completed])), JobOutcome::Completed);
    }
}

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use lilypad_compute_client_interface::{JobHandle, JobSpec};

/// Id of an order in the Lilypad contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct OrderId(pub U256);

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl FromStr for OrderId {
    type Err = String;

    /// Accepts decimal as well as `0x` prefixed hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_str(s.trim()).map(Self).map_err(|e| format!("invalid order id {s:?}: {e}"))
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An order was submitted to the contract and needs a job on the compute network.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractSubmittedEvent {
    order_id: OrderId,
    spec: JobSpec,
}

impl ContractSubmittedEvent {
    pub fn new(order_id: OrderId, spec: JobSpec) -> Self {
        Self { order_id, spec }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Job spec derived from the order terms
    pub fn spec(&self) -> JobSpec {
        self.spec.clone()
    }

    pub fn job_created(self, job: JobHandle) -> BacalhauJobRunningEvent {
        BacalhauJobRunningEvent { submitted: self, job }
    }
}

/// The job for an order was accepted by the compute network and has not finished yet.
#[derive(Debug, Clone, PartialEq)]
pub struct BacalhauJobRunningEvent {
    submitted: ContractSubmittedEvent,
    job: JobHandle,
}

impl BacalhauJobRunningEvent {
    pub fn order_id(&self) -> OrderId {
        self.submitted.order_id()
    }

    pub fn job_id(&self) -> &str {
        &self.job.id
    }

    pub fn job(&self) -> &JobHandle {
        &self.job
    }

    pub fn submitted(&self) -> &ContractSubmittedEvent {
        &self.submitted
    }

    pub fn completed(&self) -> BacalhauJobCompletedEvent {
        BacalhauJobCompletedEvent { order_id: self.order_id(), job: self.job.clone() }
    }

    pub fn failed(&self) -> BacalhauJobFailedEvent {
        BacalhauJobFailedEvent { order_id: self.order_id(), job: self.job.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacalhauJobCompletedEvent {
    order_id: OrderId,
    job: JobHandle,
}

impl BacalhauJobCompletedEvent {
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn job_id(&self) -> &str {
        &self.job.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacalhauJobFailedEvent {
    order_id: OrderId,
    job: JobHandle,
}

impl BacalhauJobFailedEvent {
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn job_id(&self) -> &str {
        &self.job.id
    }
}

/// Terminal outcome of a tracked job, as published by the reconcile worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcomeEvent {
    Completed(BacalhauJobCompletedEvent),
    Failed(BacalhauJobFailedEvent),
}

impl JobOutcomeEvent {
    pub fn order_id(&self) -> OrderId {
        match self {
            JobOutcomeEvent::Completed(event) => event.order_id(),
            JobOutcomeEvent::Failed(event) => event.order_id(),
        }
    }

    pub fn job_id(&self) -> &str {
        match self {
            JobOutcomeEvent::Completed(event) => event.job_id(),
            JobOutcomeEvent::Failed(event) => event.job_id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_id_parses_decimal_and_hex() {
        assert_eq!("42".parse::<OrderId>().unwrap(), OrderId::from(42));
        assert_eq!("0x2a".parse::<OrderId>().unwrap(), OrderId::from(42));
        assert!("forty-two".parse::<OrderId>().is_err());
        assert_eq!(OrderId::from(42).to_string(), "42");
    }

    #[test]
    fn running_event_keeps_order_and_job_through_transitions() {
        let running =
            ContractSubmittedEvent::new(OrderId::from(7), JobSpec::default()).job_created(JobHandle::new("job-7"));

        assert_eq!(running.order_id(), OrderId::from(7));
        assert_eq!(running.job_id(), "job-7");

        let completed = running.completed();
        assert_eq!((completed.order_id(), completed.job_id()), (OrderId::from(7), "job-7"));
        let failed = running.failed();
        assert_eq!((failed.order_id(), failed.job_id()), (OrderId::from(7), "job-7"));
    }
}

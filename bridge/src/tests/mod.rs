pub mod config;
pub mod worker;

use lilypad_compute_client_interface::{JobHandle, JobSpec};

use crate::types::{BacalhauJobRunningEvent, ContractSubmittedEvent, OrderId};

pub fn running_job(order_id: u64, job_id: &str) -> BacalhauJobRunningEvent {
    ContractSubmittedEvent::new(OrderId::from(order_id), JobSpec::default()).job_created(JobHandle::new(job_id))
}

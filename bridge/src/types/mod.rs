pub mod events;

pub use events::{
    BacalhauJobCompletedEvent, BacalhauJobFailedEvent, BacalhauJobRunningEvent, ContractSubmittedEvent,
    JobOutcomeEvent, OrderId,
};

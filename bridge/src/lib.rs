pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod types;
pub mod utils;
pub mod worker;

#[cfg(test)]
pub mod tests;

pub use error::{BridgeError, BridgeResult};

/// Public requester node of the production Bacalhau network
pub const DEFAULT_API_HOST: &str = "bootstrap.production.bacalhau.org";
pub const DEFAULT_API_PORT: u16 = 1234;

pub(crate) const SUBMIT_PATH: &str = "submit";
pub(crate) const LIST_PATH: &str = "list";

pub(crate) const JOB_API_VERSION: &str = "V1beta1";

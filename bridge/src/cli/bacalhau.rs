use std::path::PathBuf;

use clap::Args;
use lilypad_bacalhau_service::constants::{DEFAULT_API_HOST, DEFAULT_API_PORT};
use lilypad_bacalhau_service::BacalhauValidatedArgs;
use url::Url;

use crate::error::BridgeError;

/// Parameters used to reach the Bacalhau requester node.
#[derive(Debug, Clone, Args)]
pub struct BacalhauCliArgs {
    /// Host of the Bacalhau requester node.
    #[arg(env = "LILYPAD_BACALHAU_API_HOST", long, default_value = DEFAULT_API_HOST)]
    pub bacalhau_api_host: String,

    /// Port of the Bacalhau requester node API.
    #[arg(env = "LILYPAD_BACALHAU_API_PORT", long, default_value_t = DEFAULT_API_PORT)]
    pub bacalhau_api_port: u16,

    /// Full API URL, takes precedence over host and port.
    #[arg(env = "LILYPAD_BACALHAU_API_URL", long)]
    pub bacalhau_api_url: Option<Url>,

    /// RSA key submissions are signed with, `$HOME/.bacalhau/user_id.pem` when unset.
    /// A missing file is created with a new key.
    #[arg(env = "LILYPAD_BACALHAU_KEY_PATH", long)]
    pub bacalhau_key_path: Option<PathBuf>,
}

/// Where the Bacalhau CLI keeps its client key
fn default_key_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".bacalhau").join("user_id.pem"))
}

impl TryFrom<BacalhauCliArgs> for BacalhauValidatedArgs {
    type Error = BridgeError;

    fn try_from(args: BacalhauCliArgs) -> Result<Self, Self::Error> {
        let bacalhau_api_url = match args.bacalhau_api_url {
            Some(url) => url,
            None => Url::parse(&format!("http://{}:{}", args.bacalhau_api_host, args.bacalhau_api_port))
                .map_err(|e| BridgeError::ConfigError(format!("invalid Bacalhau API host: {}", e)))?,
        };

        if !matches!(bacalhau_api_url.scheme(), "http" | "https") {
            return Err(BridgeError::ConfigError(format!(
                "Bacalhau API URL must be http(s), got {}",
                bacalhau_api_url
            )));
        }

        let bacalhau_key_path = args.bacalhau_key_path.or_else(default_key_path).ok_or_else(|| {
            BridgeError::ConfigError("no Bacalhau key path given and HOME is not set".to_string())
        })?;

        Ok(Self { bacalhau_api_url, bacalhau_key_path })
    }
}

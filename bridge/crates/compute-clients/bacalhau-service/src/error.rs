use lilypad_compute_client_interface::ComputeClientError;
use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum BacalhauError {
    /// Network/transport errors that may be retryable (timeouts, refused connections, etc.)
    #[error("Network error during {operation}: {message}")]
    NetworkError { operation: String, message: String },

    /// Requester node answered with a 4xx/5xx status code
    #[error("Bacalhau API error during {operation} (status {status}): {message}")]
    ApiError { operation: String, status: StatusCode, message: String },

    /// JSON parsing errors
    #[error("Failed to parse response during {operation}: {message}")]
    ParseError { operation: String, message: String },

    /// URL/path segment errors
    #[error("Failed to build URL for {operation}: {message}")]
    UrlError { operation: String, message: String },

    /// The client key could not be loaded, created or used
    #[error("Bacalhau client key error: {message}")]
    KeyError { message: String },
}

impl BacalhauError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            BacalhauError::NetworkError { .. } => true,
            BacalhauError::ApiError { status, .. } => status.is_server_error(),
            _ => false,
        }
    }

    /// Create a network or API error from a reqwest error
    pub fn from_reqwest_error(operation: impl Into<String>, source: reqwest::Error) -> Self {
        let operation = operation.into();

        if let Some(status) = source.status() {
            return BacalhauError::ApiError { operation, status, message: source.to_string() };
        }
        if source.is_decode() {
            return BacalhauError::ParseError { operation, message: source.to_string() };
        }

        let message = if source.is_timeout() {
            "request timed out".to_string()
        } else if source.is_connect() {
            format!("connection failed: {}", source)
        } else {
            format!("request failed: {}", source)
        };
        BacalhauError::NetworkError { operation, message }
    }

    pub fn parse_error(operation: impl Into<String>, message: impl Into<String>) -> Self {
        BacalhauError::ParseError { operation: operation.into(), message: message.into() }
    }

    pub fn api_error(operation: impl Into<String>, status: StatusCode, message: impl Into<String>) -> Self {
        BacalhauError::ApiError { operation: operation.into(), status, message: message.into() }
    }

    pub fn key_error(message: impl Into<String>) -> Self {
        BacalhauError::KeyError { message: message.into() }
    }
}

/// Retryable errors surface as [`ComputeClientError::Unavailable`], requests the node refused as
/// [`ComputeClientError::Rejected`].
impl From<BacalhauError> for ComputeClientError {
    fn from(value: BacalhauError) -> Self {
        if value.is_retryable() {
            return Self::Unavailable(value.to_string());
        }
        match value {
            BacalhauError::ApiError { .. } => Self::Rejected(value.to_string()),
            other => Self::Internal(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_server_errors_map_to_unavailable() {
        let network = BacalhauError::NetworkError { operation: "list".into(), message: "refused".into() };
        let server = BacalhauError::api_error("list", StatusCode::BAD_GATEWAY, "upstream");

        assert!(matches!(ComputeClientError::from(network), ComputeClientError::Unavailable(_)));
        assert!(matches!(ComputeClientError::from(server), ComputeClientError::Unavailable(_)));
    }

    #[test]
    fn client_errors_map_to_rejections() {
        let err: ComputeClientError = BacalhauError::api_error("submit", StatusCode::BAD_REQUEST, "bad spec").into();
        assert!(matches!(err, ComputeClientError::Rejected(_)));

        let err: ComputeClientError = BacalhauError::parse_error("list", "eof").into();
        assert!(matches!(err, ComputeClientError::Internal(_)));

        let err: ComputeClientError = BacalhauError::key_error("bad pem").into();
        assert!(matches!(err, ComputeClientError::Internal(_)));
    }
}

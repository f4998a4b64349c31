use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::constants::{LIST_PATH, SUBMIT_PATH};
use crate::error::BacalhauError;
use crate::types::{BacalhauListRequest, BacalhauListResponse, BacalhauSubmitRequest, BacalhauSubmitResponse};

/// Bacalhau requester node API async wrapper
pub struct BacalhauClient {
    client: reqwest::Client,
    base_url: Url,
}

impl BacalhauClient {
    pub fn new(mut base_url: Url) -> Self {
        // `Url::join` drops the last path segment unless the base ends with a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client: reqwest::Client::new(), base_url }
    }

    pub async fn submit_job(&self, request: &BacalhauSubmitRequest) -> Result<BacalhauSubmitResponse, BacalhauError> {
        self.post("submit_job", SUBMIT_PATH, request).await
    }

    pub async fn list_jobs(&self, request: &BacalhauListRequest) -> Result<BacalhauListResponse, BacalhauError> {
        self.post("list_jobs", LIST_PATH, request).await
    }

    async fn post<B, T>(&self, operation: &str, path: &str, body: &B) -> Result<T, BacalhauError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| BacalhauError::UrlError { operation: operation.to_string(), message: e.to_string() })?;
        debug!(%url, operation, "Calling Bacalhau API");

        let response = self
            .client
            .post(url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(body)
            .send()
            .await
            .map_err(|e| BacalhauError::from_reqwest_error(operation, e))?;

        Self::parse_response(operation, response).await
    }

    async fn parse_response<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T, BacalhauError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| BacalhauError::from_reqwest_error(operation, e))?;

        if !status.is_success() {
            return Err(BacalhauError::api_error(operation, status, body));
        }
        serde_json::from_str(&body).map_err(|e| BacalhauError::parse_error(operation, e.to_string()))
    }
}

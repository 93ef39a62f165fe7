//! HTTP access to the REST API.

use super::retry::RetryPolicy;
use crate::error::FetchError;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Default public API.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Client for a JSONPlaceholder-compatible API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout_seconds: u64,
    policy: RetryPolicy,
}

impl ApiClient {
    /// Create a client. Trailing slashes on `base_url` are ignored.
    pub fn new(
        base_url: &str,
        timeout_seconds: u64,
        policy: RetryPolicy,
    ) -> Result<Self, FetchError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(concat!("feedlens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| FetchError::Network {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            http_client,
            base_url,
            timeout_seconds,
            policy,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of a path below the base.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the body, retrying on any failure.
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.url(path);
        let value = self.policy.run(&url, || self.get_once(&url)).await?;
        info!("Fetched {}", url);
        Ok(value)
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!("GET {}", url);

        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    seconds: self.timeout_seconds,
                }
            } else {
                FetchError::Network {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Network {
            url: url.to_string(),
            source: e,
        })?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            origin: url.to_string(),
            message: e.to_string(),
        })
    }
}

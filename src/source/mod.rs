//! Where the datasets come from.
//!
//! Either the REST API (with retry) or a directory of JSON files.

pub mod http;
pub mod local;
pub mod retry;

pub use http::{ApiClient, DEFAULT_BASE_URL};
pub use local::LocalSource;
pub use retry::RetryPolicy;

use crate::error::FetchError;
use crate::models::Resource;
use serde_json::Value;

/// A place to read raw resource arrays from.
#[derive(Debug, Clone)]
pub enum DataSource {
    Remote(ApiClient),
    Local(LocalSource),
}

impl DataSource {
    /// Human-readable origin, for logs and report metadata.
    pub fn describe(&self) -> String {
        match self {
            DataSource::Remote(client) => client.base_url().to_string(),
            DataSource::Local(local) => local.dir().display().to_string(),
        }
    }

    /// Where `resource` would be read from.
    pub fn location(&self, resource: Resource) -> String {
        match self {
            DataSource::Remote(client) => client.url(resource.path()),
            DataSource::Local(local) => local.file_path(resource).display().to_string(),
        }
    }

    /// Fetch the raw elements of `resource`. The payload must be an array.
    pub async fn fetch_raw(&self, resource: Resource) -> Result<Vec<Value>, FetchError> {
        let value: Value = match self {
            DataSource::Remote(client) => client.fetch_json(resource.path()).await?,
            DataSource::Local(local) => local.read(resource).await?,
        };

        match value {
            Value::Array(items) => Ok(items),
            _ => Err(FetchError::InvalidPayload {
                origin: self.location(resource),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_non_array_payload_rejected() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("users.json"), r#"{"id":1}"#).unwrap();

        let source = DataSource::Local(LocalSource::new(dir.path()));
        let err = source.fetch_raw(Resource::Users).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidPayload { .. }));
    }

    #[test]
    fn test_location() {
        let client = ApiClient::new(DEFAULT_BASE_URL, 5, RetryPolicy::default()).unwrap();
        let source = DataSource::Remote(client);
        assert_eq!(
            source.location(Resource::Posts),
            "https://jsonplaceholder.typicode.com/posts"
        );
        assert_eq!(source.describe(), DEFAULT_BASE_URL);
    }
}

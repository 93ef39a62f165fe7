//! Datasets read from JSON files on disk.

use crate::error::FetchError;
use crate::models::Resource;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// A directory holding `users.json`, `posts.json`, `comments.json` and
/// `albums.json`.
#[derive(Debug, Clone)]
pub struct LocalSource {
    dir: PathBuf,
}

impl LocalSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `resource`.
    pub fn file_path(&self, resource: Resource) -> PathBuf {
        self.dir.join(resource.file_name())
    }

    /// Read and parse the file for `resource`.
    pub async fn read(&self, resource: Resource) -> Result<Value, FetchError> {
        let path = self.file_path(resource);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            })?;

        let value = serde_json::from_str(&content).map_err(|e| FetchError::Decode {
            origin: path.display().to_string(),
            message: e.to_string(),
        })?;
        info!("Read {}", path.display());
        Ok(value)
    }
}

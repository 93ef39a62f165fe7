//! Error types shared by the fetching and validation layers.
//!
//! The binary flow wraps these in `anyhow` with context; library code
//! returns them directly so callers can match on the failure kind.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while fetching or reading a dataset.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent or the connection dropped.
    #[error("network error requesting {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} requesting {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    /// The body was not valid JSON for the expected shape.
    #[error("failed to parse JSON from {origin}: {message}")]
    Decode { origin: String, message: String },

    /// The payload parsed but was not a JSON array.
    #[error("{origin}: invalid payload, expected a JSON array")]
    InvalidPayload { origin: String },

    /// A local dataset file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a raw record was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The element was not a JSON object at all.
    #[error("record is not an object")]
    NotAnObject,

    /// A field had the wrong JSON type.
    #[error("malformed record: {0}")]
    Malformed(String),

    /// One or more required fields were missing or blank.
    #[error("missing or invalid required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),
}

impl ValidationError {
    /// The individual reasons, one per offending field.
    pub fn reasons(&self) -> Vec<String> {
        match self {
            ValidationError::NotAnObject => vec!["not an object".to_string()],
            ValidationError::Malformed(message) => vec![message.clone()],
            ValidationError::MissingFields(fields) => fields.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message() {
        let err = ValidationError::MissingFields(vec!["id".to_string(), "email".to_string()]);
        assert_eq!(
            err.to_string(),
            "missing or invalid required fields: id, email"
        );
        assert_eq!(err.reasons(), vec!["id", "email"]);
    }

    #[test]
    fn test_invalid_payload_message() {
        let err = FetchError::InvalidPayload {
            origin: "/users".to_string(),
        };
        assert!(err.to_string().contains("expected a JSON array"));
    }
}

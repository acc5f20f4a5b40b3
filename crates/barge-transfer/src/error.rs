//! Error types for barge-transfer.
//!
//! The taxonomy mirrors the blast radius of each failure: [`ProvisionError`]
//! is fatal to a pipeline run, [`FetchError`] to one dataset, and
//! [`TransferError`] to a single file only.

use thiserror::Error;

/// Failure opening or reading a streaming byte source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Connect(String),

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("byte stream interrupted: {0}")]
    Read(String),
}

/// Failure reported by the object storage service.
///
/// Carries the service's rendered error message; the calling layer adds the
/// bucket or key context.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

/// Bucket provisioning failure. The pipeline must not run after one of these.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("existence check for bucket {bucket} failed: {source}")]
    Check {
        bucket: String,
        #[source]
        source: StoreError,
    },

    #[error("creation of bucket {bucket} failed: {source}")]
    Create {
        bucket: String,
        #[source]
        source: StoreError,
    },
}

/// Release metadata retrieval failure, fatal to that dataset only.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("catalog request for dataset {dataset} failed: {source}")]
    Http {
        dataset: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("catalog returned status {status} for dataset {dataset}")]
    Status { dataset: String, status: u16 },

    #[error("malformed catalog payload for dataset {dataset}: {source}")]
    Payload {
        dataset: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Per-file transfer failure, recorded as an outcome and never re-thrown
/// past the pipeline.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("source: {0}")]
    Source(#[from] SourceError),

    #[error("upload of {key}: {source}")]
    Upload {
        key: String,
        #[source]
        source: StoreError,
    },
}

//! Data layer: release and task types consumed by the pipeline.

use crate::error::TransferError;

/// A named dataset release: the ordered list of file URLs the catalog
/// returned for it. Consumed once by the pipeline, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRelease {
    pub name: String,
    pub file_urls: Vec<String>,
}

impl DatasetRelease {
    pub fn new(name: impl Into<String>, file_urls: Vec<String>) -> Self {
        Self {
            name: name.into(),
            file_urls,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.file_urls.is_empty()
    }
}

/// Destination object key for the file at `position` (1-based) of a release.
///
/// The format is fixed by the downstream table layout: `{dataset}/file{N}.json.gz`.
pub fn object_key(dataset: &str, position: usize) -> String {
    format!("{dataset}/file{position}.json.gz")
}

/// One file transfer. Owned and mutated by exactly one pipeline worker;
/// nothing is retained across files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTask {
    pub source_url: String,
    pub destination_key: String,
    /// Declared content length of the source, when it declares one.
    pub total_bytes: Option<u64>,
    pub bytes_transferred: u64,
}

impl TransferTask {
    pub fn new(source_url: impl Into<String>, destination_key: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            destination_key: destination_key.into(),
            total_bytes: None,
            bytes_transferred: 0,
        }
    }
}

/// Terminal result of one transfer task.
#[derive(Debug)]
pub enum TransferOutcome {
    Success,
    Failure(TransferError),
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success)
    }
}

/// Destination bucket identity, checked then possibly created once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketDescriptor {
    pub name: String,
    pub region: String,
}

/// Caller hook into the pipeline. Invoked from worker tasks, so
/// implementations must be shareable across threads.
///
/// `bytes_transferred` receives the monotonically increasing cumulative
/// total for one task; each task owns its own accumulator, so counts from
/// different keys never interleave into the same series.
pub trait TransferObserver: Send + Sync {
    fn task_started(&self, _task: &TransferTask) {}
    fn bytes_transferred(&self, _key: &str, _cumulative: u64, _total: Option<u64>) {}
    fn task_finished(&self, _task: &TransferTask, _outcome: &TransferOutcome) {}
}

/// Observer used when the caller does not care about progress.
pub struct NoopObserver;

impl TransferObserver for NoopObserver {}

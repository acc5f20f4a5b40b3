//! Bounded-parallel fan-out over the files of one release.

use std::sync::Arc;

use futures_util::{StreamExt, TryStreamExt, stream};
use tracing::{info, warn};

use crate::data::{
    DatasetRelease, NoopObserver, TransferObserver, TransferOutcome, TransferTask, object_key,
};
use crate::error::TransferError;
use crate::http::FileSource;
use crate::store::ObjectStore;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Maximum number of files in flight at once.
    pub concurrency: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Streams every file of a release from its source URL into the destination
/// bucket. The destination bucket must already exist (see
/// [`crate::provision::BucketProvisioner`]).
pub struct TransferPipeline<F, S> {
    source: F,
    store: S,
    bucket: String,
    options: PipelineOptions,
    observer: Arc<dyn TransferObserver>,
}

impl<F: FileSource, S: ObjectStore> TransferPipeline<F, S> {
    pub fn new(source: F, store: S, bucket: impl Into<String>) -> Self {
        Self {
            source,
            store,
            bucket: bucket.into(),
            options: PipelineOptions::default(),
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn TransferObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Transfer every file of `release`, returning exactly one outcome per
    /// input URL, aligned to catalog order. A failing file is recorded and
    /// its siblings keep running.
    pub async fn run(&self, release: &DatasetRelease) -> Vec<(TransferTask, TransferOutcome)> {
        if release.is_empty() {
            info!(dataset = %release.name, "no files found in release");
            return Vec::new();
        }

        let transfers = release.file_urls.iter().enumerate().map(|(idx, url)| {
            let key = object_key(&release.name, idx + 1);
            async move {
                let (task, outcome) = self.transfer_one(url, key).await;
                (idx, task, outcome)
            }
        });

        let mut results: Vec<(usize, TransferTask, TransferOutcome)> = stream::iter(transfers)
            .buffer_unordered(self.options.concurrency.max(1))
            .collect()
            .await;

        // Workers finish out of order; report in catalog order.
        results.sort_by_key(|(idx, ..)| *idx);
        results
            .into_iter()
            .map(|(_, task, outcome)| (task, outcome))
            .collect()
    }

    async fn transfer_one(&self, url: &str, key: String) -> (TransferTask, TransferOutcome) {
        let mut task = TransferTask::new(url, key);
        self.observer.task_started(&task);

        let outcome = match self.try_transfer(&mut task).await {
            Ok(()) => TransferOutcome::Success,
            Err(err) => {
                warn!(key = %task.destination_key, error = %err, "transfer failed");
                TransferOutcome::Failure(err)
            }
        };

        self.observer.task_finished(&task, &outcome);
        (task, outcome)
    }

    async fn try_transfer(&self, task: &mut TransferTask) -> Result<(), TransferError> {
        let source = self.source.open(&task.source_url).await?;
        task.total_bytes = source.total_bytes;

        // The accumulator is owned by this task's stream; no progress state
        // is shared between tasks.
        let observer = Arc::clone(&self.observer);
        let key = task.destination_key.clone();
        let total = task.total_bytes;
        let mut cumulative = 0u64;
        let counted = source
            .bytes
            .inspect_ok(move |bytes| {
                cumulative += bytes.len() as u64;
                observer.bytes_transferred(&key, cumulative, total);
            })
            .boxed();

        let uploaded = self
            .store
            .upload(&self.bucket, &task.destination_key, counted)
            .await
            .map_err(|source| TransferError::Upload {
                key: task.destination_key.clone(),
                source,
            })?;

        task.bytes_transferred = uploaded;
        Ok(())
    }
}

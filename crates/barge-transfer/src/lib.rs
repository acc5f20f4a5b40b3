//! Streaming transfer of catalog dataset releases into object storage.
//!
//! # Architecture
//!
//! - [`data`] - Immutable release/task types and the progress observer contract
//! - [`catalog`] - Release metadata retrieval from the catalog API
//! - [`http`] - Streaming byte source abstraction with a reqwest adapter
//! - [`store`] - Object storage abstraction with an S3 multipart adapter
//! - [`provision`] - Idempotent destination bucket provisioning
//! - [`pipeline`] - Bounded-parallel fan-out over a release's files
//!
//! # Key properties
//!
//! - **Single-Pass**: the upload consumes the same byte stream the download
//!   produces, so peak memory is bounded by one chunk (one part for S3)
//! - **Outcome Isolation**: one failing file never aborts or skips its
//!   siblings; the pipeline always reports one outcome per input URL
//! - **Mechanism-Only**: no retry policy and no progress UI; the caller
//!   observes transfers through [`data::TransferObserver`]

pub mod catalog;
pub mod data;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod provision;
pub mod store;

pub use catalog::CatalogClient;
pub use data::{
    BucketDescriptor, DatasetRelease, NoopObserver, TransferObserver, TransferOutcome,
    TransferTask, object_key,
};
pub use error::{FetchError, ProvisionError, SourceError, StoreError, TransferError};
pub use http::{ByteStream, FileSource, ReqwestSource, SourceStream};
pub use pipeline::{PipelineOptions, TransferPipeline};
pub use provision::{BucketProvisioner, DEFAULT_REGION};
pub use store::{ObjectStore, S3Gateway};

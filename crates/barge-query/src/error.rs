//! Error types for barge-query. Each variant is fatal to one query
//! invocation only.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    /// The service rejected the submission; no job was created.
    #[error("query submission rejected: {0}")]
    SubmitRejected(String),

    /// The job reached the `Failed` terminal state.
    #[error("query job {job_id} failed: {reason}")]
    Failed { job_id: String, reason: String },

    /// The job reached the `Cancelled` terminal state on the service side.
    #[error("query job {job_id} was cancelled by the service")]
    Cancelled { job_id: String },

    /// The poll deadline elapsed before the job reached a terminal state.
    #[error("query job {job_id} did not complete within {waited:?}")]
    TimedOut { job_id: String, waited: Duration },

    /// The caller's cancellation token fired; polling stopped. The remote
    /// job was not cancelled.
    #[error("wait for query job {job_id} was interrupted by the caller")]
    Interrupted { job_id: String },

    /// Transport or protocol failure talking to the query service.
    #[error("query service error: {0}")]
    Service(String),
}

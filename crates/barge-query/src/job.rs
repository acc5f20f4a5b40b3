//! Job identity, states, and the query service capability trait.

use async_trait::async_trait;

use crate::error::QueryError;

/// Lifecycle states of a query job. The three terminal states are final;
/// no transition (and no poll) occurs after reaching one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Submitted,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

/// One status poll's answer: the state plus the service's failure reason,
/// when it reports one.
#[derive(Debug, Clone)]
pub struct JobStatus {
    pub state: JobState,
    pub reason: Option<String>,
}

impl JobStatus {
    pub fn new(state: JobState) -> Self {
        Self {
            state,
            reason: None,
        }
    }
}

/// A submitted query job. State transitions are driven only by the runner's
/// poll loop.
#[derive(Debug, Clone)]
pub struct QueryJob {
    pub id: String,
    pub sql: String,
    pub state: JobState,
}

/// Capability interface over the managed query service.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Submit `sql` for execution, returning the job identifier. A rejected
    /// submission is terminal; no job exists afterwards.
    async fn submit(
        &self,
        sql: &str,
        database: &str,
        output_location: &str,
    ) -> Result<String, QueryError>;

    async fn status(&self, job_id: &str) -> Result<JobStatus, QueryError>;

    /// Fetch the result page for a succeeded job, as rows of cells. The
    /// first row carries column names.
    async fn result_page(&self, job_id: &str) -> Result<Vec<Vec<String>>, QueryError>;
}

#[async_trait]
impl<S: QueryService + ?Sized> QueryService for std::sync::Arc<S> {
    async fn submit(
        &self,
        sql: &str,
        database: &str,
        output_location: &str,
    ) -> Result<String, QueryError> {
        (**self).submit(sql, database, output_location).await
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, QueryError> {
        (**self).status(job_id).await
    }

    async fn result_page(&self, job_id: &str) -> Result<Vec<Vec<String>>, QueryError> {
        (**self).result_page(job_id).await
    }
}

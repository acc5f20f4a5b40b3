//! Submit-poll-fetch driver for one query invocation.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::QueryError;
use crate::job::{JobState, QueryJob, QueryService};
use crate::table::ResultTable;

#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Fixed delay between status polls.
    pub interval: Duration,
    /// Wall-clock ceiling on the whole wait; `None` polls until terminal.
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: None,
        }
    }
}

/// Runs queries through a [`QueryService`]: submit, poll to a terminal
/// state, then fetch and materialize the single result page.
pub struct QueryRunner<S> {
    service: S,
    database: String,
    output_location: String,
    poll: PollConfig,
}

impl<S: QueryService> QueryRunner<S> {
    pub fn new(
        service: S,
        database: impl Into<String>,
        output_location: impl Into<String>,
    ) -> Self {
        Self {
            service,
            database: database.into(),
            output_location: output_location.into(),
            poll: PollConfig::default(),
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub async fn submit(&self, sql: &str) -> Result<QueryJob, QueryError> {
        let id = self
            .service
            .submit(sql, &self.database, &self.output_location)
            .await?;
        info!(job_id = %id, "query submitted");
        Ok(QueryJob {
            id,
            sql: sql.to_string(),
            state: JobState::Submitted,
        })
    }

    /// Poll `job` at the configured interval until it reaches a terminal
    /// state. `Succeeded` returns `Ok`; `Failed` and `Cancelled` become
    /// errors and no results are fetched for them.
    pub async fn poll_to_completion(
        &self,
        job: &mut QueryJob,
        cancel: &CancellationToken,
    ) -> Result<(), QueryError> {
        let started = Instant::now();
        loop {
            let status = self.service.status(&job.id).await?;
            job.state = status.state;
            match status.state {
                JobState::Succeeded => {
                    info!(job_id = %job.id, "query succeeded");
                    return Ok(());
                }
                JobState::Failed => {
                    return Err(QueryError::Failed {
                        job_id: job.id.clone(),
                        reason: status.reason.unwrap_or_else(|| "unknown reason".into()),
                    });
                }
                JobState::Cancelled => {
                    return Err(QueryError::Cancelled {
                        job_id: job.id.clone(),
                    });
                }
                JobState::Submitted | JobState::Running => {
                    debug!(job_id = %job.id, state = ?status.state, "query still in flight");
                    if let Some(timeout) = self.poll.timeout
                        && started.elapsed() >= timeout
                    {
                        return Err(QueryError::TimedOut {
                            job_id: job.id.clone(),
                            waited: started.elapsed(),
                        });
                    }
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            return Err(QueryError::Interrupted {
                                job_id: job.id.clone(),
                            });
                        }
                        _ = tokio::time::sleep(self.poll.interval) => {}
                    }
                }
            }
        }
    }

    /// Run `sql` end to end and materialize the result page.
    pub async fn run(
        &self,
        sql: &str,
        cancel: &CancellationToken,
    ) -> Result<ResultTable, QueryError> {
        let mut job = self.submit(sql).await?;
        self.poll_to_completion(&mut job, cancel).await?;
        let page = self.service.result_page(&job.id).await?;
        Ok(ResultTable::from_raw_page(page))
    }
}

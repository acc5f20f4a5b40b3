//! [`QueryService`] adapter for AWS Athena.

use async_trait::async_trait;
use tracing::debug;

use aws_sdk_athena::error::DisplayErrorContext;
use aws_sdk_athena::types::{QueryExecutionContext, QueryExecutionState, ResultConfiguration};

use crate::error::QueryError;
use crate::job::{JobState, JobStatus, QueryService};

/// Athena-backed query service: StartQueryExecution / GetQueryExecution /
/// GetQueryResults.
#[derive(Debug, Clone)]
pub struct AthenaService {
    client: aws_sdk_athena::Client,
}

impl AthenaService {
    pub fn new(client: aws_sdk_athena::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryService for AthenaService {
    async fn submit(
        &self,
        sql: &str,
        database: &str,
        output_location: &str,
    ) -> Result<String, QueryError> {
        let response = self
            .client
            .start_query_execution()
            .query_string(sql)
            .query_execution_context(
                QueryExecutionContext::builder().database(database).build(),
            )
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(output_location)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| QueryError::SubmitRejected(DisplayErrorContext(&e).to_string()))?;

        response
            .query_execution_id()
            .map(str::to_string)
            .ok_or_else(|| {
                QueryError::SubmitRejected("service returned no query execution id".into())
            })
    }

    async fn status(&self, job_id: &str) -> Result<JobStatus, QueryError> {
        let response = self
            .client
            .get_query_execution()
            .query_execution_id(job_id)
            .send()
            .await
            .map_err(|e| QueryError::Service(DisplayErrorContext(&e).to_string()))?;

        let status = response
            .query_execution()
            .and_then(|execution| execution.status())
            .ok_or_else(|| QueryError::Service(format!("no status reported for job {job_id}")))?;

        let state = match status.state() {
            Some(QueryExecutionState::Queued) => JobState::Submitted,
            Some(QueryExecutionState::Running) => JobState::Running,
            Some(QueryExecutionState::Succeeded) => JobState::Succeeded,
            Some(QueryExecutionState::Failed) => JobState::Failed,
            Some(QueryExecutionState::Cancelled) => JobState::Cancelled,
            other => {
                return Err(QueryError::Service(format!(
                    "unrecognized state {other:?} for job {job_id}"
                )));
            }
        };
        debug!(job_id, state = ?state, "polled query status");

        Ok(JobStatus {
            state,
            reason: status.state_change_reason().map(str::to_string),
        })
    }

    async fn result_page(&self, job_id: &str) -> Result<Vec<Vec<String>>, QueryError> {
        let response = self
            .client
            .get_query_results()
            .query_execution_id(job_id)
            .send()
            .await
            .map_err(|e| QueryError::Service(DisplayErrorContext(&e).to_string()))?;

        let rows = response
            .result_set()
            .map(|set| set.rows())
            .unwrap_or_default();

        Ok(rows
            .iter()
            .map(|row| {
                row.data()
                    .iter()
                    .map(|datum| datum.var_char_value().unwrap_or_default().to_string())
                    .collect()
            })
            .collect())
    }
}

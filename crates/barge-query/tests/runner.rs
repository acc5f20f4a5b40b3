//! Poll-loop behavior against a scripted fake query service.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use barge_query::{
    JobState, JobStatus, PollConfig, QueryError, QueryRunner, QueryService,
};

/// Replays a scripted sequence of states; once the script is exhausted it
/// keeps answering `Running`.
struct ScriptedService {
    reject_submit: bool,
    states: Mutex<VecDeque<JobState>>,
    status_calls: AtomicUsize,
    result_calls: AtomicUsize,
}

impl ScriptedService {
    fn new(states: &[JobState]) -> Self {
        Self {
            reject_submit: false,
            states: Mutex::new(states.iter().copied().collect()),
            status_calls: AtomicUsize::new(0),
            result_calls: AtomicUsize::new(0),
        }
    }

    fn rejecting() -> Self {
        let mut service = Self::new(&[]);
        service.reject_submit = true;
        service
    }
}

#[async_trait]
impl QueryService for ScriptedService {
    async fn submit(
        &self,
        _sql: &str,
        _database: &str,
        _output_location: &str,
    ) -> Result<String, QueryError> {
        if self.reject_submit {
            return Err(QueryError::SubmitRejected("syntax error at line 1".into()));
        }
        Ok("job-1".to_string())
    }

    async fn status(&self, _job_id: &str) -> Result<JobStatus, QueryError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let state = self
            .states
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(JobState::Running);
        let reason = (state == JobState::Failed).then(|| "SYNTAX_ERROR".to_string());
        Ok(JobStatus { state, reason })
    }

    async fn result_page(&self, _job_id: &str) -> Result<Vec<Vec<String>>, QueryError> {
        self.result_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![
            vec!["Title".to_string(), "Year".to_string()],
            vec!["A".to_string(), "2020".to_string()],
        ])
    }
}

fn fast_poll() -> PollConfig {
    PollConfig {
        interval: Duration::from_millis(1),
        timeout: None,
    }
}

fn runner(service: &Arc<ScriptedService>) -> QueryRunner<Arc<ScriptedService>> {
    QueryRunner::new(Arc::clone(service), "webinar", "s3://results/").with_poll_config(fast_poll())
}

#[tokio::test]
async fn polls_until_succeeded_then_fetches_once() {
    let service = Arc::new(ScriptedService::new(&[
        JobState::Running,
        JobState::Running,
        JobState::Succeeded,
    ]));
    let cancel = CancellationToken::new();

    let table = runner(&service)
        .run("SELECT 1", &cancel)
        .await
        .unwrap();

    assert_eq!(service.status_calls.load(Ordering::SeqCst), 3);
    assert_eq!(service.result_calls.load(Ordering::SeqCst), 1);
    assert_eq!(table.columns(), ["Title", "Year"]);
    assert_eq!(table.rows().len(), 1);
}

#[tokio::test]
async fn failed_job_propagates_without_result_fetch() {
    let service = Arc::new(ScriptedService::new(&[JobState::Running, JobState::Failed]));
    let cancel = CancellationToken::new();

    let err = runner(&service).run("SELECT 1", &cancel).await.unwrap_err();

    assert!(matches!(
        err,
        QueryError::Failed { ref job_id, ref reason }
            if job_id == "job-1" && reason == "SYNTAX_ERROR"
    ));
    assert_eq!(service.result_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cancelled_job_is_classified_as_cancelled() {
    let service = Arc::new(ScriptedService::new(&[JobState::Cancelled]));
    let cancel = CancellationToken::new();

    let err = runner(&service).run("SELECT 1", &cancel).await.unwrap_err();

    assert!(matches!(err, QueryError::Cancelled { .. }));
    assert_eq!(service.status_calls.load(Ordering::SeqCst), 1);
    assert_eq!(service.result_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rejected_submission_never_polls() {
    let service = Arc::new(ScriptedService::rejecting());
    let cancel = CancellationToken::new();

    let err = runner(&service).run("SELEC 1", &cancel).await.unwrap_err();

    assert!(matches!(err, QueryError::SubmitRejected(_)));
    assert_eq!(service.status_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn deadline_surfaces_as_timed_out() {
    let service = Arc::new(ScriptedService::new(&[]));
    let cancel = CancellationToken::new();
    let runner = QueryRunner::new(Arc::clone(&service), "webinar", "s3://results/").with_poll_config(
        PollConfig {
            interval: Duration::from_millis(1),
            timeout: Some(Duration::ZERO),
        },
    );

    let err = runner.run("SELECT 1", &cancel).await.unwrap_err();

    assert!(matches!(err, QueryError::TimedOut { .. }));
    assert_eq!(service.status_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn caller_cancellation_abandons_the_wait() {
    let service = Arc::new(ScriptedService::new(&[]));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let runner = QueryRunner::new(Arc::clone(&service), "webinar", "s3://results/").with_poll_config(
        PollConfig {
            interval: Duration::from_secs(60),
            timeout: None,
        },
    );

    let err = runner.run("SELECT 1", &cancel).await.unwrap_err();

    assert!(matches!(err, QueryError::Interrupted { .. }));
    // One status call happens before the wait; the cancelled token stops
    // any further polling.
    assert_eq!(service.status_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn submitted_state_keeps_polling() {
    let service = Arc::new(ScriptedService::new(&[JobState::Submitted, JobState::Succeeded]));
    let cancel = CancellationToken::new();

    runner(&service).run("SELECT 1", &cancel).await.unwrap();

    assert_eq!(service.status_calls.load(Ordering::SeqCst), 2);
}

//! Asynchronous query jobs against a managed query service.
//!
//! # Architecture
//!
//! - [`job`] - Job identity, states, and the `QueryService` capability trait
//! - [`runner`] - Submit, then poll to a terminal state, then fetch results
//! - [`table`] - Generic materialization of a raw result page into a table
//! - [`athena`] - `QueryService` adapter for AWS Athena
//!
//! The state machine is `Submitted -> Running -> {Succeeded, Failed,
//! Cancelled}`; terminal states are final and never polled past. Polling is
//! bounded by an optional wall-clock deadline and a caller-supplied
//! cancellation token.

pub mod athena;
pub mod error;
pub mod job;
pub mod runner;
pub mod table;

pub use athena::AthenaService;
pub use error::QueryError;
pub use job::{JobState, JobStatus, QueryJob, QueryService};
pub use runner::{PollConfig, QueryRunner};
pub use table::ResultTable;

//! Runner module for bulk ticket checks.
//!
//! This module provides the `TaskRunner`, which executes tasks against a
//! `QueryClient` with a bounded number of in-flight queries:
//! - Submission: each task waits a short random stagger, then a free pool slot
//! - Execution: one query, one retry after a fixed delay on transport errors,
//!   then decode
//! - Classification: every task ends up in exactly one of the success or
//!   failure buckets of the `RunReport`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ticket_checker_core::{HttpQueryClient, QueryConfig, RunnerConfig, TaskRunner};
//!
//! let client = Arc::new(HttpQueryClient::new(QueryConfig::default())?);
//! let runner = TaskRunner::new(RunnerConfig::default(), client)?;
//!
//! let report = runner.run_all(tasks).await;
//! println!("{} ok, {} failed", report.success_count(), report.failure_count());
//! ```

mod check;
mod pool;
mod state;
mod types;

pub use pool::{RunSession, RunnerError, TaskRunner};
pub use types::{Classification, RunReport, RunnerStatus};

//! Types for the runner module.

use serde::{Deserialize, Serialize};

use crate::task::CheckResult;

/// Terminal label of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Success(CheckResult),
    /// Carries only the identity fields of the task.
    Failure(CheckResult),
}

impl Classification {
    pub fn is_success(&self) -> bool {
        matches!(self, Classification::Success(_))
    }
}

/// Results of a completed run, in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub successes: Vec<CheckResult>,
    pub failures: Vec<CheckResult>,
}

impl RunReport {
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Number of classified tasks.
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

/// Snapshot of the worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerStatus {
    /// Maximum concurrent queries.
    pub pool_size: usize,
    /// Tasks holding a pool slot.
    pub active_tasks: usize,
    /// Tasks waiting for a pool slot.
    pub queued_tasks: usize,
    /// Tasks classified as successful since the runner was created.
    pub total_succeeded: u64,
    /// Tasks classified as failed since the runner was created.
    pub total_failed: u64,
}

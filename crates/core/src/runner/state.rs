//! Completion bookkeeping for a single run.

use tracing::{debug, error};

use super::types::{Classification, RunReport};

/// Success and failure buckets plus the count of tasks not yet classified.
///
/// Owned by the single consumer of the completion channel, so classify,
/// append and decrement happen as one step per task.
#[derive(Debug)]
pub(crate) struct RunState {
    report: RunReport,
    pending: usize,
}

impl RunState {
    pub(crate) fn new(submitted: usize) -> Self {
        Self {
            report: RunReport::default(),
            pending: submitted,
        }
    }

    pub(crate) fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Success(result) => self.report.successes.push(result),
            Classification::Failure(result) => self.report.failures.push(result),
        }
        self.pending = self.pending.saturating_sub(1);

        debug!(
            succeeded = self.report.success_count(),
            failed = self.report.failure_count(),
            pending = self.pending,
            "Task classified"
        );
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending
    }

    pub(crate) fn into_report(self) -> RunReport {
        if self.pending() != 0 {
            error!(
                pending = self.pending(),
                "Run finished with unclassified tasks"
            );
        }
        self.report
    }
}

//! Bounded-concurrency task runner.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use rand::Rng;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::RunnerConfig;
use crate::query::QueryClient;
use crate::task::{CheckResult, Task};

use super::check::check_task;
use super::state::RunState;
use super::types::{Classification, RunReport, RunnerStatus};

/// Error type for runner construction.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The pool cannot be set up; nothing has been submitted.
    #[error("Runner configuration error: {0}")]
    Configuration(String),
}

/// Tracks statistics for the worker pool.
#[derive(Default)]
struct PoolStats {
    active: AtomicU64,
    queued: AtomicU64,
    total_succeeded: AtomicU64,
    total_failed: AtomicU64,
}

impl PoolStats {
    fn to_status(&self, pool_size: usize) -> RunnerStatus {
        RunnerStatus {
            pool_size,
            active_tasks: self.active.load(Ordering::Relaxed) as usize,
            queued_tasks: self.queued.load(Ordering::Relaxed) as usize,
            total_succeeded: self.total_succeeded.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
        }
    }
}

/// Runs tasks against a query client with at most `pool_size` in flight.
pub struct TaskRunner {
    config: RunnerConfig,
    client: Arc<dyn QueryClient>,
    semaphore: Arc<Semaphore>,
    stats: Arc<PoolStats>,
}

impl TaskRunner {
    /// Creates a runner with a fixed-size pool.
    pub fn new(config: RunnerConfig, client: Arc<dyn QueryClient>) -> Result<Self, RunnerError> {
        if config.pool_size == 0 {
            return Err(RunnerError::Configuration(
                "pool size must be positive".to_string(),
            ));
        }
        if config.pool_size > Semaphore::MAX_PERMITS {
            return Err(RunnerError::Configuration(format!(
                "pool size {} exceeds the maximum of {}",
                config.pool_size,
                Semaphore::MAX_PERMITS
            )));
        }
        if config.stagger_min_ms > config.stagger_max_ms {
            return Err(RunnerError::Configuration(format!(
                "stagger range {}..={} ms is empty",
                config.stagger_min_ms, config.stagger_max_ms
            )));
        }

        let semaphore = Arc::new(Semaphore::new(config.pool_size));
        info!(pool_size = config.pool_size, "Task runner initialized");

        Ok(Self {
            config,
            client,
            semaphore,
            stats: Arc::new(PoolStats::default()),
        })
    }

    /// Returns the current pool status.
    pub fn status(&self) -> RunnerStatus {
        self.stats.to_status(self.config.pool_size)
    }

    /// Starts a run. Tasks are added with [`RunSession::submit`].
    pub fn begin(&self) -> RunSession<'_> {
        let (tx, rx) = mpsc::unbounded_channel();
        RunSession {
            runner: self,
            tx,
            rx,
            submitted: 0,
        }
    }

    /// Submits every task in order and waits until each one is classified.
    pub async fn run_all(&self, tasks: Vec<Task>) -> RunReport {
        if tasks.is_empty() {
            info!("No tasks to run");
            return RunReport::default();
        }

        let total = tasks.len();
        info!(tasks = total, pool_size = self.config.pool_size, "Starting run");

        let mut session = self.begin();
        for task in tasks {
            session.submit(task).await;
        }
        let report = session.finish().await;

        info!(
            tasks = total,
            succeeded = report.success_count(),
            failed = report.failure_count(),
            "Run complete"
        );
        report
    }

    /// Random pause inserted before each submission.
    fn stagger_delay(&self) -> Duration {
        let (min, max) = (self.config.stagger_min_ms, self.config.stagger_max_ms);
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

/// An in-progress run.
///
/// Every submitted task reports exactly one [`Classification`] through the
/// completion channel; [`RunSession::finish`] is the only reader.
pub struct RunSession<'a> {
    runner: &'a TaskRunner,
    tx: mpsc::UnboundedSender<Classification>,
    rx: mpsc::UnboundedReceiver<Classification>,
    submitted: usize,
}

impl RunSession<'_> {
    /// Number of tasks submitted so far.
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Submits a task to the pool.
    ///
    /// Sleeps for the stagger delay, then waits for a free pool slot. Returns
    /// once the task has been handed to a worker.
    pub async fn submit(&mut self, task: Task) {
        let delay = self.runner.stagger_delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }

        let stats = Arc::clone(&self.runner.stats);
        stats.queued.fetch_add(1, Ordering::Relaxed);
        let permit = Arc::clone(&self.runner.semaphore).acquire_owned().await;
        stats.queued.fetch_sub(1, Ordering::Relaxed);
        self.submitted += 1;

        let permit = match permit {
            Ok(permit) => permit,
            Err(e) => {
                error!(name = %task.name, error = %e, "Pool closed, task not executed");
                stats.total_failed.fetch_add(1, Ordering::Relaxed);
                let _ = self
                    .tx
                    .send(Classification::Failure(CheckResult::identity(&task)));
                return;
            }
        };

        stats.active.fetch_add(1, Ordering::Relaxed);
        debug!(name = %task.name, submitted = self.submitted, "Task submitted");

        let client = Arc::clone(&self.runner.client);
        let retry_delay = Duration::from_millis(self.runner.config.retry_delay_ms);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let _permit = permit;

            let outcome = AssertUnwindSafe(check_task(client.as_ref(), &task, retry_delay))
                .catch_unwind()
                .await;
            let classification = outcome.unwrap_or_else(|_| {
                error!(name = %task.name, credential = %task.credential, "Task panicked");
                Classification::Failure(CheckResult::identity(&task))
            });

            if classification.is_success() {
                stats.total_succeeded.fetch_add(1, Ordering::Relaxed);
            } else {
                stats.total_failed.fetch_add(1, Ordering::Relaxed);
            }
            stats.active.fetch_sub(1, Ordering::Relaxed);

            // The receiver lives until every sender is gone.
            let _ = tx.send(classification);
        });
    }

    /// Waits until every submitted task has been classified.
    pub async fn finish(self) -> RunReport {
        let RunSession {
            tx, mut rx, submitted, ..
        } = self;
        drop(tx);

        let mut state = RunState::new(submitted);
        while let Some(classification) = rx.recv().await {
            state.record(classification);
        }

        state.into_report()
    }
}

//! Task list parsing.
//!
//! The input is a plain text file with one visitor per line:
//!
//! ```text
//! Alice ID123
//! Bob   ID999
//! ```

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use super::types::Task;

/// Errors raised while loading the task list.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read task list {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No valid entries found in task list {0}")]
    NoTasks(String),
}

/// Parse task list contents into tasks for the given date.
///
/// Lines with fewer than two whitespace-separated tokens are skipped.
/// Tokens after the credential are ignored.
pub fn parse_task_list(contents: &str, date: &str) -> Vec<Task> {
    let mut tasks = Vec::new();

    for (line_no, line) in contents.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some(name), Some(credential)) => {
                tasks.push(Task::new(name, credential, date));
            }
            _ => {
                warn!(line = line_no + 1, content = %line, "Skipping malformed task line");
            }
        }
    }

    tasks
}

/// Read and parse the task list at `path`.
///
/// Fails with [`InputError::NoTasks`] when the file yields no task at all.
pub fn load_task_list(path: &Path, date: &str) -> Result<Vec<Task>, InputError> {
    let contents = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let tasks = parse_task_list(&contents, date);
    if tasks.is_empty() {
        return Err(InputError::NoTasks(path.display().to_string()));
    }

    info!(
        count = tasks.len(),
        first_name = %tasks[0].name,
        first_credential = %tasks[0].credential,
        "Task list loaded"
    );

    Ok(tasks)
}

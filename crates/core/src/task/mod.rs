//! Tasks, their results, and the task list they are read from.

mod input;
mod types;

pub use input::{load_task_list, parse_task_list, InputError};
pub use types::{CheckResult, Task, Ticket, MAX_TICKETS};

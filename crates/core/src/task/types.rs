//! Domain types shared by the runner, decoder and report writer.

use serde::{Deserialize, Serialize};

/// Maximum number of ticket line items kept per result.
pub const MAX_TICKETS: usize = 10;

/// One lookup request: a visitor, their credential and the tour date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    pub credential: String,
    pub date: String,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        credential: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            credential: credential.into(),
            date: date.into(),
        }
    }
}

/// Outcome of checking a single task.
///
/// Fields that could not be resolved from the response stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub visitor_name: String,
    pub credential: String,
    pub ticket_number: String,
    pub crowd_type_name: String,
    pub tour_date: String,
    pub start_date: String,
    pub end_date: String,
    /// At most [`MAX_TICKETS`] entries.
    pub tickets: Vec<Ticket>,
}

impl CheckResult {
    /// A result carrying only the identity of the task.
    pub fn identity(task: &Task) -> Self {
        Self {
            visitor_name: task.name.clone(),
            credential: task.credential.clone(),
            tour_date: task.date.clone(),
            ..Default::default()
        }
    }
}

/// A ticket line item attached to a result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub sku_name: String,
    pub child_status_name: String,
    pub order_no: String,
    pub order_source_name: String,
}

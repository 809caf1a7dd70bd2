//! Decoding of ticket query responses.
//!
//! The endpoint answers with a JSON envelope:
//!
//! ```json
//! {"data": {"ticketNumber": "T1", "crowdTypeName": "Adult",
//!           "startDate": "2024-10-10", "endDate": "2024-10-11",
//!           "electronicCodeProductProviderOutBOS": [{"skuName": "Park", ...}]}}
//! ```
//!
//! `ticketNumber` and `crowdTypeName` must resolve for the decode to succeed.
//! The dates are best effort: a missing date is logged and left empty.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::task::{CheckResult, Task, Ticket, MAX_TICKETS};

const TICKETS_KEY: &str = "electronicCodeProductProviderOutBOS";

/// Failure to resolve a single string field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("field '{0}' is missing")]
    Missing(&'static str),

    #[error("field '{0}' is not a string")]
    NotAString(&'static str),
}

/// Terminal decode failures. The task is classified as failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Response has no 'data' object")]
    MissingData,

    #[error("Mandatory {0}")]
    MandatoryField(FieldError),

    #[error("Ticket item {index}: {source}")]
    TicketItem { index: usize, source: FieldError },
}

/// Decode a raw response body into a result for `task`.
pub fn decode(task: &Task, body: &[u8]) -> Result<CheckResult, DecodeError> {
    let json: Value =
        serde_json::from_slice(body).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;

    let data = json
        .get("data")
        .filter(|d| d.is_object())
        .ok_or(DecodeError::MissingData)?;

    let mut result = CheckResult::identity(task);

    result.ticket_number =
        string_field(data, "ticketNumber").map_err(DecodeError::MandatoryField)?;
    result.crowd_type_name =
        string_field(data, "crowdTypeName").map_err(DecodeError::MandatoryField)?;

    result.start_date = optional_field(task, data, "startDate");
    result.end_date = optional_field(task, data, "endDate");

    result.tickets = decode_tickets(data)?;

    Ok(result)
}

/// Read up to [`MAX_TICKETS`] items, stopping at the first one without `skuName`.
fn decode_tickets(data: &Value) -> Result<Vec<Ticket>, DecodeError> {
    let Some(items) = data.get(TICKETS_KEY).and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let mut tickets = Vec::new();
    for (index, item) in items.iter().take(MAX_TICKETS).enumerate() {
        if item.get("skuName").is_none() {
            break;
        }

        let item_error = |source| DecodeError::TicketItem { index, source };
        tickets.push(Ticket {
            sku_name: string_field(item, "skuName").map_err(item_error)?,
            child_status_name: string_field(item, "childStatusName").map_err(item_error)?,
            order_no: string_field(item, "orderNo").unwrap_or_default(),
            order_source_name: string_field(item, "orderSourceName").unwrap_or_default(),
        });
    }

    Ok(tickets)
}

fn string_field(object: &Value, key: &'static str) -> Result<String, FieldError> {
    match object.get(key) {
        None => Err(FieldError::Missing(key)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(FieldError::NotAString(key)),
    }
}

fn optional_field(task: &Task, object: &Value, key: &'static str) -> String {
    string_field(object, key).unwrap_or_else(|e| {
        warn!(name = %task.name, credential = %task.credential, error = %e, "Optional field unresolved");
        String::new()
    })
}

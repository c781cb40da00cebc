//! JSON trace event reader.
//!
//! Accepts either a bare array of events or an object holding the array
//! under one of the known list fields. Each event looks like:
//!
//! ```json
//! { "name": "sched_switch", "timestamp": 1000, "cpu": 0,
//!   "fields": { "prev_tid": 7, "next_tid": 42, "next_comm": "bash" } }
//! ```

use super::{FieldValue, TraceEvent};
use crate::utils::config::EVENT_LIST_FIELDS;
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Raw event as found in the input file
#[derive(Debug, Clone, Deserialize)]
struct RawEvent {
    #[serde(alias = "type", alias = "event")]
    name: String,

    #[serde(alias = "ts", alias = "time")]
    timestamp: i64,

    #[serde(default, alias = "source")]
    cpu: Option<i32>,

    #[serde(default)]
    fields: serde_json::Map<String, serde_json::Value>,
}

/// Read and parse events from a JSON file
pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<TraceEvent>, ParseError> {
    let path = path.as_ref();
    debug!("Reading events from: {}", path.display());

    let file = File::open(path)?;
    let raw: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;
    parse_events(&raw)
}

/// Parse events from an already-loaded JSON document
///
/// Malformed events are logged and skipped. If every event is malformed
/// the whole input is rejected.
pub fn parse_events(raw: &serde_json::Value) -> Result<Vec<TraceEvent>, ParseError> {
    let list = extract_event_list(raw)?;

    let mut events = Vec::with_capacity(list.len());
    for (index, value) in list.iter().enumerate() {
        match serde_json::from_value::<RawEvent>(value.clone()) {
            Ok(raw_event) => events.push(to_trace_event(raw_event)),
            Err(e) => warn!("Failed to parse event {}: {}", index, e),
        }
    }

    if events.is_empty() && !list.is_empty() {
        return Err(ParseError::InvalidFormat(
            "All events failed to parse".to_string(),
        ));
    }

    debug!("Parsed {} events", events.len());
    Ok(events)
}

fn extract_event_list(raw: &serde_json::Value) -> Result<&Vec<serde_json::Value>, ParseError> {
    match raw {
        serde_json::Value::Array(list) => Ok(list),
        serde_json::Value::Object(obj) => EVENT_LIST_FIELDS
            .iter()
            .find_map(|field| obj.get(*field).and_then(|v| v.as_array()))
            .ok_or_else(|| {
                ParseError::InvalidFormat(format!(
                    "Expected an event array under one of: {}",
                    EVENT_LIST_FIELDS.join(", ")
                ))
            }),
        _ => Err(ParseError::InvalidFormat(
            "Events must be a JSON array or object".to_string(),
        )),
    }
}

fn to_trace_event(raw: RawEvent) -> TraceEvent {
    let mut event = TraceEvent::new(raw.name, raw.timestamp);
    event.source = raw.cpu;

    for (name, value) in raw.fields {
        match serde_json::from_value::<FieldValue>(value) {
            Ok(field) => event.fields.push((name, field)),
            Err(_) => warn!(
                "Skipping field '{}' of event '{}': unsupported type",
                name, event.name
            ),
        }
    }
    event
}

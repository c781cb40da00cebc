//! Event handlers: an event name pattern plus the state changes it triggers.

use super::location::LocationTable;
use super::state_change::StateChange;
use super::EvalContext;
use crate::utils::config::WILDCARD_MARKER;
use crate::utils::error::{InterpreterError, SchemaError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Event name match rule
///
/// `"sched_switch"` matches only that name; `"sched_*"` matches every
/// name starting with `sched_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventPattern {
    Exact(String),
    Prefix(String),
}

impl EventPattern {
    pub fn matches(&self, event_name: &str) -> bool {
        match self {
            EventPattern::Exact(name) => name == event_name,
            EventPattern::Prefix(prefix) => event_name.starts_with(prefix.as_str()),
        }
    }
}

impl From<&str> for EventPattern {
    fn from(pattern: &str) -> Self {
        match pattern.strip_suffix(WILDCARD_MARKER) {
            Some(prefix) => EventPattern::Prefix(prefix.to_string()),
            None => EventPattern::Exact(pattern.to_string()),
        }
    }
}

impl From<String> for EventPattern {
    fn from(pattern: String) -> Self {
        EventPattern::from(pattern.as_str())
    }
}

impl From<EventPattern> for String {
    fn from(pattern: EventPattern) -> Self {
        pattern.to_string()
    }
}

impl fmt::Display for EventPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventPattern::Exact(name) => f.write_str(name),
            EventPattern::Prefix(prefix) => write!(f, "{}{}", prefix, WILDCARD_MARKER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHandler {
    #[serde(rename = "event")]
    pub pattern: EventPattern,

    pub state_changes: Vec<StateChange>,
}

impl EventHandler {
    pub fn new(pattern: impl Into<EventPattern>, state_changes: Vec<StateChange>) -> Self {
        Self {
            pattern: pattern.into(),
            state_changes,
        }
    }

    pub fn matches(&self, event_name: &str) -> bool {
        self.pattern.matches(event_name)
    }

    /// Run every state change in order, collecting failures
    ///
    /// A failing state change is skipped; later ones still run and see
    /// the mutations made by earlier ones.
    pub fn handle(&self, ctx: &mut EvalContext<'_>) -> Vec<(usize, InterpreterError)> {
        self.state_changes
            .iter()
            .enumerate()
            .filter_map(|(index, change)| change.apply(ctx).err().map(|e| (index, e)))
            .collect()
    }

    pub fn validate(&self, locations: &LocationTable) -> Result<(), SchemaError> {
        if let EventPattern::Exact(name) = &self.pattern {
            if name.is_empty() {
                return Err(SchemaError::Invalid(
                    "event handler with empty event name".to_string(),
                ));
            }
        }
        self.state_changes
            .iter()
            .try_for_each(|change| change.validate(locations))
    }
}

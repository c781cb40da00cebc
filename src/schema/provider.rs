//! Event dispatch: runs every matching handler for each incoming event.

use super::handler::EventHandler;
use super::loader::StateSchema;
use super::EvalContext;
use crate::event::TraceEvent;
use crate::store::AttributeStore;
use crate::utils::error::{ErrorKind, InterpreterError};
use log::{debug, info, warn};
use std::collections::BTreeMap;

/// A state change that could not be applied for one event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChangeFailure {
    pub event: String,
    pub timestamp: i64,
    /// Pattern of the handler owning the state change
    pub handler: String,
    /// Position of the state change within its handler
    pub index: usize,
    pub error: InterpreterError,
}

/// Outcome of feeding a whole event sequence
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub events_processed: usize,
    pub events_handled: usize,
    pub failures: Vec<StateChangeFailure>,
}

impl RunReport {
    pub fn failure_counts(&self) -> BTreeMap<ErrorKind, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.failures {
            *counts.entry(failure.error.kind()).or_insert(0) += 1;
        }
        counts
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Get human-readable summary
    pub fn summary(&self) -> String {
        let kinds = self
            .failure_counts()
            .iter()
            .map(|(kind, count)| format!("{}={}", kind, count))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Events: {} | Handled: {} | Failures: {}{}",
            self.events_processed,
            self.events_handled,
            self.failures.len(),
            if kinds.is_empty() {
                String::new()
            } else {
                format!(" ({})", kinds)
            }
        )
    }
}

/// Drives a store from trace events according to a schema
#[derive(Debug, Clone)]
pub struct StateProvider {
    schema: StateSchema,
}

impl StateProvider {
    pub fn new(schema: StateSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &StateSchema {
        &self.schema
    }

    /// Handlers matching an event name, in registration order
    pub fn matching_handlers<'a>(
        &'a self,
        event_name: &'a str,
    ) -> impl Iterator<Item = &'a EventHandler> + 'a {
        self.schema
            .handlers()
            .iter()
            .filter(move |handler| handler.matches(event_name))
    }

    /// Apply one event to the store
    ///
    /// Failures are logged and returned; they never stop the remaining
    /// state changes or handlers.
    pub fn process(
        &self,
        event: &TraceEvent,
        store: &mut dyn AttributeStore,
    ) -> Vec<StateChangeFailure> {
        let mut failures = Vec::new();
        let mut ctx = EvalContext::new(store, self.schema.locations(), event);

        for handler in self.matching_handlers(&event.name) {
            for (index, error) in handler.handle(&mut ctx) {
                warn!(
                    "Event '{}' at {}: handler '{}' state change {} failed: {}",
                    event.name, event.timestamp, handler.pattern, index, error
                );
                failures.push(StateChangeFailure {
                    event: event.name.clone(),
                    timestamp: event.timestamp,
                    handler: handler.pattern.to_string(),
                    index,
                    error,
                });
            }
        }
        failures
    }

    /// Apply a whole event sequence in order
    pub fn run<'e>(
        &self,
        events: impl IntoIterator<Item = &'e TraceEvent>,
        store: &mut dyn AttributeStore,
    ) -> RunReport {
        let mut report = RunReport::default();

        for event in events {
            report.events_processed += 1;
            if self.matching_handlers(&event.name).next().is_none() {
                continue;
            }
            report.events_handled += 1;
            report.failures.extend(self.process(event, store));
        }

        debug!("Run finished: {}", report.summary());
        if !report.is_clean() {
            info!(
                "{} state changes failed over {} events",
                report.failures.len(),
                report.events_processed
            );
        }
        report
    }
}

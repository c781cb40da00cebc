//! Declarative state-change interpreter.
//!
//! A [`StateSchema`] describes, per event name, which attributes of the
//! store change and how. This module handles:
//! - Resolving symbolic attribute paths to quarks
//! - Evaluating conditions and values against the store and the event
//! - Applying mutations (set, increment, push, pop, delete)
//! - Dispatching events to matching handlers

pub mod attribute;
pub mod condition;
pub mod handler;
pub mod loader;
pub mod location;
pub mod provider;
pub mod state_change;
pub mod value;

// Re-export main types
pub use attribute::{describe_path, resolve_path, AttributeLocator};
pub use condition::{Condition, Operand};
pub use handler::{EventHandler, EventPattern};
pub use loader::{load_schema, SchemaDocument, StateSchema};
pub use location::{Location, LocationTable};
pub use provider::{RunReport, StateChangeFailure, StateProvider};
pub use state_change::StateChange;
pub use value::{StackAction, StateValue, ValueSpec};

use crate::event::TraceEvent;
use crate::store::{AttributeStore, Quark};

/// How a path segment is looked up in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveMode {
    /// Mutation targets: missing attributes are created
    Create,
    /// Lookups: missing attributes mean "not present yet"
    Existing,
}

/// Everything an evaluation needs, passed explicitly
pub struct EvalContext<'a> {
    pub store: &'a mut dyn AttributeStore,
    pub locations: &'a LocationTable,
    pub event: &'a TraceEvent,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        store: &'a mut dyn AttributeStore,
        locations: &'a LocationTable,
        event: &'a TraceEvent,
    ) -> Self {
        Self {
            store,
            locations,
            event,
        }
    }

    /// Look up (or create, depending on `mode`) a named child of `root`
    pub fn child(&mut self, root: Quark, name: &str, mode: ResolveMode) -> Option<Quark> {
        match mode {
            ResolveMode::Create => Some(self.store.resolve_or_create(root, name)),
            ResolveMode::Existing => self.store.resolve_existing(root, name),
        }
    }
}

//! Trace State Studio
//!
//! Declarative state-change interpreter: turns a stream of timestamped
//! trace events into mutations of a time-versioned, hierarchically named
//! attribute store, following a schema of event handlers.
//!
//! ## Getting Started
//!
//! ```bash
//! trace-state run --schema schema.json --events events.json --output state.json
//! trace-state --help
//! ```
//!
//! From code:
//!
//! ```ignore
//! let schema = load_schema("schema.json")?;
//! let provider = StateProvider::new(schema);
//! let mut store = InMemoryStateSystem::new();
//! for event in &events {
//!     for failure in provider.process(event, &mut store) {
//!         eprintln!("{:?}", failure);
//!     }
//! }
//! ```

pub mod commands;
pub mod event;
pub mod output;
pub mod schema;
pub mod store;
pub mod utils;
pub mod value;

pub use event::{FieldValue, TraceEvent};
pub use schema::{StateProvider, StateSchema};
pub use store::{AttributeStore, InMemoryStateSystem, Quark, ROOT_QUARK};
pub use value::{TypedValue, ValueType};

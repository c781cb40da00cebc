//! Configuration and constants for the interpreter and CLI.

/// Current state schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Current state dump output version
pub const DUMP_VERSION: &str = "1.0.0";

/// Trailing marker turning an event handler pattern into a prefix match
pub const WILDCARD_MARKER: &str = "*";

/// Event field name that reads the event's reporting source instead of its fields
pub const CPU_FIELD: &str = "cpu";

/// Prefix marking a reference to a schema-level defined value
pub const DEFINED_VALUE_PREFIX: &str = "$";

// Field names for event list lookup (different producers use different names)
pub const EVENT_LIST_FIELDS: &[&str] = &["events", "trace", "records"];

/// Environment variable fallbacks for the CLI
pub const SCHEMA_ENV: &str = "TRACE_STATE_SCHEMA";
pub const EVENTS_ENV: &str = "TRACE_STATE_EVENTS";

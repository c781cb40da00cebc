//! Trace events as seen by the interpreter.
//!
//! An event carries a type name, a timestamp, the identifier of the source
//! that reported it (its CPU) and an ordered list of named fields.

pub mod reader;

pub use reader::{parse_events, read_events};

use crate::value::TypedValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a single event field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i32),
    Long(i64),
    Str(String),
}

impl FieldValue {
    /// Native mapping: string to String, 32-bit to Int, 64-bit to Long
    pub fn to_typed(&self) -> TypedValue {
        match self {
            FieldValue::Int(v) => TypedValue::Int(*v),
            FieldValue::Long(v) => TypedValue::Long(*v),
            FieldValue::Str(v) => TypedValue::String(v.clone()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Long(v) => write!(f, "{}", v),
            FieldValue::Str(v) => f.write_str(v),
        }
    }
}

/// A single timestamped trace event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub name: String,
    pub timestamp: i64,
    /// Reporting source (CPU) identifier, if the trace provides one
    pub source: Option<i32>,
    pub fields: Vec<(String, FieldValue)>,
}

impl TraceEvent {
    pub fn new(name: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            timestamp,
            source: None,
            fields: Vec::new(),
        }
    }

    pub fn with_source(mut self, source: i32) -> Self {
        self.source = Some(source);
        self
    }

    /// Append a field, replacing an existing one with the same name
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Long(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

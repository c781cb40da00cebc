//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use crate::store::Quark;
use thiserror::Error;

/// Errors reported by an attribute store mutation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Timestamp {timestamp} is older than the store's current time {current}")]
    OutOfOrder { timestamp: i64, current: i64 },

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Invalid attribute quark: {0}")]
    InvalidQuark(Quark),
}

/// Category of a per-state-change failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    AttributeNotFound,
    InvalidMutation,
    OutOfOrder,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::AttributeNotFound => "attribute_not_found",
            ErrorKind::InvalidMutation => "invalid_mutation",
            ErrorKind::OutOfOrder => "out_of_order",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while applying a single state change
///
/// None of these abort a run; they are collected per event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterpreterError {
    #[error("Attribute not found: {path}")]
    AttributeNotFound { path: String },

    #[error("Invalid mutation: {0}")]
    InvalidMutation(String),

    #[error("Out of order: event at {timestamp} is older than store time {current}")]
    OutOfOrder { timestamp: i64, current: i64 },
}

impl InterpreterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InterpreterError::AttributeNotFound { .. } => ErrorKind::AttributeNotFound,
            InterpreterError::InvalidMutation(_) => ErrorKind::InvalidMutation,
            InterpreterError::OutOfOrder { .. } => ErrorKind::OutOfOrder,
        }
    }
}

impl From<StoreError> for InterpreterError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::OutOfOrder { timestamp, current } => {
                InterpreterError::OutOfOrder { timestamp, current }
            }
            StoreError::TypeMismatch(msg) => InterpreterError::InvalidMutation(msg),
            StoreError::InvalidQuark(quark) => {
                InterpreterError::InvalidMutation(format!("invalid quark {}", quark))
            }
        }
    }
}

/// Errors in the state schema itself (the configuration error class)
///
/// These are the only errors allowed to stop a run, and they are raised
/// before any event is processed.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid schema: {0}")]
    Invalid(String),

    #[error("Unknown defined value: {0}")]
    UnknownDefinedValue(String),

    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur while reading trace events
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid event format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_maps_to_interpreter_kind() {
        let err: InterpreterError = StoreError::OutOfOrder {
            timestamp: 5,
            current: 10,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::OutOfOrder);

        let err: InterpreterError = StoreError::TypeMismatch("string".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidMutation);
    }
}

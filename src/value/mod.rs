//! Typed state values shared by the attribute store and the interpreter.
//!
//! A `TypedValue` is what an attribute holds at a point in time. Values are
//! built per evaluation and never mutated in place.

use crate::utils::error::InterpreterError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value held by an attribute
///
/// Equality is variant-sensitive: `Int(1)` and `Long(1)` are not equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypedValue {
    #[default]
    Null,
    Int(i32),
    Long(i64),
    String(String),
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            TypedValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            TypedValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Name usable as an attribute path segment, `None` for `Null`
    pub fn to_segment(&self) -> Option<String> {
        match self {
            TypedValue::Null => None,
            TypedValue::Int(v) => Some(v.to_string()),
            TypedValue::Long(v) => Some(v.to_string()),
            TypedValue::String(v) => Some(v.clone()),
        }
    }

    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            TypedValue::Null => None,
            TypedValue::Int(_) => Some(ValueType::Int),
            TypedValue::Long(_) => Some(ValueType::Long),
            TypedValue::String(_) => Some(ValueType::String),
        }
    }

    /// Convert to the requested type
    ///
    /// Strings are parsed as decimal, Long narrows to Int by truncation and
    /// numbers render as decimal strings. `Null` stays `Null`.
    pub fn coerce(self, target: ValueType) -> Result<TypedValue, InterpreterError> {
        let coerced = match (self, target) {
            (TypedValue::Null, _) => TypedValue::Null,
            (TypedValue::Int(v), ValueType::Int) => TypedValue::Int(v),
            (TypedValue::Int(v), ValueType::Long) => TypedValue::Long(i64::from(v)),
            (TypedValue::Int(v), ValueType::String) => TypedValue::String(v.to_string()),
            (TypedValue::Long(v), ValueType::Int) => TypedValue::Int(v as i32),
            (TypedValue::Long(v), ValueType::Long) => TypedValue::Long(v),
            (TypedValue::Long(v), ValueType::String) => TypedValue::String(v.to_string()),
            (TypedValue::String(s), ValueType::Int) => {
                TypedValue::Int(s.trim().parse::<i32>().map_err(|e| {
                    InterpreterError::InvalidMutation(format!("cannot force '{}' to int: {}", s, e))
                })?)
            }
            (TypedValue::String(s), ValueType::Long) => {
                TypedValue::Long(s.trim().parse::<i64>().map_err(|e| {
                    InterpreterError::InvalidMutation(format!(
                        "cannot force '{}' to long: {}",
                        s, e
                    ))
                })?)
            }
            (TypedValue::String(s), ValueType::String) => TypedValue::String(s),
        };
        Ok(coerced)
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Null => f.write_str("null"),
            TypedValue::Int(v) => write!(f, "{}", v),
            TypedValue::Long(v) => write!(f, "{}L", v),
            TypedValue::String(v) => write!(f, "\"{}\"", v),
        }
    }
}

impl From<i32> for TypedValue {
    fn from(v: i32) -> Self {
        TypedValue::Int(v)
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        TypedValue::Long(v)
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        TypedValue::String(v.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(v: String) -> Self {
        TypedValue::String(v)
    }
}

/// Forced type applied to a value read from an event field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Int,
    Long,
    String,
}

//! Value specifications: what gets written to an attribute.
//!
//! A [`StateValue`] pairs a value source with two modifiers:
//! - `increment`: add the value to the target's ongoing Int instead of overwriting it
//! - `stack`: push, pop or peek the target's stack instead of a plain set

use super::attribute::{describe_path, resolve_path, validate_path, AttributeLocator};
use super::location::LocationTable;
use super::{EvalContext, ResolveMode};
use crate::event::TraceEvent;
use crate::store::ROOT_QUARK;
use crate::utils::config::CPU_FIELD;
use crate::utils::error::{InterpreterError, SchemaError};
use crate::value::{TypedValue, ValueType};
use log::debug;
use serde::{Deserialize, Serialize};

/// Where a value comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueSpec {
    Literal {
        value: TypedValue,
    },
    EventField {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        forced_type: Option<ValueType>,
    },
    /// Ongoing value found at another attribute path
    Query {
        path: Vec<AttributeLocator>,
    },
    EventName,
    /// Removes the target attribute and its subtree
    Delete,
}

/// Stack behaviour of a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackAction {
    #[default]
    None,
    Push,
    Pop,
    Peek,
}

/// A value source plus its increment and stack modifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateValue {
    pub value: ValueSpec,

    #[serde(default)]
    pub increment: bool,

    #[serde(default)]
    pub stack: StackAction,
}

impl StateValue {
    pub fn new(value: ValueSpec) -> Self {
        Self {
            value,
            increment: false,
            stack: StackAction::None,
        }
    }

    pub fn literal(value: impl Into<TypedValue>) -> Self {
        Self::new(ValueSpec::Literal {
            value: value.into(),
        })
    }

    pub fn null() -> Self {
        Self::new(ValueSpec::Literal {
            value: TypedValue::Null,
        })
    }

    pub fn event_field(name: impl Into<String>) -> Self {
        Self::new(ValueSpec::EventField {
            name: name.into(),
            forced_type: None,
        })
    }

    pub fn event_field_as(name: impl Into<String>, forced_type: ValueType) -> Self {
        Self::new(ValueSpec::EventField {
            name: name.into(),
            forced_type: Some(forced_type),
        })
    }

    pub fn query(path: Vec<AttributeLocator>) -> Self {
        Self::new(ValueSpec::Query { path })
    }

    pub fn event_name() -> Self {
        Self::new(ValueSpec::EventName)
    }

    pub fn delete() -> Self {
        Self::new(ValueSpec::Delete)
    }

    pub fn incremented(mut self) -> Self {
        self.increment = true;
        self
    }

    pub fn with_stack(mut self, action: StackAction) -> Self {
        self.stack = action;
        self
    }

    pub fn is_delete(&self) -> bool {
        matches!(self.value, ValueSpec::Delete)
    }

    /// Compute the value for the current event
    ///
    /// Missing event fields and unresolved queries give `Null`. A failed
    /// forced-type conversion is an `InvalidMutation`.
    pub fn evaluate(&self, ctx: &mut EvalContext<'_>) -> Result<TypedValue, InterpreterError> {
        match &self.value {
            ValueSpec::Literal { value } => Ok(value.clone()),

            ValueSpec::EventField { name, forced_type } => {
                let value = read_event_field(ctx.event, name);
                match forced_type {
                    Some(target) => value.coerce(*target),
                    None => Ok(value),
                }
            }

            ValueSpec::Query { path } => {
                match resolve_path(path, ROOT_QUARK, ResolveMode::Existing, ctx) {
                    Some(quark) => Ok(ctx.store.ongoing_value(quark)),
                    None => {
                        debug!("Query path {} not present yet", describe_path(path));
                        Ok(TypedValue::Null)
                    }
                }
            }

            ValueSpec::EventName => Ok(TypedValue::String(ctx.event.name.clone())),

            ValueSpec::Delete => Ok(TypedValue::Null),
        }
    }

    /// Delta to add when the increment modifier is set
    pub fn increment_delta(&self, ctx: &mut EvalContext<'_>) -> Result<i32, InterpreterError> {
        match &self.value {
            ValueSpec::Literal { value } => value.as_int().ok_or_else(|| {
                InterpreterError::InvalidMutation(format!(
                    "increment literal must be an int, got {}",
                    value
                ))
            }),
            ValueSpec::EventField { name, .. } => match self.evaluate(ctx)? {
                TypedValue::Int(v) => Ok(v),
                // Narrowing, as for a forced Long to Int conversion
                TypedValue::Long(v) => Ok(v as i32),
                other => Err(InterpreterError::InvalidMutation(format!(
                    "increment field '{}' must be numeric, got {}",
                    name, other
                ))),
            },
            other => Err(InterpreterError::InvalidMutation(format!(
                "increment is not supported for {:?}",
                other
            ))),
        }
    }

    pub fn validate(&self, locations: &LocationTable) -> Result<(), SchemaError> {
        if self.increment
            && !matches!(
                self.value,
                ValueSpec::Literal { .. } | ValueSpec::EventField { .. }
            )
        {
            return Err(SchemaError::Invalid(
                "increment is only valid on literal or event field values".to_string(),
            ));
        }

        if self.stack != StackAction::None
            && matches!(self.value, ValueSpec::EventName | ValueSpec::Delete)
        {
            return Err(SchemaError::Invalid(
                "stack actions are only valid on literal, event field or query values"
                    .to_string(),
            ));
        }

        if self.increment && self.stack != StackAction::None {
            return Err(SchemaError::Invalid(
                "a value cannot both increment and use the stack".to_string(),
            ));
        }

        match &self.value {
            ValueSpec::Literal { value } if self.increment && value.as_int().is_none() => Err(
                SchemaError::Invalid(format!("increment literal must be an int, got {}", value)),
            ),
            ValueSpec::EventField { name, .. } if name.is_empty() => Err(SchemaError::Invalid(
                "event field value with empty name".to_string(),
            )),
            ValueSpec::Query { path } if path.is_empty() => {
                Err(SchemaError::Invalid("query value with empty path".to_string()))
            }
            ValueSpec::Query { path } => validate_path(path, locations),
            _ => Ok(()),
        }
    }
}

/// Typed value of an event field, `Null` when absent
pub fn read_event_field(event: &TraceEvent, name: &str) -> TypedValue {
    if name == CPU_FIELD {
        return event.source.map(TypedValue::Int).unwrap_or_default();
    }
    event
        .field(name)
        .map(|field| field.to_typed())
        .unwrap_or_default()
}

//! Boolean condition trees evaluated against the store and the current event.

use super::attribute::{describe_path, resolve_path, validate_path, AttributeLocator};
use super::location::LocationTable;
use super::value::{StateValue, ValueSpec};
use super::{EvalContext, ResolveMode};
use crate::store::ROOT_QUARK;
use crate::utils::error::SchemaError;
use crate::value::TypedValue;
use log::debug;
use serde::{Deserialize, Serialize};

/// Left-hand side of a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    /// Ongoing value of an existing attribute
    Attribute(Vec<AttributeLocator>),
    /// Value computed directly from the event
    Value(StateValue),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Leaf {
        operand: Operand,
        expected: StateValue,
    },
    Not {
        condition: Box<Condition>,
    },
    And {
        conditions: Vec<Condition>,
    },
    Or {
        conditions: Vec<Condition>,
    },
}

impl Condition {
    /// Compare the ongoing value at `path` with `expected`
    pub fn attribute_equals(path: Vec<AttributeLocator>, expected: StateValue) -> Self {
        Condition::Leaf {
            operand: Operand::Attribute(path),
            expected,
        }
    }

    /// Compare a value computed from the event with `expected`
    pub fn value_equals(operand: StateValue, expected: StateValue) -> Self {
        Condition::Leaf {
            operand: Operand::Value(operand),
            expected,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(condition: Condition) -> Self {
        Condition::Not {
            condition: Box::new(condition),
        }
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Condition::And { conditions }
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Condition::Or { conditions }
    }

    /// Evaluate the condition
    ///
    /// Unresolved paths and failed evaluations make a leaf `false`. `And`
    /// and `Or` evaluate every child, they never short-circuit.
    pub fn test(&self, ctx: &mut EvalContext<'_>) -> bool {
        match self {
            Condition::Leaf { operand, expected } => test_leaf(operand, expected, ctx),
            Condition::Not { condition } => !condition.test(ctx),
            Condition::And { conditions } => conditions
                .iter()
                .fold(true, |acc, condition| condition.test(ctx) & acc),
            Condition::Or { conditions } => conditions
                .iter()
                .fold(false, |acc, condition| condition.test(ctx) | acc),
        }
    }

    pub fn validate(&self, locations: &LocationTable) -> Result<(), SchemaError> {
        match self {
            Condition::Leaf { operand, expected } => {
                match operand {
                    Operand::Attribute(path) => {
                        if path.is_empty() {
                            return Err(SchemaError::Invalid(
                                "condition with empty attribute path".to_string(),
                            ));
                        }
                        validate_path(path, locations)?;
                    }
                    Operand::Value(value) => {
                        if value.is_delete() {
                            return Err(SchemaError::Invalid(
                                "delete cannot be compared in a condition".to_string(),
                            ));
                        }
                        value.validate(locations)?;
                    }
                }
                if matches!(expected.value, ValueSpec::Delete) {
                    return Err(SchemaError::Invalid(
                        "delete cannot be an expected value".to_string(),
                    ));
                }
                expected.validate(locations)
            }
            Condition::Not { condition } => condition.validate(locations),
            Condition::And { conditions } | Condition::Or { conditions } => {
                if conditions.is_empty() {
                    return Err(SchemaError::Invalid(
                        "logical operator without operands".to_string(),
                    ));
                }
                conditions.iter().try_for_each(|c| c.validate(locations))
            }
        }
    }
}

fn test_leaf(operand: &Operand, expected: &StateValue, ctx: &mut EvalContext<'_>) -> bool {
    let actual = match operand {
        Operand::Attribute(path) => {
            match resolve_path(path, ROOT_QUARK, ResolveMode::Existing, ctx) {
                Some(quark) => ctx.store.ongoing_value(quark),
                None => {
                    debug!("Condition path {} not present yet", describe_path(path));
                    return false;
                }
            }
        }
        Operand::Value(value) => match value.evaluate(ctx) {
            Ok(v) => v,
            Err(e) => {
                debug!("Condition operand evaluation failed: {}", e);
                return false;
            }
        },
    };

    let expected: TypedValue = match expected.evaluate(ctx) {
        Ok(v) => v,
        Err(e) => {
            debug!("Condition expected value evaluation failed: {}", e);
            return false;
        }
    };

    actual == expected
}

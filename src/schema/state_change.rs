//! State change executor.
//!
//! An assignment resolves its target path (creating attributes as needed)
//! and applies one mutation at the event's timestamp. A conditional picks
//! its `then` or `else` branch and applies it; branches carry their own
//! targets.

use super::attribute::{describe_path, resolve_path, validate_path, AttributeLocator};
use super::condition::Condition;
use super::location::LocationTable;
use super::value::{StackAction, StateValue, ValueSpec};
use super::{EvalContext, ResolveMode};
use crate::store::ROOT_QUARK;
use crate::utils::error::{InterpreterError, SchemaError};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateChange {
    Assign {
        path: Vec<AttributeLocator>,
        value: StateValue,
    },
    Conditional {
        condition: Condition,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        then: Option<Box<StateChange>>,
        #[serde(default, rename = "else", skip_serializing_if = "Option::is_none")]
        otherwise: Option<Box<StateChange>>,
    },
}

impl StateChange {
    pub fn assign(path: Vec<AttributeLocator>, value: StateValue) -> Self {
        StateChange::Assign { path, value }
    }

    pub fn conditional(
        condition: Condition,
        then: Option<StateChange>,
        otherwise: Option<StateChange>,
    ) -> Self {
        StateChange::Conditional {
            condition,
            then: then.map(Box::new),
            otherwise: otherwise.map(Box::new),
        }
    }

    /// Apply this state change for the event held by `ctx`
    pub fn apply(&self, ctx: &mut EvalContext<'_>) -> Result<(), InterpreterError> {
        match self {
            StateChange::Assign { path, value } => apply_assignment(path, value, ctx),
            StateChange::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let branch = if condition.test(ctx) { then } else { otherwise };
                match branch {
                    Some(change) => change.apply(ctx),
                    None => Ok(()),
                }
            }
        }
    }

    pub fn validate(&self, locations: &LocationTable) -> Result<(), SchemaError> {
        match self {
            StateChange::Assign { path, value } => {
                if path.is_empty() {
                    return Err(SchemaError::Invalid(
                        "state change with empty target path".to_string(),
                    ));
                }
                validate_path(path, locations)?;
                value.validate(locations)
            }
            StateChange::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if then.is_none() && otherwise.is_none() {
                    return Err(SchemaError::Invalid(
                        "conditional state change without then or else".to_string(),
                    ));
                }
                condition.validate(locations)?;
                if let Some(change) = then {
                    change.validate(locations)?;
                }
                if let Some(change) = otherwise {
                    change.validate(locations)?;
                }
                Ok(())
            }
        }
    }
}

fn apply_assignment(
    path: &[AttributeLocator],
    value: &StateValue,
    ctx: &mut EvalContext<'_>,
) -> Result<(), InterpreterError> {
    let quark = resolve_path(path, ROOT_QUARK, ResolveMode::Create, ctx).ok_or_else(|| {
        InterpreterError::AttributeNotFound {
            path: describe_path(path),
        }
    })?;
    let timestamp = ctx.event.timestamp;

    if let ValueSpec::Delete = value.value {
        debug!("Removing {} at {}", ctx.store.attribute_path(quark), timestamp);
        ctx.store.remove_subtree(quark, timestamp)?;
        return Ok(());
    }

    if value.increment {
        let delta = value.increment_delta(ctx)?;
        ctx.store.increment(quark, timestamp, delta)?;
        return Ok(());
    }

    let computed = value.evaluate(ctx)?;
    match value.stack {
        StackAction::None => ctx.store.set(quark, timestamp, computed)?,
        StackAction::Push => ctx.store.push(quark, timestamp, computed)?,
        StackAction::Pop => {
            ctx.store.pop(quark, timestamp)?;
        }
        StackAction::Peek => {
            debug!(
                "Peek at {}: {}",
                ctx.store.attribute_path(quark),
                computed
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TraceEvent;
    use crate::store::{AttributeStore, InMemoryStateSystem};
    use crate::value::TypedValue;

    fn path(names: &[&str]) -> Vec<AttributeLocator> {
        names.iter().map(|n| AttributeLocator::constant(*n)).collect()
    }

    #[test]
    fn test_set_literal() {
        let mut ss = InMemoryStateSystem::new();
        let locations = LocationTable::new();
        let event = TraceEvent::new("e", 10);
        let mut ctx = EvalContext::new(&mut ss, &locations, &event);

        StateChange::assign(path(&["A", "B"]), StateValue::literal(4))
            .apply(&mut ctx)
            .unwrap();

        assert_eq!(ss.ongoing_at_path(&["A", "B"]), TypedValue::Int(4));
    }

    #[test]
    fn test_missing_field_target_is_attribute_not_found() {
        let mut ss = InMemoryStateSystem::new();
        let locations = LocationTable::new();
        let event = TraceEvent::new("e", 10);
        let mut ctx = EvalContext::new(&mut ss, &locations, &event);

        let change = StateChange::assign(
            vec![
                AttributeLocator::constant("Threads"),
                AttributeLocator::event_field("tid"),
            ],
            StateValue::literal(1),
        );
        let err = change.apply(&mut ctx).unwrap_err();
        assert!(matches!(err, InterpreterError::AttributeNotFound { .. }));
    }

    #[test]
    fn test_delete_subtree() {
        let mut ss = InMemoryStateSystem::new();
        let locations = LocationTable::new();
        let first = TraceEvent::new("e", 1);
        let second = TraceEvent::new("e", 2);

        let mut ctx = EvalContext::new(&mut ss, &locations, &first);
        StateChange::assign(path(&["T", "1", "Status"]), StateValue::literal(1))
            .apply(&mut ctx)
            .unwrap();

        let mut ctx = EvalContext::new(&mut ss, &locations, &second);
        StateChange::assign(path(&["T", "1"]), StateValue::delete())
            .apply(&mut ctx)
            .unwrap();

        assert_eq!(ss.ongoing_at_path(&["T", "1", "Status"]), TypedValue::Null);
    }

    #[test]
    fn test_peek_leaves_store_untouched() {
        let mut ss = InMemoryStateSystem::new();
        let q = ss.resolve_or_create(ROOT_QUARK, "S");
        ss.push(q, 1, TypedValue::Int(9)).unwrap();

        let locations = LocationTable::new();
        let event = TraceEvent::new("e", 5);
        let mut ctx = EvalContext::new(&mut ss, &locations, &event);
        StateChange::assign(
            path(&["S"]),
            StateValue::query(path(&["S"])).with_stack(StackAction::Peek),
        )
        .apply(&mut ctx)
        .unwrap();

        assert_eq!(ss.stack_depth(q), 1);
        assert_eq!(ss.ongoing_since(q), Some(1));
    }

    #[test]
    fn test_validate_conditional_without_branches() {
        let locations = LocationTable::new();
        let change = StateChange::conditional(
            Condition::value_equals(StateValue::event_name(), StateValue::literal("x")),
            None,
            None,
        );
        assert!(change.validate(&locations).is_err());
    }
}

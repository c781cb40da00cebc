//! Attribute path segments and their resolution to quarks.
//!
//! A path is a list of locators resolved left to right, each step using the
//! previous quark as its root. Resolution never raises: a segment that
//! cannot be resolved yields `None` and the caller decides if that matters.

use super::location::LocationTable;
use super::{EvalContext, ResolveMode};
use crate::store::{Quark, ROOT_QUARK};
use crate::utils::config::CPU_FIELD;
use crate::utils::error::SchemaError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One segment of a symbolic attribute path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeLocator {
    /// Fixed attribute name
    Constant { name: String },

    /// Name taken from an event field (`cpu` reads the event's source)
    EventField { name: String },

    /// Name taken from the ongoing value found at another path
    Query { path: Vec<AttributeLocator> },

    /// Expansion of a named location
    Location { name: String },
}

impl AttributeLocator {
    pub fn constant(name: impl Into<String>) -> Self {
        AttributeLocator::Constant { name: name.into() }
    }

    pub fn event_field(name: impl Into<String>) -> Self {
        AttributeLocator::EventField { name: name.into() }
    }

    pub fn query(path: Vec<AttributeLocator>) -> Self {
        AttributeLocator::Query { path }
    }

    pub fn location(name: impl Into<String>) -> Self {
        AttributeLocator::Location { name: name.into() }
    }

    /// Resolve this segment under `root`
    pub fn resolve(
        &self,
        root: Quark,
        mode: ResolveMode,
        ctx: &mut EvalContext<'_>,
    ) -> Option<Quark> {
        match self {
            AttributeLocator::Constant { name } => ctx.child(root, name, mode),

            AttributeLocator::EventField { name } => {
                let event = ctx.event;
                let segment = if name == CPU_FIELD {
                    event.source?.to_string()
                } else {
                    match event.field(name) {
                        Some(value) => value.to_string(),
                        None => {
                            debug!("Event '{}' has no field '{}'", event.name, name);
                            return None;
                        }
                    }
                };
                ctx.child(root, &segment, mode)
            }

            AttributeLocator::Query { path } => {
                let target = resolve_path(path, ROOT_QUARK, ResolveMode::Existing, ctx)?;
                let segment = ctx.store.ongoing_value(target).to_segment()?;
                ctx.child(root, &segment, mode)
            }

            AttributeLocator::Location { name } => {
                let locations = ctx.locations;
                let Some(location) = locations.get(name) else {
                    debug!("Unknown location '{}'", name);
                    return None;
                };
                resolve_path(&location.path, root, mode, ctx)
            }
        }
    }

    /// Check that every referenced location exists
    pub fn validate(&self, locations: &LocationTable) -> Result<(), SchemaError> {
        match self {
            AttributeLocator::Constant { name } | AttributeLocator::EventField { name } => {
                if name.is_empty() {
                    return Err(SchemaError::Invalid(
                        "attribute segment with empty name".to_string(),
                    ));
                }
                Ok(())
            }
            AttributeLocator::Query { path } => {
                if path.is_empty() {
                    return Err(SchemaError::Invalid("query with empty path".to_string()));
                }
                validate_path(path, locations)
            }
            AttributeLocator::Location { name } => {
                if locations.get(name).is_none() {
                    return Err(SchemaError::UnknownLocation(name.clone()));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for AttributeLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeLocator::Constant { name } => f.write_str(name),
            AttributeLocator::EventField { name } => write!(f, "{{field:{}}}", name),
            AttributeLocator::Query { path } => write!(f, "{{query:{}}}", describe_path(path)),
            AttributeLocator::Location { name } => write!(f, "{{location:{}}}", name),
        }
    }
}

/// Resolve a full path starting at `root`
pub fn resolve_path(
    path: &[AttributeLocator],
    root: Quark,
    mode: ResolveMode,
    ctx: &mut EvalContext<'_>,
) -> Option<Quark> {
    path.iter()
        .try_fold(root, |quark, locator| locator.resolve(quark, mode, ctx))
}

/// Render a symbolic path for logs and errors
pub fn describe_path(path: &[AttributeLocator]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}

pub fn validate_path(
    path: &[AttributeLocator],
    locations: &LocationTable,
) -> Result<(), SchemaError> {
    path.iter().try_for_each(|locator| locator.validate(locations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TraceEvent;
    use crate::schema::location::Location;
    use crate::store::{AttributeStore, InMemoryStateSystem};
    use crate::value::TypedValue;

    fn current_thread_locations() -> LocationTable {
        let mut locations = LocationTable::new();
        locations.insert(Location::new(
            "CurrentThread",
            vec![
                AttributeLocator::constant("Threads"),
                AttributeLocator::query(vec![
                    AttributeLocator::constant("CPUs"),
                    AttributeLocator::event_field("cpu"),
                    AttributeLocator::constant("Current_thread"),
                ]),
            ],
        ));
        locations
    }

    #[test]
    fn test_constant_resolve_or_create() {
        let mut ss = InMemoryStateSystem::new();
        let locations = LocationTable::new();
        let event = TraceEvent::new("e", 1);
        let mut ctx = EvalContext::new(&mut ss, &locations, &event);

        let path = vec![
            AttributeLocator::constant("Threads"),
            AttributeLocator::constant("1"),
        ];
        let first = resolve_path(&path, ROOT_QUARK, ResolveMode::Create, &mut ctx);
        let second = resolve_path(&path, ROOT_QUARK, ResolveMode::Create, &mut ctx);

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_existing_mode_does_not_create() {
        let mut ss = InMemoryStateSystem::new();
        let locations = LocationTable::new();
        let event = TraceEvent::new("e", 1);
        let mut ctx = EvalContext::new(&mut ss, &locations, &event);

        let path = vec![AttributeLocator::constant("Threads")];
        assert_eq!(
            resolve_path(&path, ROOT_QUARK, ResolveMode::Existing, &mut ctx),
            None
        );
        assert!(ss.tree().is_empty());
    }

    #[test]
    fn test_event_field_segments() {
        let mut ss = InMemoryStateSystem::new();
        let locations = LocationTable::new();
        let event = TraceEvent::new("sched_switch", 1)
            .with_source(3)
            .with_field("next_tid", 42i64);
        let mut ctx = EvalContext::new(&mut ss, &locations, &event);

        let path = vec![
            AttributeLocator::constant("CPUs"),
            AttributeLocator::event_field("cpu"),
        ];
        let cpu = resolve_path(&path, ROOT_QUARK, ResolveMode::Create, &mut ctx).unwrap();

        let tid = AttributeLocator::event_field("next_tid")
            .resolve(ROOT_QUARK, ResolveMode::Create, &mut ctx)
            .unwrap();
        let missing =
            AttributeLocator::event_field("prev_tid").resolve(ROOT_QUARK, ResolveMode::Create, &mut ctx);

        assert_eq!(ss.attribute_path(cpu), "CPUs/3");
        assert_eq!(ss.attribute_path(tid), "42");
        assert_eq!(missing, None);
    }

    #[test]
    fn test_query_and_location_indirection() {
        let mut ss = InMemoryStateSystem::new();
        let cpus = ss.resolve_or_create(ROOT_QUARK, "CPUs");
        let cpu0 = ss.resolve_or_create(cpus, "0");
        let current = ss.resolve_or_create(cpu0, "Current_thread");
        ss.set(current, 1, TypedValue::Int(42)).unwrap();

        let locations = current_thread_locations();
        let event = TraceEvent::new("e", 2).with_source(0);
        let mut ctx = EvalContext::new(&mut ss, &locations, &event);

        let path = vec![
            AttributeLocator::location("CurrentThread"),
            AttributeLocator::constant("Status"),
        ];
        let status = resolve_path(&path, ROOT_QUARK, ResolveMode::Create, &mut ctx).unwrap();
        assert_eq!(ss.attribute_path(status), "Threads/42/Status");
    }

    #[test]
    fn test_query_on_null_fails() {
        let mut ss = InMemoryStateSystem::new();
        let cpus = ss.resolve_or_create(ROOT_QUARK, "CPUs");
        let cpu0 = ss.resolve_or_create(cpus, "0");
        ss.resolve_or_create(cpu0, "Current_thread");

        let locations = current_thread_locations();
        let event = TraceEvent::new("e", 2).with_source(0);
        let mut ctx = EvalContext::new(&mut ss, &locations, &event);

        let path = vec![AttributeLocator::location("CurrentThread")];
        assert_eq!(
            resolve_path(&path, ROOT_QUARK, ResolveMode::Create, &mut ctx),
            None
        );
        assert!(ss.tree().get(ROOT_QUARK, "Threads").is_some());
    }

    #[test]
    fn test_describe_path() {
        let path = vec![
            AttributeLocator::constant("Threads"),
            AttributeLocator::event_field("tid"),
            AttributeLocator::location("Current"),
        ];
        assert_eq!(describe_path(&path), "Threads/{field:tid}/{location:Current}");
    }

    #[test]
    fn test_validate_unknown_location() {
        let locations = LocationTable::new();
        let err = AttributeLocator::location("Nowhere")
            .validate(&locations)
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownLocation(name) if name == "Nowhere"));
    }
}

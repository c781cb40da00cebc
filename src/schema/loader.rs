//! Schema loading and validation.
//!
//! A schema document is read from JSON, defined values (`$NAME`) are
//! substituted, and the result is validated once. Everything that can go
//! wrong with the schema itself is reported here, before any event is
//! processed.
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "defined_values": { "RUNNING": { "int": 2 } },
//!   "locations": [ { "name": "CurrentThread", "path": [...] } ],
//!   "handlers": [ { "event": "sched_switch", "state_changes": [...] } ]
//! }
//! ```

use super::attribute::AttributeLocator;
use super::condition::{Condition, Operand};
use super::handler::EventHandler;
use super::location::{Location, LocationTable};
use super::state_change::StateChange;
use super::value::{StateValue, ValueSpec};
use crate::utils::config::{DEFINED_VALUE_PREFIX, SCHEMA_VERSION};
use crate::utils::error::SchemaError;
use crate::value::TypedValue;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Schema as written on disk, before substitution and validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub defined_values: BTreeMap<String, TypedValue>,

    #[serde(default)]
    pub locations: Vec<Location>,

    #[serde(default)]
    pub handlers: Vec<EventHandler>,
}

/// Validated, immutable state schema
#[derive(Debug, Clone)]
pub struct StateSchema {
    handlers: Vec<EventHandler>,
    locations: LocationTable,
}

impl StateSchema {
    /// Validate handlers and locations into a schema
    pub fn new(handlers: Vec<EventHandler>, locations: LocationTable) -> Result<Self, SchemaError> {
        locations.validate()?;
        for handler in &handlers {
            handler.validate(&locations).map_err(|e| match e {
                SchemaError::Invalid(msg) => {
                    SchemaError::Invalid(format!("handler '{}': {}", handler.pattern, msg))
                }
                other => other,
            })?;
        }
        Ok(Self {
            handlers,
            locations,
        })
    }

    /// Substitute defined values, then validate
    pub fn from_document(document: SchemaDocument) -> Result<Self, SchemaError> {
        if let Some(version) = &document.version {
            if version != SCHEMA_VERSION {
                warn!(
                    "Schema version {} differs from supported version {}",
                    version, SCHEMA_VERSION
                );
            }
        }

        let defined = document.defined_values;
        let mut locations = document.locations;
        let mut handlers = document.handlers;

        for location in &mut locations {
            substitute_path(&mut location.path, &defined)?;
        }
        for handler in &mut handlers {
            for change in &mut handler.state_changes {
                substitute_change(change, &defined)?;
            }
        }

        Self::new(handlers, locations.into_iter().collect())
    }

    pub fn from_json_str(json: &str) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    pub fn handlers(&self) -> &[EventHandler] {
        &self.handlers
    }

    pub fn locations(&self) -> &LocationTable {
        &self.locations
    }

    /// Total number of top-level state changes across handlers
    pub fn state_change_count(&self) -> usize {
        self.handlers.iter().map(|h| h.state_changes.len()).sum()
    }
}

/// Load and validate a schema from a JSON file
pub fn load_schema(path: impl AsRef<Path>) -> Result<StateSchema, SchemaError> {
    let path = path.as_ref();
    debug!("Loading schema from: {}", path.display());

    let file = File::open(path)?;
    let document: SchemaDocument = serde_json::from_reader(BufReader::new(file))?;
    let schema = StateSchema::from_document(document)?;

    info!(
        "Schema loaded: {} handlers, {} locations",
        schema.handlers.len(),
        schema.locations.len()
    );
    Ok(schema)
}

fn defined_name(text: &str) -> Option<&str> {
    text.strip_prefix(DEFINED_VALUE_PREFIX)
}

fn lookup<'a>(
    name: &str,
    defined: &'a BTreeMap<String, TypedValue>,
) -> Result<&'a TypedValue, SchemaError> {
    defined
        .get(name)
        .ok_or_else(|| SchemaError::UnknownDefinedValue(name.to_string()))
}

fn substitute_path(
    path: &mut [AttributeLocator],
    defined: &BTreeMap<String, TypedValue>,
) -> Result<(), SchemaError> {
    for locator in path {
        match locator {
            AttributeLocator::Constant { name } => {
                if let Some(key) = defined_name(name) {
                    let value = lookup(key, defined)?;
                    *name = value.to_segment().ok_or_else(|| {
                        SchemaError::Invalid(format!(
                            "defined value '{}' is null and cannot name an attribute",
                            key
                        ))
                    })?;
                }
            }
            AttributeLocator::Query { path } => substitute_path(path, defined)?,
            AttributeLocator::EventField { .. } | AttributeLocator::Location { .. } => {}
        }
    }
    Ok(())
}

fn substitute_value(
    value: &mut StateValue,
    defined: &BTreeMap<String, TypedValue>,
) -> Result<(), SchemaError> {
    match &mut value.value {
        ValueSpec::Literal { value: literal } => {
            if let TypedValue::String(text) = literal {
                if let Some(key) = defined_name(text) {
                    *literal = lookup(key, defined)?.clone();
                }
            }
            Ok(())
        }
        ValueSpec::Query { path } => substitute_path(path, defined),
        ValueSpec::EventField { .. } | ValueSpec::EventName | ValueSpec::Delete => Ok(()),
    }
}

fn substitute_condition(
    condition: &mut Condition,
    defined: &BTreeMap<String, TypedValue>,
) -> Result<(), SchemaError> {
    match condition {
        Condition::Leaf { operand, expected } => {
            match operand {
                Operand::Attribute(path) => substitute_path(path, defined)?,
                Operand::Value(value) => substitute_value(value, defined)?,
            }
            substitute_value(expected, defined)
        }
        Condition::Not { condition } => substitute_condition(condition, defined),
        Condition::And { conditions } | Condition::Or { conditions } => conditions
            .iter_mut()
            .try_for_each(|c| substitute_condition(c, defined)),
    }
}

fn substitute_change(
    change: &mut StateChange,
    defined: &BTreeMap<String, TypedValue>,
) -> Result<(), SchemaError> {
    match change {
        StateChange::Assign { path, value } => {
            substitute_path(path, defined)?;
            substitute_value(value, defined)
        }
        StateChange::Conditional {
            condition,
            then,
            otherwise,
        } => {
            substitute_condition(condition, defined)?;
            if let Some(branch) = then {
                substitute_change(branch, defined)?;
            }
            if let Some(branch) = otherwise {
                substitute_change(branch, defined)?;
            }
            Ok(())
        }
    }
}

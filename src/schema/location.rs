//! Named location aliases.
//!
//! A location is a reusable attribute path ("CurrentThread") expanded in
//! place wherever a `Location` locator names it. Locations are resolved at
//! lookup time, never cached.

use super::attribute::{validate_path, AttributeLocator};
use crate::utils::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub path: Vec<AttributeLocator>,
}

impl Location {
    pub fn new(name: impl Into<String>, path: Vec<AttributeLocator>) -> Self {
        Self {
            name: name.into(),
            path,
        }
    }
}

/// Location name to location
#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    locations: HashMap<String, Location>,
}

impl LocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a location, returning the one it replaced
    pub fn insert(&mut self, location: Location) -> Option<Location> {
        self.locations.insert(location.name.clone(), location)
    }

    pub fn get(&self, name: &str) -> Option<&Location> {
        self.locations.get(name)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    /// Check every location path and reject self-referencing aliases
    pub fn validate(&self) -> Result<(), SchemaError> {
        for location in self.locations.values() {
            if location.path.is_empty() {
                return Err(SchemaError::Invalid(format!(
                    "location '{}' has an empty path",
                    location.name
                )));
            }
            validate_path(&location.path, self)?;
        }

        for name in self.locations.keys() {
            let mut visiting = HashSet::new();
            self.check_cycle(name, &mut visiting)?;
        }
        Ok(())
    }

    fn check_cycle<'a>(
        &'a self,
        name: &'a str,
        visiting: &mut HashSet<&'a str>,
    ) -> Result<(), SchemaError> {
        if !visiting.insert(name) {
            return Err(SchemaError::Invalid(format!(
                "location '{}' refers to itself",
                name
            )));
        }
        if let Some(location) = self.locations.get(name) {
            let mut referenced = Vec::new();
            collect_location_refs(&location.path, &mut referenced);
            for next in referenced {
                self.check_cycle(next, visiting)?;
            }
        }
        visiting.remove(name);
        Ok(())
    }
}

impl FromIterator<Location> for LocationTable {
    fn from_iter<I: IntoIterator<Item = Location>>(iter: I) -> Self {
        let mut table = LocationTable::new();
        for location in iter {
            table.insert(location);
        }
        table
    }
}

fn collect_location_refs<'a>(path: &'a [AttributeLocator], out: &mut Vec<&'a str>) {
    for locator in path {
        match locator {
            AttributeLocator::Location { name } => out.push(name),
            AttributeLocator::Query { path } => collect_location_refs(path, out),
            AttributeLocator::Constant { .. } | AttributeLocator::EventField { .. } => {}
        }
    }
}

//! In-memory state system.
//!
//! Keeps the ongoing value of every attribute plus the closed intervals of
//! its history. Intervals are half-open: `[start, end)`.

use super::tree::AttributeTree;
use super::{AttributeStore, Quark};
use crate::utils::error::StoreError;
use crate::value::TypedValue;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A closed period during which an attribute held one value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInterval {
    pub start: i64,
    pub end: i64,
    pub value: TypedValue,
}

#[derive(Debug, Clone, Default)]
struct OngoingState {
    value: TypedValue,
    /// `None` until the attribute is first written
    since: Option<i64>,
}

/// Reference [`AttributeStore`] backed by plain collections
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateSystem {
    tree: AttributeTree,
    ongoing: Vec<OngoingState>,
    history: HashMap<Quark, Vec<StateInterval>>,
    stacks: HashMap<Quark, Vec<TypedValue>>,
    current_time: Option<i64>,
}

impl InMemoryStateSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &AttributeTree {
        &self.tree
    }

    /// Latest timestamp seen by a mutation
    pub fn current_time(&self) -> Option<i64> {
        self.current_time
    }

    /// Resolve a full path from the root without creating anything
    pub fn quark_for_path(&self, path: &[&str]) -> Option<Quark> {
        self.tree.get_path(path)
    }

    /// Ongoing value of a path, `Null` if the path does not exist
    pub fn ongoing_at_path(&self, path: &[&str]) -> TypedValue {
        self.quark_for_path(path)
            .map(|q| self.ongoing_value(q))
            .unwrap_or_default()
    }

    /// Start time of the ongoing interval of an attribute
    pub fn ongoing_since(&self, quark: Quark) -> Option<i64> {
        self.state(quark).and_then(|s| s.since)
    }

    /// Closed intervals of an attribute, oldest first
    pub fn intervals(&self, quark: Quark) -> &[StateInterval] {
        self.history.get(&quark).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Value an attribute held at time `t`
    pub fn query_at(&self, quark: Quark, t: i64) -> TypedValue {
        if let Some(interval) = self
            .intervals(quark)
            .iter()
            .find(|i| i.start <= t && t < i.end)
        {
            return interval.value.clone();
        }

        match self.state(quark) {
            Some(OngoingState {
                value,
                since: Some(since),
            }) if *since <= t => value.clone(),
            _ => TypedValue::Null,
        }
    }

    /// Depth of the stack held by an attribute
    pub fn stack_depth(&self, quark: Quark) -> usize {
        self.stacks.get(&quark).map(Vec::len).unwrap_or(0)
    }

    fn state(&self, quark: Quark) -> Option<&OngoingState> {
        if quark < 0 {
            return None;
        }
        self.ongoing.get(quark as usize)
    }

    fn check_quark(&self, quark: Quark) -> Result<(), StoreError> {
        if self.tree.contains(quark) {
            Ok(())
        } else {
            Err(StoreError::InvalidQuark(quark))
        }
    }

    /// Reject timestamps behind the watermark
    fn check_time(&self, timestamp: i64) -> Result<(), StoreError> {
        match self.current_time {
            Some(current) if timestamp < current => {
                Err(StoreError::OutOfOrder { timestamp, current })
            }
            _ => Ok(()),
        }
    }

    /// Check the watermark, then advance it
    fn advance_time(&mut self, timestamp: i64) -> Result<(), StoreError> {
        self.check_time(timestamp)?;
        self.current_time = Some(timestamp);
        Ok(())
    }

    /// Close the ongoing interval and open a new one with `value`
    fn write(&mut self, quark: Quark, timestamp: i64, value: TypedValue) {
        let index = quark as usize;
        if self.ongoing.len() <= index {
            self.ongoing.resize_with(index + 1, OngoingState::default);
        }

        let state = &mut self.ongoing[index];
        if let Some(since) = state.since {
            if since < timestamp {
                let previous = std::mem::take(&mut state.value);
                self.history.entry(quark).or_default().push(StateInterval {
                    start: since,
                    end: timestamp,
                    value: previous,
                });
            }
        }

        let state = &mut self.ongoing[index];
        state.value = value;
        state.since = Some(timestamp);
    }
}

impl AttributeStore for InMemoryStateSystem {
    fn resolve_or_create(&mut self, root: Quark, name: &str) -> Quark {
        let quark = self.tree.get_or_add(root, name);
        if self.ongoing.len() < self.tree.len() {
            self.ongoing
                .resize_with(self.tree.len(), OngoingState::default);
        }
        quark
    }

    fn resolve_existing(&self, root: Quark, name: &str) -> Option<Quark> {
        self.tree.get(root, name)
    }

    fn ongoing_value(&self, quark: Quark) -> TypedValue {
        self.state(quark).map(|s| s.value.clone()).unwrap_or_default()
    }

    fn set(&mut self, quark: Quark, timestamp: i64, value: TypedValue) -> Result<(), StoreError> {
        self.check_quark(quark)?;
        self.advance_time(timestamp)?;
        // A plain write replaces the whole stack
        if self.stacks.remove(&quark).is_some() {
            debug!("Set discards stack at {}", self.tree.full_path(quark));
        }
        self.write(quark, timestamp, value);
        Ok(())
    }

    fn increment(
        &mut self,
        quark: Quark,
        timestamp: i64,
        delta: i32,
    ) -> Result<TypedValue, StoreError> {
        self.check_quark(quark)?;
        self.check_time(timestamp)?;
        let current = match self.ongoing_value(quark) {
            TypedValue::Null => 0,
            TypedValue::Int(v) => v,
            other => {
                return Err(StoreError::TypeMismatch(format!(
                    "cannot increment {} at {}: ongoing value {} is not an int",
                    delta,
                    self.tree.full_path(quark),
                    other
                )))
            }
        };
        let sum = current.checked_add(delta).ok_or_else(|| {
            StoreError::TypeMismatch(format!(
                "increment overflow at {}: {} + {}",
                self.tree.full_path(quark),
                current,
                delta
            ))
        })?;

        self.advance_time(timestamp)?;
        let value = TypedValue::Int(sum);
        self.write(quark, timestamp, value.clone());
        Ok(value)
    }

    fn push(&mut self, quark: Quark, timestamp: i64, value: TypedValue) -> Result<(), StoreError> {
        self.check_quark(quark)?;
        self.advance_time(timestamp)?;
        self.stacks.entry(quark).or_default().push(value.clone());
        self.write(quark, timestamp, value);
        Ok(())
    }

    fn pop(&mut self, quark: Quark, timestamp: i64) -> Result<Option<TypedValue>, StoreError> {
        self.check_quark(quark)?;
        self.advance_time(timestamp)?;

        let Some(stack) = self.stacks.get_mut(&quark) else {
            debug!("Pop on empty stack at {}", self.tree.full_path(quark));
            return Ok(None);
        };
        let Some(popped) = stack.pop() else {
            debug!("Pop on empty stack at {}", self.tree.full_path(quark));
            return Ok(None);
        };
        let top = stack.last().cloned().unwrap_or_default();

        self.write(quark, timestamp, top);
        Ok(Some(popped))
    }

    fn remove_subtree(&mut self, quark: Quark, timestamp: i64) -> Result<(), StoreError> {
        self.check_quark(quark)?;
        self.advance_time(timestamp)?;

        let mut targets = self.tree.descendants(quark);
        targets.push(quark);
        for target in targets {
            self.stacks.remove(&target);
            if !self.ongoing_value(target).is_null() {
                self.write(target, timestamp, TypedValue::Null);
            }
        }
        Ok(())
    }

    fn attribute_path(&self, quark: Quark) -> String {
        self.tree.full_path(quark)
    }
}

//! Attribute store contract and a reference in-memory implementation.
//!
//! The interpreter only talks to the store through [`AttributeStore`]:
//! - name resolution (resolve-or-create for mutation targets, resolve-only for lookups)
//! - the ongoing value of an attribute
//! - timestamped mutations (set, increment, push, pop, subtree removal)

pub mod memory;
pub mod tree;

pub use memory::{InMemoryStateSystem, StateInterval};
pub use tree::AttributeTree;

use crate::utils::error::StoreError;
use crate::value::TypedValue;

/// Opaque handle of an attribute in the store's namespace
pub type Quark = i32;

/// Quark used as the root of an absolute path and as "no such attribute"
pub const ROOT_QUARK: Quark = -1;

/// Minimal store surface driven by the interpreter
///
/// Mutations take effect as of `timestamp`; a timestamp older than the
/// store's current time fails with [`StoreError::OutOfOrder`].
pub trait AttributeStore {
    /// Resolve `name` under `root`, creating it when absent
    fn resolve_or_create(&mut self, root: Quark, name: &str) -> Quark;

    /// Resolve `name` under `root` without creating anything
    fn resolve_existing(&self, root: Quark, name: &str) -> Option<Quark>;

    /// Value whose validity interval is still open, `Null` if none
    fn ongoing_value(&self, quark: Quark) -> TypedValue;

    fn set(&mut self, quark: Quark, timestamp: i64, value: TypedValue) -> Result<(), StoreError>;

    /// Add `delta` to the ongoing Int value and return the new value
    fn increment(
        &mut self,
        quark: Quark,
        timestamp: i64,
        delta: i32,
    ) -> Result<TypedValue, StoreError>;

    fn push(&mut self, quark: Quark, timestamp: i64, value: TypedValue) -> Result<(), StoreError>;

    /// Pop the top frame; `None` when the stack was already empty
    fn pop(&mut self, quark: Quark, timestamp: i64) -> Result<Option<TypedValue>, StoreError>;

    fn remove_subtree(&mut self, quark: Quark, timestamp: i64) -> Result<(), StoreError>;

    /// Human-readable path of an attribute, used for logs and errors
    fn attribute_path(&self, quark: Quark) -> String;
}

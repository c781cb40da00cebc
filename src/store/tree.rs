//! Hierarchical attribute namespace.
//!
//! Quarks are dense indices into the node table and are never reused.

use super::{Quark, ROOT_QUARK};
use log::warn;
use std::collections::HashMap;

/// Path separator used when rendering attribute paths
pub const PATH_SEPARATOR: char = '/';

#[derive(Debug, Clone)]
struct AttributeNode {
    name: String,
    parent: Quark,
    children: HashMap<String, Quark>,
}

/// Name table mapping (parent, name) pairs to quarks
#[derive(Debug, Clone, Default)]
pub struct AttributeTree {
    nodes: Vec<AttributeNode>,
    top_level: HashMap<String, Quark>,
}

impl AttributeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, quark: Quark) -> bool {
        quark >= 0 && (quark as usize) < self.nodes.len()
    }

    /// Look up a child, `None` if it (or the parent) does not exist
    pub fn get(&self, parent: Quark, name: &str) -> Option<Quark> {
        if parent == ROOT_QUARK {
            return self.top_level.get(name).copied();
        }
        self.node(parent)?.children.get(name).copied()
    }

    /// Look up a child, adding it when absent
    ///
    /// `parent` must be `ROOT_QUARK` or a quark of this tree.
    pub fn get_or_add(&mut self, parent: Quark, name: &str) -> Quark {
        debug_assert!(
            parent == ROOT_QUARK || self.contains(parent),
            "unknown parent quark {}",
            parent
        );
        let parent = if parent == ROOT_QUARK || self.contains(parent) {
            parent
        } else {
            warn!("Unknown parent quark {}, adding '{}' at top level", parent, name);
            ROOT_QUARK
        };
        if let Some(quark) = self.get(parent, name) {
            return quark;
        }

        let quark = self.nodes.len() as Quark;
        self.nodes.push(AttributeNode {
            name: name.to_string(),
            parent,
            children: HashMap::new(),
        });

        if parent == ROOT_QUARK {
            self.top_level.insert(name.to_string(), quark);
        } else if let Some(node) = self.nodes.get_mut(parent as usize) {
            node.children.insert(name.to_string(), quark);
        }
        quark
    }

    /// Resolve a full path of names from the root
    pub fn get_path(&self, path: &[&str]) -> Option<Quark> {
        path.iter()
            .try_fold(ROOT_QUARK, |parent, name| self.get(parent, name))
    }

    pub fn name(&self, quark: Quark) -> Option<&str> {
        self.node(quark).map(|n| n.name.as_str())
    }

    pub fn parent(&self, quark: Quark) -> Option<Quark> {
        self.node(quark).map(|n| n.parent)
    }

    /// Render `A/B/C` for a quark, empty for unknown quarks
    pub fn full_path(&self, quark: Quark) -> String {
        let mut names = Vec::new();
        let mut current = quark;
        while let Some(node) = self.node(current) {
            names.push(node.name.as_str());
            current = node.parent;
        }
        names.reverse();
        names.join(&PATH_SEPARATOR.to_string())
    }

    /// All descendants of `quark` (not including itself), depth first
    pub fn descendants(&self, quark: Quark) -> Vec<Quark> {
        let mut result = Vec::new();
        let mut pending: Vec<Quark> = self
            .node(quark)
            .map(|n| n.children.values().copied().collect())
            .unwrap_or_default();

        while let Some(next) = pending.pop() {
            result.push(next);
            if let Some(node) = self.node(next) {
                pending.extend(node.children.values().copied());
            }
        }
        result
    }

    /// Every quark in creation order
    pub fn quarks(&self) -> impl Iterator<Item = Quark> + '_ {
        (0..self.nodes.len()).map(|i| i as Quark)
    }

    fn node(&self, quark: Quark) -> Option<&AttributeNode> {
        if quark < 0 {
            return None;
        }
        self.nodes.get(quark as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_add_is_idempotent() {
        let mut tree = AttributeTree::new();
        let threads = tree.get_or_add(ROOT_QUARK, "Threads");
        let t42 = tree.get_or_add(threads, "42");

        assert_eq!(tree.get_or_add(ROOT_QUARK, "Threads"), threads);
        assert_eq!(tree.get_or_add(threads, "42"), t42);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_full_path_and_lookup() {
        let mut tree = AttributeTree::new();
        let threads = tree.get_or_add(ROOT_QUARK, "Threads");
        let t42 = tree.get_or_add(threads, "42");
        let status = tree.get_or_add(t42, "Status");

        assert_eq!(tree.full_path(status), "Threads/42/Status");
        assert_eq!(tree.get_path(&["Threads", "42", "Status"]), Some(status));
        assert_eq!(tree.get_path(&["Threads", "7"]), None);
        assert_eq!(tree.parent(status), Some(t42));
    }

    #[test]
    fn test_descendants() {
        let mut tree = AttributeTree::new();
        let cpus = tree.get_or_add(ROOT_QUARK, "CPUs");
        let cpu0 = tree.get_or_add(cpus, "0");
        let current = tree.get_or_add(cpu0, "Current_thread");
        let other = tree.get_or_add(ROOT_QUARK, "Threads");

        let mut below = tree.descendants(cpus);
        below.sort();
        assert_eq!(below, vec![cpu0, current]);
        assert!(!below.contains(&other));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "unknown parent quark 12")]
    fn test_unknown_parent_add_panics_in_debug() {
        let mut tree = AttributeTree::new();
        tree.get_or_add(12, "x");
    }

    #[test]
    fn test_unknown_parent_lookup() {
        let tree = AttributeTree::new();
        assert_eq!(tree.get(12, "x"), None);
        assert_eq!(tree.full_path(12), "");
    }
}

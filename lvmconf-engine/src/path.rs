//! Path lookups
//!
//! A path is a run of node names joined by a separator character, e.g.
//! `"global/locking_type"` with `'/'`. Resolution walks one sibling list per
//! segment and takes the first node whose name matches exactly; there is no
//! backtracking into later siblings with the same name.
//!
//! The typed lookups return the caller's default both when the path does not
//! resolve and when the node's first value has a different type. Callers rely
//! on that to fill in defaults uniformly, so it is not reported as an error.

use crate::arena::NodeId;
use crate::tree::{ConfigTree, NodeRef, Value};

/// Resolve `path` against the root nodes of `tree`.
pub fn find_node<'a>(tree: &'a ConfigTree, path: &str, sep: char) -> Option<NodeRef<'a>> {
    find_in(tree, &tree.roots, path, sep)
}

/// Resolve `path` against a sibling list.
pub(crate) fn find_in<'a>(
    tree: &'a ConfigTree,
    mut level: &'a [NodeId],
    path: &str,
    sep: char,
) -> Option<NodeRef<'a>> {
    let mut rest = path;

    loop {
        rest = rest.trim_start_matches(sep);
        let (segment, tail) = match rest.find(sep) {
            Some(end) => rest.split_at(end),
            None => (rest, ""),
        };

        let node = level
            .iter()
            .filter_map(|&id| tree.node(id))
            .find(|n| n.name() == segment)?;

        if tail.is_empty() {
            return Some(node);
        }

        // A leaf has nothing to descend into.
        level = node.child_ids()?;
        rest = tail;
    }
}

/// First value of the node at `path`, if any.
fn first_value<'a>(tree: &'a ConfigTree, path: &str, sep: char) -> Option<Value<'a>> {
    find_node(tree, path, sep).and_then(|n| n.first_value())
}

/// String at `path`, or `default` if missing or not a string.
pub fn find_str<'a>(tree: &'a ConfigTree, path: &str, sep: char, default: &'a str) -> &'a str {
    match first_value(tree, path, sep) {
        Some(Value::Str(s)) => s,
        _ => {
            tracing::debug!(path, default, "Not found in config: using default");
            default
        }
    }
}

/// Integer at `path`, or `default` if missing or not an integer.
pub fn find_int(tree: &ConfigTree, path: &str, sep: char, default: i64) -> i64 {
    match first_value(tree, path, sep) {
        Some(Value::Int(i)) => i,
        _ => {
            tracing::debug!(path, default, "Not found in config: using default");
            default
        }
    }
}

/// Float at `path`, or `default` if missing or not a float.
pub fn find_float(tree: &ConfigTree, path: &str, sep: char, default: f64) -> f64 {
    match first_value(tree, path, sep) {
        Some(Value::Float(f)) => f,
        _ => {
            tracing::debug!(path, default, "Not found in config: using default");
            default
        }
    }
}

impl ConfigTree {
    /// See [`find_node`].
    pub fn find(&self, path: &str, sep: char) -> Option<NodeRef<'_>> {
        find_node(self, path, sep)
    }

    /// See [`find_str`].
    pub fn find_str<'a>(&'a self, path: &str, sep: char, default: &'a str) -> &'a str {
        find_str(self, path, sep, default)
    }

    /// See [`find_int`].
    pub fn find_int(&self, path: &str, sep: char, default: i64) -> i64 {
        find_int(self, path, sep, default)
    }

    /// See [`find_float`].
    pub fn find_float(&self, path: &str, sep: char, default: f64) -> f64 {
        find_float(self, path, sep, default)
    }
}

impl<'a> NodeRef<'a> {
    /// Resolve `path` relative to this node's children. Leaves resolve
    /// nothing.
    pub fn find(&self, path: &str, sep: char) -> Option<NodeRef<'a>> {
        find_in(self.tree(), self.child_ids()?, path, sep)
    }
}

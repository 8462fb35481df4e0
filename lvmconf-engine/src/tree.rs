//! Config tree and value model
//!
//! A [`ConfigTree`] owns an [`Arena`] plus the ordered list of its root
//! nodes. Reads go through [`NodeRef`] and [`Value`], both of which borrow
//! from the tree. Construction happens either in the parser or through
//! [`ConfigTree::add_section`] / [`ConfigTree::add_leaf`], which only ever
//! append a *fresh* node under an existing parent, so the tree stays acyclic
//! and strictly nested by construction. The builder also refuses anything the
//! writer could not turn back into the same tree: names that do not lex as an
//! identifier, negative or non-finite numbers, unquotable strings and nesting
//! past [`MAX_NESTING`].

use crate::arena::{Arena, ArenaStats, NodeBody, NodeId, Scalar};
use crate::error::TreeError;
use crate::lexer::{is_quotable, Lexer, TokenKind};
use crate::parser::MAX_NESTING;
use crate::settings::{WriteOptions, DEFAULT_ARENA_CAPACITY};
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fmt;

/// A typed scalar read from the tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value<'a> {
    Int(i64),
    Float(f64),
    /// String contents without the surrounding quotes, escapes verbatim.
    Str(&'a str),
}

impl<'a> Value<'a> {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }
}

impl From<i64> for Value<'_> {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value<'_> {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::Str(s)
    }
}

/// Check a node name: it must lex as exactly one identifier.
pub fn is_valid_name(name: &str) -> bool {
    let token = Lexer::new(name).next_token();
    token.kind == TokenKind::Identifier && token.text.len() == name.len()
}

/// A parsed or programmatically built configuration.
#[derive(Clone, Debug)]
pub struct ConfigTree {
    pub(crate) arena: Arena,
    pub(crate) roots: Vec<NodeId>,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTree {
    /// An empty tree with a default-sized arena.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ARENA_CAPACITY)
    }

    /// An empty tree whose arena reserves `capacity` bytes of string storage.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(capacity),
            roots: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Top-level nodes in source/insertion order.
    pub fn roots(&self) -> Siblings<'_> {
        Siblings {
            tree: self,
            ids: self.roots.iter(),
        }
    }

    /// Resolve a handle issued by this tree.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.arena.get(id).map(|_| NodeRef { tree: self, id })
    }

    pub fn arena_stats(&self) -> ArenaStats {
        self.arena.stats()
    }

    /// Append a new, empty section under `parent` (or at the root).
    pub fn add_section(&mut self, parent: Option<NodeId>, name: &str) -> Result<NodeId, TreeError> {
        check_name(name)?;
        let depth = self.child_depth(parent, name)?;

        let id = self.arena.alloc_node();
        let span = self.arena.alloc_str(name);
        let record = self.arena.node_mut(id);
        record.name = span;
        record.depth = depth;
        self.attach(parent, id);
        Ok(id)
    }

    /// Append a new leaf carrying `values` (in order) under `parent`.
    pub fn add_leaf(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        values: &[Value<'_>],
    ) -> Result<NodeId, TreeError> {
        check_name(name)?;
        if values.is_empty() {
            return Err(TreeError::EmptyValues {
                name: name.to_string(),
            });
        }
        for value in values {
            check_value(name, *value)?;
        }
        let depth = self.child_depth(parent, name)?;

        let id = self.arena.alloc_node();
        let span = self.arena.alloc_str(name);
        let mark = self.arena.begin_run();
        for value in values {
            let scalar = match *value {
                Value::Int(i) => Scalar::Int(i),
                // -0.0 becomes 0.0
                Value::Float(f) => Scalar::Float(f + 0.0),
                Value::Str(s) => Scalar::Str(self.arena.alloc_str(s)),
            };
            self.arena.push_value(scalar);
        }
        let run = self.arena.finish_run(mark);

        let record = self.arena.node_mut(id);
        record.name = span;
        record.body = NodeBody::Leaf(run);
        record.depth = depth;
        self.attach(parent, id);
        Ok(id)
    }

    /// Depth a new child named `name` would get under `parent`.
    fn child_depth(&self, parent: Option<NodeId>, name: &str) -> Result<usize, TreeError> {
        let Some(id) = parent else {
            return Ok(0);
        };
        let record = self.arena.get(id).ok_or(TreeError::UnknownNode { id })?;
        if !matches!(record.body, NodeBody::Section(_)) {
            return Err(TreeError::NotASection {
                name: self.arena.str(record.name).to_string(),
            });
        }

        let depth = record.depth + 1;
        if depth >= MAX_NESTING {
            return Err(TreeError::TooDeep {
                name: name.to_string(),
                limit: MAX_NESTING,
            });
        }
        Ok(depth)
    }

    /// Link `child` as the last child of `parent`. The parser calls this only
    /// with freshly allocated nodes.
    pub(crate) fn attach(&mut self, parent: Option<NodeId>, child: NodeId) {
        match parent {
            Some(id) => {
                if let NodeBody::Section(children) = &mut self.arena.node_mut(id).body {
                    children.push(child);
                }
            }
            None => self.roots.push(child),
        }
    }
}

fn check_name(name: &str) -> Result<(), TreeError> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(TreeError::InvalidName {
            name: name.to_string(),
        })
    }
}

fn check_value(name: &str, value: Value<'_>) -> Result<(), TreeError> {
    match value {
        Value::Int(i) if i < 0 => Err(TreeError::NegativeNumber {
            name: name.to_string(),
            value: i.to_string(),
        }),
        Value::Float(f) if !f.is_finite() => Err(TreeError::NonFiniteFloat {
            name: name.to_string(),
            value: f.to_string(),
        }),
        Value::Float(f) if f < 0.0 => Err(TreeError::NegativeNumber {
            name: name.to_string(),
            value: f.to_string(),
        }),
        Value::Str(s) if !is_quotable(s) => Err(TreeError::UnquotableString {
            name: name.to_string(),
            value: s.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Structural equality: same shapes, names, order and values. Arena layout
/// is irrelevant.
impl PartialEq for ConfigTree {
    fn eq(&self, other: &Self) -> bool {
        self.roots().eq(other.roots())
    }
}

impl fmt::Display for ConfigTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::writer::write_nodes(f, self.roots(), 0, &WriteOptions::default())
    }
}

impl Serialize for ConfigTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.roots.len()))?;
        for node in self.roots() {
            seq.serialize_element(&node)?;
        }
        seq.end()
    }
}

/// Borrowed view of one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a ConfigTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        self.tree.arena.str(self.tree.arena.node(self.id).name)
    }

    pub fn is_section(&self) -> bool {
        matches!(self.tree.arena.node(self.id).body, NodeBody::Section(_))
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_section()
    }

    /// Children of a section; empty for a leaf.
    pub fn children(&self) -> Siblings<'a> {
        Siblings {
            tree: self.tree,
            ids: self.child_ids().unwrap_or(&[]).iter(),
        }
    }

    /// Values of a leaf in order; empty for a section.
    pub fn values(&self) -> Values<'a> {
        let scalars = match self.tree.arena.node(self.id).body {
            NodeBody::Leaf(run) => self.tree.arena.run(run),
            NodeBody::Section(_) => &[],
        };
        Values {
            arena: &self.tree.arena,
            scalars: scalars.iter(),
        }
    }

    /// First value of a leaf, which is what the typed lookups inspect.
    pub fn first_value(&self) -> Option<Value<'a>> {
        self.values().next()
    }

    /// First child named `name`.
    pub fn child(&self, name: &str) -> Option<NodeRef<'a>> {
        self.children().find(|c| c.name() == name)
    }

    pub(crate) fn child_ids(&self) -> Option<&'a [NodeId]> {
        match &self.tree.arena.node(self.id).body {
            NodeBody::Section(children) => Some(children.as_slice()),
            NodeBody::Leaf(_) => None,
        }
    }

    pub(crate) fn tree(&self) -> &'a ConfigTree {
        self.tree
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
            && self.is_section() == other.is_section()
            && self.values().eq(other.values())
            && self.children().eq(other.children())
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_section() {
            f.debug_struct("Section")
                .field("name", &self.name())
                .field("children", &self.children().collect::<Vec<_>>())
                .finish()
        } else {
            f.debug_struct("Leaf")
                .field("name", &self.name())
                .field("values", &self.values().collect::<Vec<_>>())
                .finish()
        }
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Node", 2)?;
        state.serialize_field("name", self.name())?;
        if self.is_section() {
            state.serialize_field("children", &self.children().collect::<Vec<_>>())?;
        } else {
            state.serialize_field("values", &self.values().collect::<Vec<_>>())?;
        }
        state.end()
    }
}

/// Iterator over an ordered sibling list.
#[derive(Clone)]
pub struct Siblings<'a> {
    tree: &'a ConfigTree,
    ids: std::slice::Iter<'a, NodeId>,
}

impl<'a> Iterator for Siblings<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|&id| NodeRef {
            tree: self.tree,
            id,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl ExactSizeIterator for Siblings<'_> {}

/// Iterator over a leaf's values.
#[derive(Clone)]
pub struct Values<'a> {
    arena: &'a Arena,
    scalars: std::slice::Iter<'a, Scalar>,
}

impl<'a> Iterator for Values<'a> {
    type Item = Value<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.scalars.next().map(|scalar| match *scalar {
            Scalar::Int(i) => Value::Int(i),
            Scalar::Float(f) => Value::Float(f),
            Scalar::Str(span) => Value::Str(self.arena.str(span)),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.scalars.size_hint()
    }
}

impl ExactSizeIterator for Values<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Result<ConfigTree, TreeError> {
        let mut tree = ConfigTree::new();
        let global = tree.add_section(None, "global")?;
        tree.add_leaf(Some(global), "n", &[Value::Int(3)])?;
        tree.add_leaf(Some(global), "names", &[Value::Str("x"), Value::Str("y")])?;
        tree.add_section(None, "devices")?;
        Ok(tree)
    }

    #[test]
    fn test_builder_preserves_order() -> Result<(), TreeError> {
        let tree = sample()?;
        let roots: Vec<&str> = tree.roots().map(|n| n.name()).collect();
        assert_eq!(roots, vec!["global", "devices"]);

        let global = tree.roots().next().expect("global section");
        let children: Vec<&str> = global.children().map(|n| n.name()).collect();
        assert_eq!(children, vec!["n", "names"]);
        Ok(())
    }

    #[test]
    fn test_leaf_values() -> Result<(), TreeError> {
        let tree = sample()?;
        let names = tree
            .roots()
            .next()
            .and_then(|g| g.child("names"))
            .map(|n| n.values().collect::<Vec<_>>());
        assert_eq!(names, Some(vec![Value::Str("x"), Value::Str("y")]));
        Ok(())
    }

    #[test]
    fn test_section_has_no_values_and_leaf_no_children() -> Result<(), TreeError> {
        let tree = sample()?;
        let id = tree.roots().next().expect("global section").id();
        let global = tree.node(id).expect("issued by this tree");
        assert!(global.is_section());
        assert_eq!(global.values().count(), 0);
        assert_eq!(global.first_value(), None);

        let n = global.child("n").expect("leaf n");
        assert!(n.is_leaf());
        assert_eq!(n.children().count(), 0);
        assert_eq!(n.first_value(), Some(Value::Int(3)));
        Ok(())
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut tree = ConfigTree::new();
        for bad in [
            "", "a b", "a#b", "a=b", "tab\there", " a", "1abc", ".x", "\"q", "{a", "}", "[a",
            "]", ",a", "#c",
        ] {
            assert_eq!(
                tree.add_section(None, bad),
                Err(TreeError::InvalidName {
                    name: bad.to_string()
                })
            );
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_identifier_names_accepted() -> Result<(), TreeError> {
        let mut tree = ConfigTree::new();
        for good in ["a", "_x", "a1", "-dash", "a{b}", "clé", "x.y"] {
            tree.add_section(None, good)?;
        }
        assert_eq!(tree.roots().count(), 7);
        Ok(())
    }

    #[test]
    fn test_empty_leaf_rejected() {
        let mut tree = ConfigTree::new();
        assert_eq!(
            tree.add_leaf(None, "k", &[]),
            Err(TreeError::EmptyValues {
                name: "k".to_string()
            })
        );
    }

    #[test]
    fn test_cannot_nest_under_leaf() -> Result<(), TreeError> {
        let mut tree = ConfigTree::new();
        let leaf = tree.add_leaf(None, "k", &[Value::Int(1)])?;
        assert_eq!(
            tree.add_section(Some(leaf), "child"),
            Err(TreeError::NotASection {
                name: "k".to_string()
            })
        );
        Ok(())
    }

    #[test]
    fn test_nesting_depth_limited() -> Result<(), Box<dyn std::error::Error>> {
        let mut tree = ConfigTree::new();
        let mut parent = None;
        for _ in 0..MAX_NESTING {
            parent = Some(tree.add_section(parent, "s")?);
        }
        assert_eq!(
            tree.add_section(parent, "deeper"),
            Err(TreeError::TooDeep {
                name: "deeper".to_string(),
                limit: MAX_NESTING
            })
        );
        assert!(matches!(
            tree.add_leaf(parent, "k", &[Value::Int(1)]),
            Err(TreeError::TooDeep { .. })
        ));

        // The deepest tree the builder allows still writes out and reads back.
        let reparsed = crate::parser::parse(&crate::writer::serialize(&tree))?;
        assert_eq!(reparsed, tree);
        Ok(())
    }

    #[test]
    fn test_foreign_handle_rejected() -> Result<(), TreeError> {
        let mut other = ConfigTree::new();
        for name in ["a", "b", "c", "d", "e"] {
            other.add_section(None, name)?;
        }
        let foreign = other.add_section(None, "f")?;

        let mut tree = ConfigTree::new();
        assert!(tree.node(foreign).is_none());
        assert_eq!(
            tree.add_section(Some(foreign), "x"),
            Err(TreeError::UnknownNode { id: foreign })
        );
        assert_eq!(
            tree.add_leaf(Some(foreign), "k", &[Value::Int(1)]),
            Err(TreeError::UnknownNode { id: foreign })
        );
        assert!(tree.is_empty());
        Ok(())
    }

    #[test]
    fn test_negative_numbers_rejected() {
        let mut tree = ConfigTree::new();
        assert_eq!(
            tree.add_leaf(None, "k", &[Value::Int(1), Value::Int(-5)]),
            Err(TreeError::NegativeNumber {
                name: "k".to_string(),
                value: "-5".to_string()
            })
        );
        assert_eq!(
            tree.add_leaf(None, "f", &[Value::Float(-0.25)]),
            Err(TreeError::NegativeNumber {
                name: "f".to_string(),
                value: "-0.25".to_string()
            })
        );
        assert!(tree.is_empty());
        assert_eq!(tree.arena_stats().values, 0);
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        let mut tree = ConfigTree::new();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                tree.add_leaf(None, "f", &[Value::Float(bad)]),
                Err(TreeError::NonFiniteFloat { .. })
            ));
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_negative_zero_stored_as_zero() -> Result<(), TreeError> {
        let mut tree = ConfigTree::new();
        tree.add_leaf(None, "f", &[Value::Float(-0.0)])?;
        let stored = tree.roots().next().and_then(|n| n.first_value());
        assert!(matches!(stored, Some(Value::Float(f)) if f.is_sign_positive()));
        Ok(())
    }

    #[test]
    fn test_unquotable_strings_rejected() {
        let mut tree = ConfigTree::new();
        for bad in [r#"a"b"#, r"ab\", r"ab\\\"] {
            assert_eq!(
                tree.add_leaf(None, "s", &[Value::Str(bad)]),
                Err(TreeError::UnquotableString {
                    name: "s".to_string(),
                    value: bad.to_string()
                })
            );
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_escaped_strings_accepted() -> Result<(), Box<dyn std::error::Error>> {
        let mut tree = ConfigTree::new();
        tree.add_leaf(None, "s", &[Value::Str(r#"a\"b"#), Value::Str(r"c\\")])?;
        let reparsed = crate::parser::parse(&crate::writer::serialize(&tree))?;
        assert_eq!(reparsed, tree);
        Ok(())
    }

    #[test]
    fn test_structural_equality_ignores_arena_layout() -> Result<(), TreeError> {
        let a = sample()?;

        // Same shape, built with an extra detour through the arena.
        let mut b = ConfigTree::with_capacity(1);
        let global = b.add_section(None, "global")?;
        b.add_leaf(None, "orphan", &[Value::Int(0)])?;
        b.roots.pop();
        b.add_leaf(Some(global), "n", &[Value::Int(3)])?;
        b.add_leaf(Some(global), "names", &[Value::Str("x"), Value::Str("y")])?;
        b.add_section(None, "devices")?;

        assert_eq!(a, b);
        assert_ne!(a.arena_stats(), b.arena_stats());
        Ok(())
    }

    #[test]
    fn test_value_order_matters_for_equality() -> Result<(), TreeError> {
        let mut a = ConfigTree::new();
        a.add_leaf(None, "k", &[Value::Int(1), Value::Int(2)])?;
        let mut b = ConfigTree::new();
        b.add_leaf(None, "k", &[Value::Int(2), Value::Int(1)])?;
        assert_ne!(a, b);
        Ok(())
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(4).as_int(), Some(4));
        assert_eq!(Value::Int(4).as_str(), None);
        assert_eq!(Value::Float(0.5).as_float(), Some(0.5));
        assert_eq!(Value::Str("s").as_str(), Some("s"));
        assert_eq!(Value::Str("s").type_name(), "string");
        assert_eq!(Value::from(7i64), Value::Int(7));
    }

    #[test]
    fn test_serde_json_view() -> Result<(), Box<dyn std::error::Error>> {
        let tree = sample()?;
        let json = serde_json::to_value(&tree)?;
        assert_eq!(
            json,
            serde_json::json!([
                {"name": "global", "children": [
                    {"name": "n", "values": [3]},
                    {"name": "names", "values": ["x", "y"]},
                ]},
                {"name": "devices", "children": []},
            ])
        );
        Ok(())
    }
}

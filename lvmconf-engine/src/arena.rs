//! Arena owning every node, value and string of one configuration.
//!
//! The arena is a bump region made of three growable buffers:
//!
//! ```text
//! Arena
//! ├── nodes:   Vec<NodeRecord>   (addressed by NodeId)
//! ├── values:  Vec<Scalar>       (leaves own a contiguous ValueRun)
//! └── strings: String            (names and string values as StrSpan)
//! ```
//!
//! Nothing is ever freed individually. Dropping the arena releases the whole
//! configuration at once, and the borrow checker keeps every `&str` and
//! [`Value`](crate::Value) handed out by the tree from outliving it.

use std::fmt;

/// Handle to a node allocated in an [`Arena`].
///
/// Handles are only meaningful for the tree that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Index of the node record within its arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Location of a string inside the arena's string buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct StrSpan {
    offset: usize,
    len: usize,
}

/// Contiguous run of values owned by one leaf.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ValueRun {
    start: usize,
    len: usize,
}

impl ValueRun {
    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

/// A value as stored in the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Scalar {
    Int(i64),
    Float(f64),
    Str(StrSpan),
}

/// Shape of a node: children for a section, values for a leaf.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum NodeBody {
    Section(Vec<NodeId>),
    Leaf(ValueRun),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NodeRecord {
    pub(crate) name: StrSpan,
    pub(crate) body: NodeBody,
    /// Number of sections above this node; roots sit at 0.
    pub(crate) depth: usize,
}

impl Default for NodeRecord {
    /// The zero record: an unnamed, childless section.
    fn default() -> Self {
        Self {
            name: StrSpan::default(),
            body: NodeBody::Section(Vec::new()),
            depth: 0,
        }
    }
}

/// Allocation counters for one arena.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    pub nodes: usize,
    pub values: usize,
    pub string_bytes: usize,
}

/// Single growable allocation region backing one configuration tree.
#[derive(Clone, Debug, Default)]
pub struct Arena {
    nodes: Vec<NodeRecord>,
    values: Vec<Scalar>,
    strings: String,
}

impl Arena {
    /// Create an arena with `capacity` bytes of string storage reserved.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::new(),
            values: Vec::new(),
            strings: String::with_capacity(capacity),
        }
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            nodes: self.nodes.len(),
            values: self.values.len(),
            string_bytes: self.strings.len(),
        }
    }

    /// Allocate a zero-initialised node record.
    pub(crate) fn alloc_node(&mut self) -> NodeId {
        self.nodes.push(NodeRecord::default());
        NodeId(self.nodes.len() - 1)
    }

    /// Copy `s` into the string buffer.
    pub(crate) fn alloc_str(&mut self, s: &str) -> StrSpan {
        let offset = self.strings.len();
        self.strings.push_str(s);
        StrSpan {
            offset,
            len: s.len(),
        }
    }

    /// Start a value run; pass the returned mark to [`Arena::finish_run`].
    pub(crate) fn begin_run(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn push_value(&mut self, value: Scalar) {
        self.values.push(value);
    }

    /// Close the run of every value pushed since `mark`.
    pub(crate) fn finish_run(&self, mark: usize) -> ValueRun {
        ValueRun {
            start: mark,
            len: self.values.len() - mark,
        }
    }

    /// The record behind `id`, or `None` for a handle this arena never issued.
    pub(crate) fn get(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node(&self, id: NodeId) -> &NodeRecord {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut NodeRecord {
        &mut self.nodes[id.0]
    }

    pub(crate) fn str(&self, span: StrSpan) -> &str {
        &self.strings[span.offset..span.offset + span.len]
    }

    pub(crate) fn run(&self, run: ValueRun) -> &[Scalar] {
        &self.values[run.start..run.start + run.len]
    }
}

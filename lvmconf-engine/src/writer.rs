//! Serializer: regenerate configuration text from a tree.
//!
//! Output re-parses to a structurally equal tree. It is not byte-identical
//! to the original input: comments and layout are lost, and floats are
//! written with six decimals (`1.50` comes back as `1.500000`).

use crate::settings::WriteOptions;
use crate::tree::{ConfigTree, NodeRef, Siblings, Value};
use std::fmt::{self, Write};
use std::io;

/// Serialize with default options.
pub fn serialize(tree: &ConfigTree) -> String {
    serialize_with(tree, &WriteOptions::default())
}

/// Serialize with the given layout options.
pub fn serialize_with(tree: &ConfigTree, options: &WriteOptions) -> String {
    Rendered { tree, options }.to_string()
}

/// Serialize into any byte sink, streaming node by node.
pub fn write_to<W: io::Write>(tree: &ConfigTree, mut sink: W, options: &WriteOptions) -> io::Result<()> {
    write!(sink, "{}", Rendered { tree, options })?;
    sink.flush()
}

/// A tree paired with its layout, formatted as configuration text.
struct Rendered<'a> {
    tree: &'a ConfigTree,
    options: &'a WriteOptions,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_nodes(f, self.tree.roots(), 0, self.options)
    }
}

pub(crate) fn write_nodes<W: Write>(
    out: &mut W,
    nodes: Siblings<'_>,
    level: usize,
    options: &WriteOptions,
) -> fmt::Result {
    let indent = options.indent_for(level);
    for node in nodes {
        write_node(out, node, level, indent, options)?;
    }
    Ok(())
}

fn write_node<W: Write>(
    out: &mut W,
    node: NodeRef<'_>,
    level: usize,
    indent: usize,
    options: &WriteOptions,
) -> fmt::Result {
    write!(out, "{:indent$}{}", "", node.name(), indent = indent)?;

    if node.is_section() {
        out.write_str(" {\n")?;
        write_nodes(out, node.children(), level + 1, options)?;
        write!(out, "{:indent$}}}", "", indent = indent)?;
    } else {
        out.write_char('=')?;
        let mut values = node.values();
        if values.len() > 1 {
            out.write_char('[')?;
            for (i, value) in values.enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_value(out, value)?;
            }
            out.write_char(']')?;
        } else if let Some(value) = values.next() {
            write_value(out, value)?;
        }
    }

    out.write_char('\n')
}

/// Strings quoted verbatim, integers in signed decimal, floats with six
/// decimals.
pub fn write_value<W: Write>(out: &mut W, value: Value<'_>) -> fmt::Result {
    match value {
        Value::Str(s) => write!(out, "\"{}\"", s),
        Value::Int(i) => write!(out, "{}", i),
        Value::Float(f) => write!(out, "{:.6}", f),
    }
}

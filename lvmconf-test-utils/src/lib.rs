//! lvmconf Test Utilities
//!
//! Shared test infrastructure for the lvmconf workspace:
//! - Owned tree descriptions that can be built into a `ConfigTree` or
//!   rendered as source text
//! - Proptest generators for names, values and whole trees
//! - Text fixtures for common scenarios
//! - Custom assertions for parse results

pub use lvmconf_engine::{ConfigError, ConfigResult, ConfigTree, NodeId, TreeError, Value};

use std::fmt::Write;

// ============================================================================
// OWNED TREE DESCRIPTIONS
// ============================================================================

/// A value that owns its string, for use outside any arena.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl OwnedValue {
    pub fn as_value(&self) -> Value<'_> {
        match self {
            OwnedValue::Int(i) => Value::Int(*i),
            OwnedValue::Float(f) => Value::Float(*f),
            OwnedValue::Str(s) => Value::Str(s),
        }
    }
}

/// Owned description of one node and everything below it.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSpec {
    Section { name: String, children: Vec<NodeSpec> },
    Leaf { name: String, values: Vec<OwnedValue> },
}

impl NodeSpec {
    pub fn name(&self) -> &str {
        match self {
            NodeSpec::Section { name, .. } | NodeSpec::Leaf { name, .. } => name,
        }
    }
}

/// Build a tree through the public builder API.
pub fn build_tree(specs: &[NodeSpec]) -> Result<ConfigTree, TreeError> {
    let mut tree = ConfigTree::new();
    for spec in specs {
        build_node(&mut tree, None, spec)?;
    }
    Ok(tree)
}

fn build_node(tree: &mut ConfigTree, parent: Option<NodeId>, spec: &NodeSpec) -> Result<(), TreeError> {
    match spec {
        NodeSpec::Section { name, children } => {
            let id = tree.add_section(parent, name)?;
            for child in children {
                build_node(tree, Some(id), child)?;
            }
        }
        NodeSpec::Leaf { name, values } => {
            let values: Vec<Value<'_>> = values.iter().map(OwnedValue::as_value).collect();
            tree.add_leaf(parent, name, &values)?;
        }
    }
    Ok(())
}

/// Render specs as hand-written looking source text.
///
/// The loose layout uses spaces, comments and commas; the compact layout
/// uses none of them (`k=[1 2]`), exercising the optional-comma rule.
pub fn render_source(specs: &[NodeSpec], compact: bool) -> String {
    let mut out = String::new();
    if !compact {
        out.push_str("# generated fixture\n");
    }
    for spec in specs {
        render_node(&mut out, spec, 0, compact);
    }
    out
}

fn render_node(out: &mut String, spec: &NodeSpec, depth: usize, compact: bool) {
    let pad = if compact { String::new() } else { "\t".repeat(depth) };
    match spec {
        NodeSpec::Section { name, children } => {
            let _ = writeln!(out, "{pad}{name} {{");
            for child in children {
                render_node(out, child, depth + 1, compact);
            }
            let _ = writeln!(out, "{pad}}}");
        }
        NodeSpec::Leaf { name, values } => {
            let sep = if compact { "=" } else { " = " };
            let _ = write!(out, "{pad}{name}{sep}");
            if values.len() == 1 && !compact {
                render_value(out, &values[0]);
            } else {
                out.push('[');
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        out.push_str(if compact { " " } else { ", " });
                    }
                    render_value(out, value);
                }
                out.push(']');
            }
            if !compact {
                out.push_str("  # leaf");
            }
            out.push('\n');
        }
    }
}

fn render_value(out: &mut String, value: &OwnedValue) {
    let _ = match value {
        OwnedValue::Int(i) => write!(out, "{i}"),
        // Literal text differs from the writer's six-decimal form on purpose.
        OwnedValue::Float(f) => write!(out, "{f:?}"),
        OwnedValue::Str(s) => write!(out, "\"{s}\""),
    };
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for configuration trees.
    //!
    //! Everything generated here survives a text round trip: numbers are
    //! non-negative (a leading `-` would lex as an identifier), floats are
    //! exact thousandths so six-decimal output re-reads to the same `f64`,
    //! and every backslash in a string starts a complete escape.

    use super::*;
    use proptest::prelude::*;

    /// A node name that lexes as an identifier.
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_]{0,8}"
    }

    pub fn arb_value() -> impl Strategy<Value = OwnedValue> {
        prop_oneof![
            (0i64..=i64::MAX).prop_map(OwnedValue::Int),
            (0u32..10_000_000).prop_map(|n| OwnedValue::Float(f64::from(n) / 1000.0)),
            "[a-zA-Z0-9 _./:-]{0,12}".prop_map(OwnedValue::Str),
            arb_escaped_str().prop_map(OwnedValue::Str),
        ]
    }

    /// String contents built from plain characters and two-byte escapes
    /// (`\\`, `\"`, `\n`), kept verbatim by the lexer.
    pub fn arb_escaped_str() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![Just("a"), Just(" "), Just(r"\\"), Just(r#"\""#), Just(r"\n")],
            0..12,
        )
        .prop_map(|atoms| atoms.concat())
    }

    pub fn arb_leaf() -> impl Strategy<Value = NodeSpec> {
        (arb_name(), prop::collection::vec(arb_value(), 1..5))
            .prop_map(|(name, values)| NodeSpec::Leaf { name, values })
    }

    /// A leaf or a section nested up to four levels deep.
    pub fn arb_node() -> impl Strategy<Value = NodeSpec> {
        arb_leaf().prop_recursive(4, 48, 5, |inner| {
            (arb_name(), prop::collection::vec(inner, 0..5))
                .prop_map(|(name, children)| NodeSpec::Section { name, children })
        })
    }

    /// A whole file worth of root nodes.
    pub fn arb_tree_spec() -> impl Strategy<Value = Vec<NodeSpec>> {
        prop::collection::vec(arb_node(), 0..6)
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Source texts for common scenarios.

    /// The three-line scenario every component is checked against.
    pub const SCENARIO: &str = r#"
global {
  n = 3
  names = ["x", "y"]
}
"#;

    /// A realistic volume-manager configuration excerpt.
    pub const LVM_CONF: &str = r#"# Volume manager configuration
devices {
    dir = "/dev"
    scan = ["/dev", "/dev/mapper"]
    filter = ["a|.*|"]
    cache = "/etc/lvm/.cache"
    write_cache_state = 1
    types = ["fd", 16]
}

log {
    verbose = 0
    syslog = 1
    file = "/var/log/lvm2.log"
    level = 0
    indent = 1
    command_names = 0
    prefix = "  "
}

backup {
    backup = 1
    backup_dir = "/etc/lvm/backup"
    archive = 1
    archive_dir = "/etc/lvm/archive"
    retain_min = 10
    retain_days = 30
}

global {
    umask = 63
    test = 0
    activation = 1
    proc = "/proc"
    locking_type = 1
    locking_dir = "/var/lock/lvm"
    fallback_ratio = 0.75
}

activation {
    missing_stripe_filler = "/dev/ioerror"
    reserved_stack = 256
    reserved_memory = 8192
    process_priority = 5
}
"#;

    /// Two sibling sections with the same name.
    pub const DUPLICATE_SECTIONS: &str = r#"
a { x = 1 }
a { x = 2 y = 3 }
"#;
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for parse results and round trips.

    use super::*;

    /// Assert that a result is a syntax error, optionally on a given line.
    #[track_caller]
    pub fn assert_syntax_error<T: std::fmt::Debug>(result: &ConfigResult<T>, line: Option<usize>) {
        match result {
            Err(ConfigError::Syntax { line: got, .. }) => {
                if let Some(expected) = line {
                    assert_eq!(*got, expected, "Syntax error on the wrong line");
                }
            }
            other => panic!("Expected syntax error, got: {:?}", other),
        }
    }

    /// Assert that serializing and re-parsing `tree` gives an equal tree.
    #[track_caller]
    pub fn assert_round_trip(tree: &ConfigTree) {
        let text = lvmconf_engine::serialize(tree);
        match lvmconf_engine::parse(&text) {
            Ok(reparsed) => assert_eq!(&reparsed, tree, "Round trip changed the tree:\n{}", text),
            Err(e) => panic!("Serialized text failed to parse ({}):\n{}", e, text),
        }
    }
}

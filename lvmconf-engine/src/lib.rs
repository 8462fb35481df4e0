//! lvmconf engine - configuration language for storage metadata
//!
//! Reads and writes the nested `section { key = value }` format used for
//! volume-manager metadata: a hand-written lexer, a recursive-descent parser
//! building an arena-backed tree, path lookups with typed defaults, and a
//! serializer that regenerates the text.
//!
//! Architecture:
//! ```text
//! Config text (.conf files)
//!     ↓
//! Lexer (tokens + line numbers)
//!     ↓
//! Parser (recursive descent)
//!     ↓
//! ConfigTree (arena-owned nodes, values, strings)
//!     ↓                     ↓
//! Path lookups          Writer (text round trip)
//! ```
//!
//! ```
//! use lvmconf_engine::parse;
//!
//! let tree = parse("global {\n  n = 3\n  names = [\"x\", \"y\"]\n}\n").unwrap();
//! assert_eq!(tree.find_int("global/n", '/', -1), 3);
//! assert_eq!(tree.find_str("global/missing", '/', "dflt"), "dflt");
//! ```

pub mod arena;
pub mod error;
pub mod file;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod settings;
pub mod tree;
pub mod writer;

// Re-export key types for convenience
pub use arena::{Arena, ArenaStats, NodeId};
pub use error::{ConfigError, ConfigResult, SettingsError, TreeError};
pub use file::ConfigFile;
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{parse, parse_with, Parser};
pub use path::{find_float, find_int, find_node, find_str};
pub use settings::{EngineSettings, WriteOptions};
pub use tree::{ConfigTree, NodeRef, Siblings, Value, Values};
pub use writer::{serialize, serialize_with, write_to};

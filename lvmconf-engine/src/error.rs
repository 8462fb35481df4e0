//! Error types for configuration loading, building and writing

use crate::arena::NodeId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a tree through the builder API.
///
/// The builder only accepts what the writer can put into text that reads
/// back as the same tree.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    /// Node names must lex as exactly one identifier.
    #[error("invalid node name {name:?}: names must lex as a single identifier")]
    InvalidName { name: String },

    /// A leaf needs at least one value.
    #[error("leaf '{name}' must carry at least one value")]
    EmptyValues { name: String },

    /// Children can only be attached to sections.
    #[error("node '{name}' is a leaf and cannot hold children")]
    NotASection { name: String },

    /// The handle was not issued by this tree.
    #[error("{id} does not belong to this tree")]
    UnknownNode { id: NodeId },

    /// Sections nest at most `limit` levels deep.
    #[error("node '{name}' would nest deeper than {limit} levels")]
    TooDeep { name: String, limit: usize },

    /// Numbers are written without a sign, so negatives cannot be stored.
    #[error("leaf '{name}': negative number {value} cannot be written")]
    NegativeNumber { name: String, value: String },

    #[error("leaf '{name}': float {value} is not finite")]
    NonFiniteFloat { name: String, value: String },

    /// Strings are written verbatim between quotes.
    #[error("leaf '{name}': string {value:?} has an unescaped quote or a trailing backslash")]
    UnquotableString { name: String, value: String },
}

/// Errors raised while validating [`EngineSettings`](crate::EngineSettings).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("settings parse error: {0}")]
    Parse(String),
}

/// Top-level error for every fallible engine operation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The token stream did not match the grammar. The whole load fails.
    #[error("Parse error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// The resource could not be inspected, opened, read or written.
    #[error("{operation} failed for {}: {source}", .path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl ConfigError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Line of a syntax error, if this is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ConfigError::Syntax { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, ConfigError::Syntax { .. })
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

//! Parser module for the configuration language

pub mod parser;

pub use parser::*;

use crate::error::ConfigResult;
use crate::lexer::Lexer;
use crate::settings::EngineSettings;
use crate::tree::ConfigTree;

/// Parse `source` into a tree using default settings.
pub fn parse(source: &str) -> ConfigResult<ConfigTree> {
    parse_with(source, &EngineSettings::default())
}

/// Parse `source` into a tree whose arena is sized from `settings`.
pub fn parse_with(source: &str, settings: &EngineSettings) -> ConfigResult<ConfigTree> {
    settings.validate()?;

    let tokens = Lexer::new(source).tokenize();
    let token_count = tokens.len();
    let tree = Parser::with_tree(tokens, ConfigTree::with_capacity(settings.arena_capacity))
        .parse()?;

    let stats = tree.arena_stats();
    tracing::debug!(
        tokens = token_count,
        nodes = stats.nodes,
        values = stats.values,
        string_bytes = stats.string_bytes,
        "Parsed configuration"
    );
    Ok(tree)
}

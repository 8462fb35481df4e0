//! Engine settings

use crate::error::{ConfigResult, SettingsError};
use serde::{Deserialize, Serialize};

/// Initial string storage reserved for a fresh arena, in bytes.
pub const DEFAULT_ARENA_CAPACITY: usize = 10 * 1024;

/// Widest indentation the writer will ever render, in spaces.
pub const MAX_INDENT: usize = 32;

/// Layout knobs for the serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WriteOptions {
    /// Spaces emitted per nesting level.
    pub indent_width: usize,
    /// Rendered indentation is capped at this many spaces.
    pub max_indent: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            indent_width: 1,
            max_indent: MAX_INDENT,
        }
    }
}

impl WriteOptions {
    /// Indentation for `level`, capped at `max_indent`.
    pub fn indent_for(&self, level: usize) -> usize {
        level.saturating_mul(self.indent_width).min(self.max_indent)
    }
}

/// Settings shared by loading and writing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Bytes of string storage reserved up front for each arena.
    pub arena_capacity: usize,
    pub write: WriteOptions,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            write: WriteOptions::default(),
        }
    }
}

impl EngineSettings {
    /// Parse settings from a TOML document. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let settings: EngineSettings =
            toml::from_str(source).map_err(|e| SettingsError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.arena_capacity == 0 {
            return Err(SettingsError::InvalidValue {
                field: "arena_capacity".to_string(),
                value: self.arena_capacity.to_string(),
                reason: "arena_capacity must be greater than 0".to_string(),
            });
        }

        if self.write.indent_width == 0 {
            return Err(SettingsError::InvalidValue {
                field: "write.indent_width".to_string(),
                value: self.write.indent_width.to_string(),
                reason: "indent_width must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

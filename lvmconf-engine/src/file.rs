//! Loading and writing configuration files
//!
//! A [`ConfigFile`] pairs one [`ConfigTree`] (and therefore one arena) with
//! the settings used to read and write it. Files are only held open for the
//! duration of a `read` or `write` call.

use crate::error::{ConfigError, ConfigResult};
use crate::parser::parse_with;
use crate::settings::EngineSettings;
use crate::tree::ConfigTree;
use crate::writer::serialize_with;
use std::fs;
use std::io::Write;
use std::path::Path;

/// One loaded (or freshly created) configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    tree: ConfigTree,
    settings: EngineSettings,
}

impl ConfigFile {
    /// An empty configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty configuration with the given settings.
    pub fn with_settings(settings: EngineSettings) -> ConfigResult<Self> {
        settings.validate()?;
        Ok(Self {
            tree: ConfigTree::with_capacity(settings.arena_capacity),
            settings,
        })
    }

    /// Wrap an already built tree.
    pub fn from_tree(tree: ConfigTree) -> Self {
        Self {
            tree,
            settings: EngineSettings::default(),
        }
    }

    /// Load `path` with default settings.
    pub fn read(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::read_with(path, EngineSettings::default())
    }

    /// Load `path`. Any failure discards everything parsed so far.
    pub fn read_with(path: impl AsRef<Path>, settings: EngineSettings) -> ConfigResult<Self> {
        let path = path.as_ref();
        match load(path, &settings) {
            Ok(tree) => {
                tracing::info!(
                    path = %path.display(),
                    roots = tree.roots().len(),
                    nodes = tree.arena_stats().nodes,
                    "Loaded configuration"
                );
                Ok(Self { tree, settings })
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to load configuration");
                Err(err)
            }
        }
    }

    /// Serialize to `path`, creating or truncating it.
    pub fn write(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        match store(&self.tree, path, &self.settings) {
            Ok(bytes) => {
                tracing::info!(path = %path.display(), bytes, "Wrote configuration");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "Failed to write configuration");
                Err(err)
            }
        }
    }

    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    /// Mutable access for the builder API.
    pub fn tree_mut(&mut self) -> &mut ConfigTree {
        &mut self.tree
    }

    pub fn into_tree(self) -> ConfigTree {
        self.tree
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

fn load(path: &Path, settings: &EngineSettings) -> ConfigResult<ConfigTree> {
    let metadata = fs::metadata(path).map_err(|e| ConfigError::io("stat", path, e))?;
    if metadata.is_dir() {
        return Err(ConfigError::io(
            "stat",
            path,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "is a directory"),
        ));
    }

    // Invalid UTF-8 surfaces as an InvalidData read error.
    let source = fs::read_to_string(path).map_err(|e| ConfigError::io("read", path, e))?;
    parse_with(&source, settings)
}

fn store(tree: &ConfigTree, path: &Path, settings: &EngineSettings) -> ConfigResult<usize> {
    let text = serialize_with(tree, &settings.write);
    let mut file = fs::File::create(path).map_err(|e| ConfigError::io("open", path, e))?;
    file.write_all(text.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| ConfigError::io("write", path, e))?;
    Ok(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let file = ConfigFile::new();
        assert!(file.tree().is_empty());
        assert_eq!(file.settings(), &EngineSettings::default());
    }

    #[test]
    fn test_with_invalid_settings() {
        let settings = EngineSettings {
            arena_capacity: 0,
            ..EngineSettings::default()
        };
        assert!(matches!(
            ConfigFile::with_settings(settings),
            Err(ConfigError::Settings(_))
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let err = ConfigFile::read("/definitely/not/here/lvm.conf").expect_err("missing");
        match err {
            ConfigError::Io { operation, .. } => assert_eq!(operation, "stat"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_directory_rejected() {
        let dir = std::env::temp_dir();
        let err = ConfigFile::read(&dir).expect_err("directory");
        assert!(matches!(err, ConfigError::Io { operation: "stat", .. }));
    }
}

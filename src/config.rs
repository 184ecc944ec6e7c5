//! Configuration loading and management
//!
//! Handles parsing of `tdl.toml` and resolving where task data lives.

use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::storage::DEFAULT_KEY;
use crate::store::validate_key;
use crate::task::Filter;

/// Config file name inside the platform config directory
pub const CONFIG_FILE: &str = "tdl.toml";

/// Fallback data directory when no platform directory is available
pub const FALLBACK_DATA_DIR: &str = ".tdl";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Terminal UI configuration
    #[serde(default)]
    pub ui: UiConfig,
}

/// Storage-related configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the task blob
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Key (file stem) the list is stored under
    #[serde(default = "default_key")]
    pub key: String,
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            key: default_key(),
        }
    }
}

/// UI-related configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UiConfig {
    /// Filter selected when the UI starts
    #[serde(default)]
    pub default_filter: Filter,

    /// chrono format string for creation times
    #[serde(default = "default_time_format")]
    pub time_format: String,
}

fn default_time_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_filter: Filter::All,
            time_format: default_time_format(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "tdl")
}

/// Default config file location (platform config dir)
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, or return defaults. A file that exists but
    /// does not parse is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                tracing::debug!(path = %path.display(), "no config file; using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Data directory: explicit override, then config, then platform data
    /// dir, then `./.tdl`.
    pub fn resolve_data_dir(&self, override_dir: Option<&Path>) -> PathBuf {
        if let Some(dir) = override_dir {
            return dir.to_path_buf();
        }
        if let Some(dir) = self.storage.data_dir.as_ref() {
            return dir.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
    }

    fn validate(&self) -> Result<()> {
        validate_key(&self.storage.key)
            .map_err(|err| Error::InvalidConfig(format!("storage.key: {err}")))?;
        let format = &self.ui.time_format;
        if format.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "ui.time_format cannot be empty".to_string(),
            ));
        }
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::InvalidConfig(format!(
                "ui.time_format: not a valid chrono format: {format:?}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_expected() {
        let cfg = Config::default();
        assert_eq!(cfg.storage.key, "todos");
        assert!(cfg.storage.data_dir.is_none());
        assert_eq!(cfg.ui.default_filter, Filter::All);
        assert_eq!(cfg.ui.time_format, "%Y-%m-%d %H:%M");
    }

    #[test]
    fn load_parses_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        let content = r#"
[storage]
data_dir = "/tmp/tdl-data"
key = "work"

[ui]
default_filter = "active"
time_format = "%d/%m"
"#;
        fs::write(&path, content).expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.storage.data_dir, Some(PathBuf::from("/tmp/tdl-data")));
        assert_eq!(cfg.storage.key, "work");
        assert_eq!(cfg.ui.default_filter, Filter::Active);
        assert_eq!(cfg.ui.time_format, "%d/%m");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[ui]\ndefault_filter = \"completed\"\n").expect("write config");

        let cfg = Config::load(&path).expect("load config");
        assert_eq!(cfg.storage, StorageConfig::default());
        assert_eq!(cfg.ui.default_filter, Filter::Completed);
        assert_eq!(cfg.ui.time_format, "%Y-%m-%d %H:%M");
    }

    #[test]
    fn invalid_key_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[storage]\nkey = \"../escape\"\n").expect("write config");

        let err = Config::load(&path).expect_err("invalid key");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn empty_time_format_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[ui]\ntime_format = \" \"\n").expect("write config");

        assert!(matches!(Config::load(&path), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn load_or_default_handles_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_or_default(Some(&dir.path().join("missing.toml"))).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn unknown_time_format_specifier_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[ui]\ntime_format = \"%Q\"\n").expect("write config");

        let err = Config::load(&path).expect_err("bad format");
        assert!(matches!(err, Error::InvalidConfig(ref msg) if msg.contains("ui.time_format")));
    }

    #[test]
    fn data_dir_resolution_order() {
        let mut cfg = Config::default();
        cfg.storage.data_dir = Some(PathBuf::from("/from/config"));
        assert_eq!(
            cfg.resolve_data_dir(Some(Path::new("/from/flag"))),
            PathBuf::from("/from/flag")
        );
        assert_eq!(cfg.resolve_data_dir(None), PathBuf::from("/from/config"));
    }
}

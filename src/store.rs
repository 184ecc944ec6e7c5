//! Synchronous key-value stores backing task persistence.
//!
//! ```text
//! <data_dir>/
//!   todos.json          # one blob per key
//!   todos.json.lock     # advisory lock taken while writing
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

const BLOB_EXTENSION: &str = "json";

/// A string-keyed store of string blobs.
pub trait KeyValueStore {
    /// Read the value for `key`; `Ok(None)` when nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value for `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Keys become file names, so they are restricted to a safe charset.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::InvalidArgument("storage key cannot be empty".to_string()));
    }
    if key.starts_with('.') {
        return Err(Error::InvalidArgument(format!(
            "storage key cannot start with '.': {key}"
        )));
    }
    let valid = key
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
    if !valid {
        return Err(Error::InvalidArgument(format!(
            "storage key may only contain ASCII letters, digits, '-', '_' or '.': {key}"
        )));
    }
    Ok(())
}

/// One JSON file per key under a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the blob file for `key`
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.{BLOB_EXTENSION}")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        lock::write_atomic_locked(&path, value.as_bytes(), DEFAULT_LOCK_TIMEOUT_MS)?;
        tracing::trace!(path = %path.display(), bytes = value.len(), "blob written");
        Ok(())
    }
}

/// In-process store; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

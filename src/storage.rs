//! Task list persistence.
//!
//! The whole list is stored as a single JSON array under one key. Loading is
//! permissive: a missing or unreadable blob yields an empty list, and records
//! that are not task-shaped are skipped one by one. Saving always replaces
//! the whole blob.

use std::collections::HashSet;

use serde_json::Value;

use crate::error::Result;
use crate::store::KeyValueStore;
use crate::task::Task;

/// Key the task list is stored under unless configured otherwise
pub const DEFAULT_KEY: &str = "todos";

/// Persistence adapter between a [`KeyValueStore`] and the task list
#[derive(Debug, Clone)]
pub struct TaskStorage<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> TaskStorage<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the stored list. Never fails; problems are logged and degrade to
    /// an empty (or partial) list.
    pub fn load(&self) -> Vec<Task> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.key, "no stored tasks");
                return Vec::new();
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "failed to read stored tasks");
                return Vec::new();
            }
        };
        parse_tasks(&raw)
    }

    /// Best-effort save: failures are logged, not returned.
    pub fn save(&mut self, tasks: &[Task]) {
        if let Err(err) = self.try_save(tasks) {
            tracing::warn!(key = %self.key, error = %err, "failed to save tasks");
        }
    }

    /// Serialize and overwrite the stored list.
    pub fn try_save(&mut self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string(tasks)?;
        self.store.set(&self.key, &json)?;
        tracing::debug!(key = %self.key, count = tasks.len(), "tasks saved");
        Ok(())
    }
}

/// Parse a stored blob, keeping every well-formed task.
///
/// Dropped: non-array blobs (everything), records that fail to deserialize,
/// records whose title trims to empty, and records repeating an earlier id.
pub fn parse_tasks(raw: &str) -> Vec<Task> {
    let values: Vec<Value> = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(values)) => values,
        Ok(_) => {
            tracing::warn!("stored tasks are not a list; starting empty");
            return Vec::new();
        }
        Err(err) => {
            tracing::warn!(error = %err, "stored tasks are not valid JSON; starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(values.len());
    let mut dropped = 0usize;
    for value in values {
        let task: Task = match serde_json::from_value(value) {
            Ok(task) => task,
            Err(_) => {
                dropped += 1;
                continue;
            }
        };
        if task.title.trim().is_empty() || !seen.insert(task.id.clone()) {
            dropped += 1;
            continue;
        }
        tasks.push(task);
    }
    if dropped > 0 {
        tracing::warn!(dropped, kept = tasks.len(), "skipped malformed stored tasks");
    }
    tasks
}

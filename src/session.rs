//! Owned application state: a task list bound to its storage.
//!
//! Opening a session loads the stored list; every action that changes the
//! list is written back before `apply` returns.

use crate::error::Result;
use crate::list::{Action, TaskList};
use crate::storage::TaskStorage;
use crate::store::KeyValueStore;
use crate::task::Filter;

pub struct Session<S: KeyValueStore> {
    list: TaskList,
    storage: TaskStorage<S>,
}

impl<S: KeyValueStore> Session<S> {
    pub fn open(storage: TaskStorage<S>) -> Self {
        let tasks = storage.load();
        tracing::debug!(count = tasks.len(), key = storage.key(), "session opened");
        Self {
            list: TaskList::from_tasks(tasks),
            storage,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.list.set_filter(filter);
        self
    }

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    pub fn storage(&self) -> &TaskStorage<S> {
        &self.storage
    }

    /// Apply an action and persist when the task list changed. Saving is
    /// best-effort; see [`Session::apply_strict`] for a surfaced error.
    pub fn apply(&mut self, action: Action) -> bool {
        let changed = self.list.apply(action);
        if changed {
            self.storage.save(self.list.tasks());
        }
        changed
    }

    /// Like [`Session::apply`] but returns the write error, for one-shot
    /// commands that should exit non-zero when nothing was persisted.
    pub fn apply_strict(&mut self, action: Action) -> Result<bool> {
        let changed = self.list.apply(action);
        if changed {
            self.storage.try_save(self.list.tasks())?;
        }
        Ok(changed)
    }
}

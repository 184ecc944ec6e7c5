//! In-memory task list state.
//!
//! `TaskList` owns the ordered tasks (newest first), the active filter, and
//! the id of the task being edited inline, if any. Every operation is a
//! plain method call; [`Action`] wraps the same operations for dispatch-style
//! callers such as the TUI. Mutating operations report whether the task
//! list itself changed so the caller knows when to persist.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::{now_millis, Counts, Filter, Task};

/// Result of [`TaskList::save_edit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Renamed,
    Removed,
    Unchanged,
}

impl EditOutcome {
    pub fn changed(self) -> bool {
        !matches!(self, EditOutcome::Unchanged)
    }
}

/// One state-manager operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add(String),
    Toggle(String),
    Remove(String),
    BeginEdit(String),
    CancelEdit,
    SaveEdit(String, String),
    ClearCompleted,
    SetFilter(Filter),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskList {
    tasks: Vec<Task>,
    filter: Filter,
    #[serde(skip)]
    editing_id: Option<String>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap tasks that already satisfy the list invariants (as returned by
    /// `TaskStorage::load`).
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            filter: Filter::All,
            editing_id: None,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing_id.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn counts(&self) -> Counts {
        Counts::of(&self.tasks)
    }

    /// Tasks passing the current filter, in list order.
    pub fn visible(&self) -> Vec<&Task> {
        self.visible_with(self.filter)
    }

    pub fn visible_with(&self, filter: Filter) -> Vec<&Task> {
        self.tasks.iter().filter(|task| filter.matches(task)).collect()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Prepend a new task. Returns `None` when the trimmed title is empty.
    pub fn add(&mut self, raw_title: &str) -> Option<&Task> {
        self.add_at(raw_title, now_millis())
    }

    pub fn add_at(&mut self, raw_title: &str, created_at: i64) -> Option<&Task> {
        let title = raw_title.trim();
        if title.is_empty() {
            return None;
        }
        let mut task = Task::new(title, created_at);
        while self.get(&task.id).is_some() {
            task = Task::new(title, created_at);
        }
        tracing::debug!(id = %task.id, "task added");
        self.tasks.insert(0, task);
        self.tasks.first()
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.completed = !task.completed;
                tracing::debug!(id, completed = task.completed, "task toggled");
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        let removed = self.tasks.len() != before;
        if removed {
            if self.editing_id.as_deref() == Some(id) {
                self.editing_id = None;
            }
            tracing::debug!(id, "task removed");
        }
        removed
    }

    /// Enter inline edit mode for `id`. Unknown ids are ignored.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.editing_id = Some(id.to_string());
        true
    }

    /// Leave edit mode without touching the title.
    pub fn cancel_edit(&mut self) {
        self.editing_id = None;
    }

    /// Commit an inline edit: an empty trimmed title deletes the task.
    pub fn save_edit(&mut self, id: &str, raw_title: &str) -> EditOutcome {
        self.editing_id = None;
        let title = raw_title.trim();
        if title.is_empty() {
            return if self.remove(id) {
                EditOutcome::Removed
            } else {
                EditOutcome::Unchanged
            };
        }
        match self.get_mut(id) {
            Some(task) if task.title != title => {
                task.title = title.to_string();
                tracing::debug!(id, "task renamed");
                EditOutcome::Renamed
            }
            _ => EditOutcome::Unchanged,
        }
    }

    /// Drop every completed task; returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        let removed = before - self.tasks.len();
        let editing_gone = self
            .editing_id
            .as_deref()
            .is_some_and(|id| self.get(id).is_none());
        if editing_gone {
            self.editing_id = None;
        }
        if removed > 0 {
            tracing::debug!(removed, "cleared completed tasks");
        }
        removed
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Apply an action; returns whether the task list changed.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Add(title) => self.add(&title).is_some(),
            Action::Toggle(id) => self.toggle(&id),
            Action::Remove(id) => self.remove(&id),
            Action::BeginEdit(id) => {
                self.begin_edit(&id);
                false
            }
            Action::CancelEdit => {
                self.cancel_edit();
                false
            }
            Action::SaveEdit(id, title) => self.save_edit(&id, &title).changed(),
            Action::ClearCompleted => self.clear_completed() > 0,
            Action::SetFilter(filter) => {
                self.set_filter(filter);
                false
            }
        }
    }

    /// Resolve an exact id or a unique id prefix.
    pub fn resolve_id(&self, query: &str) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
        }
        if let Some(task) = self.get(query) {
            return Ok(task.id.clone());
        }
        let matches: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| task.id.starts_with(query))
            .collect();
        match matches.as_slice() {
            [] => Err(Error::TaskNotFound(query.to_string())),
            [task] => Ok(task.id.clone()),
            many => Err(Error::AmbiguousTask {
                prefix: query.to_string(),
                count: many.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(list: &TaskList) -> Vec<&str> {
        list.tasks().iter().map(|task| task.title.as_str()).collect()
    }

    fn id_of(list: &TaskList, title: &str) -> String {
        list.tasks()
            .iter()
            .find(|task| task.title == title)
            .map(|task| task.id.clone())
            .expect("task present")
    }

    #[test]
    fn add_trims_and_prepends() {
        let mut list = TaskList::new();
        list.add("first");
        let added = list.add("  second  ").cloned().expect("added");
        assert_eq!(added.title, "second");
        assert!(!added.completed);
        assert_eq!(titles(&list), vec!["second", "first"]);
        assert_eq!(list.counts().total, 2);
    }

    #[test]
    fn add_ignores_blank_titles() {
        let mut list = TaskList::new();
        assert!(list.add("").is_none());
        assert!(list.add("   ").is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn toggle_twice_restores_flag() {
        let mut list = TaskList::new();
        list.add("a");
        list.add("b");
        let id = id_of(&list, "a");
        let before = list.clone();
        assert!(list.toggle(&id));
        assert!(list.get(&id).unwrap().completed);
        assert!(!list.get(&id_of(&list, "b")).unwrap().completed);
        assert!(list.toggle(&id));
        assert_eq!(list, before);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let mut list = TaskList::new();
        list.add("a");
        let before = list.clone();
        assert!(!list.toggle("missing"));
        assert!(!list.remove("missing"));
        assert!(!list.begin_edit("missing"));
        assert_eq!(list.save_edit("missing", "x"), EditOutcome::Unchanged);
        assert_eq!(list, before);
    }

    #[test]
    fn save_edit_trims_or_removes() {
        let mut list = TaskList::new();
        list.add("old");
        list.add("keep");
        let id = id_of(&list, "old");

        assert!(list.begin_edit(&id));
        assert_eq!(list.editing_id(), Some(id.as_str()));
        assert_eq!(list.save_edit(&id, "  new  "), EditOutcome::Renamed);
        assert_eq!(list.get(&id).unwrap().title, "new");
        assert_eq!(list.editing_id(), None);

        list.begin_edit(&id);
        assert_eq!(list.save_edit(&id, "   "), EditOutcome::Removed);
        assert!(list.get(&id).is_none());
        assert_eq!(list.editing_id(), None);
        assert_eq!(titles(&list), vec!["keep"]);
    }

    #[test]
    fn cancel_edit_keeps_title() {
        let mut list = TaskList::new();
        list.add("original");
        let id = id_of(&list, "original");
        list.begin_edit(&id);
        list.cancel_edit();
        assert_eq!(list.editing_id(), None);
        assert_eq!(list.get(&id).unwrap().title, "original");
    }

    #[test]
    fn clear_completed_is_idempotent() {
        let mut list = TaskList::new();
        list.add("a");
        list.add("b");
        list.add("c");
        list.toggle(&id_of(&list, "b"));

        assert_eq!(list.clear_completed(), 1);
        let once = list.clone();
        assert_eq!(list.clear_completed(), 0);
        assert_eq!(list, once);
        assert_eq!(titles(&list), vec!["c", "a"]);
    }

    #[test]
    fn visible_partitions_by_filter_in_order() {
        let mut list = TaskList::new();
        for title in ["a", "b", "c", "d"] {
            list.add(title);
        }
        list.toggle(&id_of(&list, "b"));
        list.toggle(&id_of(&list, "d"));

        let names = |tasks: Vec<&Task>| -> Vec<String> {
            tasks.into_iter().map(|task| task.title.clone()).collect()
        };
        list.set_filter(Filter::Active);
        assert_eq!(names(list.visible()), vec!["c", "a"]);
        list.set_filter(Filter::Completed);
        assert_eq!(names(list.visible()), vec!["d", "b"]);
        list.set_filter(Filter::All);
        assert_eq!(names(list.visible()), vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn apply_reports_list_changes_only() {
        let mut list = TaskList::new();
        assert!(list.apply(Action::Add("a".to_string())));
        assert!(!list.apply(Action::Add("  ".to_string())));
        let id = id_of(&list, "a");
        assert!(!list.apply(Action::BeginEdit(id.clone())));
        assert!(!list.apply(Action::SetFilter(Filter::Active)));
        assert_eq!(list.filter(), Filter::Active);
        assert!(!list.apply(Action::SaveEdit(id.clone(), "a".to_string())));
        assert!(list.apply(Action::Toggle(id.clone())));
        assert!(list.apply(Action::ClearCompleted));
        assert!(!list.apply(Action::ClearCompleted));
        assert!(!list.apply(Action::Remove(id)));
    }

    #[test]
    fn end_to_end_scenario() {
        let mut list = TaskList::new();
        list.add("Buy milk");
        list.add("Walk dog");
        assert_eq!(titles(&list), vec!["Walk dog", "Buy milk"]);

        list.toggle(&id_of(&list, "Buy milk"));
        assert_eq!(
            list.counts(),
            Counts {
                active: 1,
                completed: 1,
                total: 2
            }
        );

        list.set_filter(Filter::Completed);
        let visible: Vec<&str> = list.visible().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(visible, vec!["Buy milk"]);

        list.clear_completed();
        assert_eq!(titles(&list), vec!["Walk dog"]);
        assert_eq!(
            list.counts(),
            Counts {
                active: 1,
                completed: 0,
                total: 1
            }
        );
    }

    #[test]
    fn resolve_id_accepts_unique_prefix() {
        let list = TaskList::from_tasks(vec![
            Task {
                id: "abc-1".to_string(),
                title: "a".to_string(),
                created_at: 0,
                completed: false,
            },
            Task {
                id: "abd-2".to_string(),
                title: "b".to_string(),
                created_at: 0,
                completed: false,
            },
        ]);
        assert_eq!(list.resolve_id("abc").unwrap(), "abc-1");
        assert_eq!(list.resolve_id("abd-2").unwrap(), "abd-2");
        assert!(matches!(
            list.resolve_id("ab"),
            Err(Error::AmbiguousTask { count: 2, .. })
        ));
        assert!(matches!(list.resolve_id("zz"), Err(Error::TaskNotFound(_))));
        assert!(matches!(list.resolve_id(" "), Err(Error::InvalidArgument(_))));
    }
}

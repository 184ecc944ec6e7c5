//! tdl - a persistent to-do list
//!
//! This library provides the core of the tdl CLI and terminal viewer: a task
//! list state manager and the round-trip of that list through a local
//! key-value store.
//!
//! # Core Concepts
//!
//! - **Task**: id, title, creation time, completion flag
//! - **Filter**: All, Active (not completed), Completed
//! - **Session**: a task list loaded from storage and saved after each change
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `tdl.toml`
//! - `error`: Error types and result aliases
//! - `list`: Task list state and operations
//! - `lock`: File locking and atomic writes
//! - `output`: Human and JSON command output
//! - `session`: Load-on-open, save-on-change state container
//! - `storage`: Task list persistence (permissive load, whole-list save)
//! - `store`: Key-value store trait, file and in-memory backends
//! - `task`: Task record, filters, derived counts
//! - `ui`: Interactive terminal viewer

pub mod cli;
pub mod config;
pub mod error;
pub mod list;
pub mod lock;
pub mod output;
pub mod session;
pub mod storage;
pub mod store;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
pub use list::{Action, EditOutcome, TaskList};
pub use session::Session;
pub use storage::TaskStorage;
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use task::{Counts, Filter, Task};

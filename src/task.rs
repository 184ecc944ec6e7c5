//! Task records and list filters.
//!
//! A task is persisted as `{"id", "title", "createdAt", "completed"}` where
//! `createdAt` is a Unix timestamp in milliseconds.

use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub created_at: i64,
    pub completed: bool,
}

impl Task {
    /// New incomplete task with a fresh id. `title` must already be trimmed.
    pub fn new(title: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            created_at,
            completed: false,
        }
    }

    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created_at)
    }

    /// Creation time in the local zone, formatted with a chrono format string.
    /// Out-of-range timestamps and unusable formats render as `-`.
    pub fn created_at_display(&self, format: &str) -> String {
        let Some(ts) = self.created_at_utc() else {
            return TIME_PLACEHOLDER.to_string();
        };
        let mut out = String::new();
        match write!(out, "{}", ts.with_timezone(&Local).format(format)) {
            Ok(()) => out,
            Err(_) => TIME_PLACEHOLDER.to_string(),
        }
    }

    /// First characters of the id, for compact display.
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(SHORT_ID_LEN)
            .map(|(idx, _)| idx)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }
}

pub const SHORT_ID_LEN: usize = 8;

const TIME_PLACEHOLDER: &str = "-";

/// Milliseconds since the Unix epoch, the unit stored in `createdAt`.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// View selector over the task list.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Active, Filter::Completed];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    /// Next filter in All → Active → Completed → All order.
    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Active,
            Filter::Active => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" | "done" => Ok(Filter::Completed),
            other => Err(Error::InvalidArgument(format!(
                "unknown filter '{other}' (expected all, active, completed)"
            ))),
        }
    }
}

/// Derived counts over the full list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub active: usize,
    pub completed: usize,
    pub total: usize,
}

impl Counts {
    pub fn of(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            active: total - completed,
            completed,
            total,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} active · {} completed · {} total",
            self.active, self.completed, self.total
        )
    }
}

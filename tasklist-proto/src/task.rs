//! The task entity and its identifier.
//!
//! A [`Task`] is the only persisted entity. Its JSON shape is
//! `{_id, title, description, dueDate, createdOn, completed}`; both dates are
//! RFC 3339 UTC timestamps on the wire.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a task, based on UUID v7 for time-ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new time-ordered task identifier (UUID v7).
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `TaskId` from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID value.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a string is not a valid task identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid task id: {0}")]
pub struct InvalidTaskId(pub String);

impl FromStr for TaskId {
    type Err = InvalidTaskId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| InvalidTaskId(s.to_string()))
    }
}

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Storage-assigned identifier, immutable for the task's lifetime.
    #[serde(rename = "_id")]
    pub id: TaskId,
    /// Short title, never empty.
    pub title: String,
    /// Free-form description, never empty.
    pub description: String,
    /// When the task is due.
    pub due_date: DateTime<Utc>,
    /// When the task was created. Set once, never modified.
    pub created_on: DateTime<Utc>,
    /// Whether the task has been marked done.
    pub completed: bool,
}

impl Task {
    /// Creates a pending task stamped with the current time.
    #[must_use]
    pub fn new(title: String, description: String, due_date: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::new(),
            title,
            description,
            due_date,
            created_on: Utc::now(),
            completed: false,
        }
    }

    /// Returns the due date as a calendar date string (`YYYY-MM-DD`),
    /// the form a date input field expects.
    #[must_use]
    pub fn due_date_input(&self) -> String {
        self.due_date.format("%Y-%m-%d").to_string()
    }
}

/// Parses a due date from either a calendar date (`2025-08-01`, taken as
/// midnight UTC) or a full RFC 3339 timestamp.
///
/// Returns `None` if the string is neither.
#[must_use]
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

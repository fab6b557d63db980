//! REST contract between the task service and its clients.
//!
//! Request bodies, response envelopes, the list sort key, and the route
//! paths. Both sides build URLs through [`paths`] so the two can never drift.

use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskId};

/// Query parameter name carrying the sort key on `GET /tasks`.
pub const SORT_QUERY_PARAM: &str = "sortBy";

/// Body of the create and update requests.
///
/// Every field is optional on the wire so that a missing field reaches the
/// schema check and is reported as a validation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    /// Task title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Task description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Due date, `YYYY-MM-DD` or RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl TaskDraft {
    /// Builds a draft from form values, trimming the text fields the way
    /// the client form does before submitting.
    #[must_use]
    pub fn from_form(title: &str, description: &str, due_date: &str) -> Self {
        Self {
            title: Some(title.trim().to_string()),
            description: Some(description.trim().to_string()),
            due_date: Some(due_date.trim().to_string()),
        }
    }
}

/// Body of the complete / not-complete requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionUpdate {
    /// New value of the task's `completed` flag.
    pub completed: bool,
}

/// Success body of every mutating route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    /// The affected task, post-mutation (pre-deletion for delete).
    pub task: Task,
    /// Human-readable outcome.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of every failure response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable failure description.
    pub message: String,
}

/// Server-side ordering applied to `GET /tasks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Ascending by `dueDate`.
    DueDate,
    /// Ascending by `createdOn`.
    CreatedOn,
}

impl SortKey {
    /// Parses the `sortBy` query value.
    ///
    /// `dateCreated` is what clients send for creation order; `createdOn`,
    /// the stored field name, is accepted too. Anything else yields `None`,
    /// meaning natural (insertion) order.
    #[must_use]
    pub fn from_query(value: &str) -> Option<Self> {
        match value {
            "dueDate" => Some(Self::DueDate),
            "dateCreated" | "createdOn" => Some(Self::CreatedOn),
            _ => None,
        }
    }

    /// Returns the value sent in the `sortBy` query parameter.
    #[must_use]
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::DueDate => "dueDate",
            Self::CreatedOn => "dateCreated",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DueDate => write!(f, "due date"),
            Self::CreatedOn => write!(f, "date created"),
        }
    }
}

/// Sorts tasks ascending by the given key.
///
/// The sort is stable: tasks with equal keys keep their natural order.
pub fn sort_tasks(tasks: &mut [Task], key: SortKey) {
    match key {
        SortKey::DueDate => tasks.sort_by_key(|t| t.due_date),
        SortKey::CreatedOn => tasks.sort_by_key(|t| t.created_on),
    }
}

/// Route paths, relative to the service base URL.
pub mod paths {
    use super::TaskId;

    /// `GET` list of all tasks.
    pub const LIST: &str = "/tasks";
    /// `POST` create a task.
    pub const CREATE: &str = "/tasks/todo";

    /// `PATCH` mark a task complete.
    #[must_use]
    pub fn complete(id: &TaskId) -> String {
        format!("/tasks/complete/{id}")
    }

    /// `PATCH` mark a task not complete.
    #[must_use]
    pub fn not_complete(id: &TaskId) -> String {
        format!("/tasks/notComplete/{id}")
    }

    /// `DELETE` a task.
    #[must_use]
    pub fn delete(id: &TaskId) -> String {
        format!("/tasks/delete/{id}")
    }

    /// `PUT` replace a task's title, description and due date.
    #[must_use]
    pub fn update(id: &TaskId) -> String {
        format!("/tasks/update/{id}")
    }
}

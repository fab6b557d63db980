//! Required-field constraints applied before any task write.
//!
//! The store runs [`validate`] on every draft it persists, so a task missing
//! a title, description, or usable due date can never reach storage. Nothing
//! here knows about HTTP.

use chrono::{DateTime, Utc};
use tasklist_proto::api::TaskDraft;
use tasklist_proto::task::parse_due_date;

/// A draft that satisfied the schema, with text fields trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTask {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Trimmed, non-empty description.
    pub description: String,
    /// Parsed due date.
    pub due_date: DateTime<Utc>,
}

/// A schema constraint that a draft violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// A required field was absent or blank.
    #[error("`{0}` is required")]
    Required(&'static str),

    /// The due date was present but not a date.
    #[error("`dueDate` is not a valid date: {0:?}")]
    InvalidDate(String),
}

/// Checks a draft against the task schema.
///
/// # Errors
///
/// Returns the first violated constraint, checking `title`, `description`
/// and `dueDate` in that order.
pub fn validate(draft: &TaskDraft) -> Result<ValidTask, SchemaError> {
    let title = required_text(draft.title.as_deref(), "title")?;
    let description = required_text(draft.description.as_deref(), "description")?;
    let raw_due = required_text(draft.due_date.as_deref(), "dueDate")?;
    let due_date = parse_due_date(&raw_due).ok_or(SchemaError::InvalidDate(raw_due))?;

    Ok(ValidTask {
        title,
        description,
        due_date,
    })
}

fn required_text(value: Option<&str>, field: &'static str) -> Result<String, SchemaError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(SchemaError::Required(field)),
    }
}

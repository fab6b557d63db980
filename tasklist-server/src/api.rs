//! Route handlers for the task collection.
//!
//! Every handler returns `Result<_, ApiError>`. Not-found and schema
//! failures become `400 {message}`; storage failures are logged and become
//! `500 {message}` with an operation-specific message.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tasklist_proto::api::{CompletionUpdate, ErrorBody, SortKey, TaskDraft, TaskEnvelope};
use tasklist_proto::task::{Task, TaskId};

use crate::schema;
use crate::store::{StoreError, TaskStore};

/// Shared handler state.
pub struct ApiState<S> {
    /// Task persistence backend.
    pub store: S,
}

impl<S: TaskStore> ApiState<S> {
    /// Wraps a store for use as axum state.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }
}

/// The operations exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET /tasks`
    List,
    /// `POST /tasks/todo`
    Create,
    /// `PATCH /tasks/complete/{id}`
    Complete,
    /// `PATCH /tasks/notComplete/{id}`
    NotComplete,
    /// `DELETE /tasks/delete/{id}`
    Delete,
    /// `PUT /tasks/update/{id}`
    Update,
}

impl Operation {
    /// Message returned alongside the task on success, if any.
    #[must_use]
    pub const fn success_message(self) -> Option<&'static str> {
        match self {
            Self::List | Self::Complete => None,
            Self::Create => Some("New task created successfully"),
            Self::NotComplete => Some("Task set to `not complete`"),
            Self::Delete => Some("Task deleted successfully"),
            Self::Update => Some("Task updated successfully!"),
        }
    }

    /// Message returned with a 500 when storage fails.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::List => "Error grabbing tasks!",
            Self::Create => "Error creating the tasks!",
            Self::Complete => "Error completing the task!",
            Self::NotComplete => "Error setting the task to `not complete`!",
            Self::Delete => "Error deleting the task!",
            Self::Update => "Error updating the task!",
        }
    }
}

/// Category of a handler failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request body was malformed or violated the schema.
    Validation,
    /// No task has the requested id.
    NotFound,
    /// The store failed.
    Storage,
}

/// A failed request, rendered as `{message}` with a matching status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    /// A malformed or schema-violating request.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
        }
    }

    /// The referenced task does not exist.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: "Task not found!".to_string(),
        }
    }

    /// Maps a store error raised while performing `op`.
    ///
    /// Schema violations stay client errors; everything else is logged and
    /// hidden behind the operation's generic failure message.
    #[must_use]
    pub fn from_store(op: Operation, err: StoreError) -> Self {
        match err {
            StoreError::Schema(e) => Self::validation(e.to_string()),
            other => {
                tracing::error!(operation = ?op, error = %other, "storage failure");
                Self {
                    kind: ErrorKind::Storage,
                    message: op.failure_message().to_string(),
                }
            }
        }
    }

    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the HTTP status this error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self.kind {
            ErrorKind::Validation | ErrorKind::NotFound => StatusCode::BAD_REQUEST,
            ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

/// Query string of `GET /tasks`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ListQuery {
    /// Requested ordering; unknown values mean natural order.
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

type Shared<S> = State<Arc<ApiState<S>>>;

/// Parses a path id. Anything that is not a task id cannot name a task.
fn parse_id(raw: &str) -> Result<TaskId, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found())
}

/// Reads the `completed` flag from a toggle request body.
///
/// An empty body falls back to the value the route implies.
fn parse_completion(body: &[u8], implied: bool) -> Result<bool, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(implied);
    }
    serde_json::from_slice::<CompletionUpdate>(body)
        .map(|update| update.completed)
        .map_err(|e| ApiError::validation(format!("invalid request body: {e}")))
}

fn envelope(op: Operation, task: Task) -> Json<TaskEnvelope> {
    Json(TaskEnvelope {
        task,
        message: op.success_message().map(String::from),
    })
}

/// `GET /tasks?sortBy=dueDate|dateCreated`
pub async fn list_tasks<S: TaskStore>(
    State(state): Shared<S>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let sort = query.sort_by.as_deref().and_then(SortKey::from_query);
    tracing::debug!(sort_by = ?query.sort_by, resolved = ?sort, "listing tasks");

    let tasks = state
        .store
        .list(sort)
        .await
        .map_err(|e| ApiError::from_store(Operation::List, e))?;
    Ok(Json(tasks))
}

/// `POST /tasks/todo`
pub async fn create_task<S: TaskStore>(
    State(state): Shared<S>,
    payload: Result<Json<TaskDraft>, JsonRejection>,
) -> Result<Json<TaskEnvelope>, ApiError> {
    let Json(draft) = payload?;
    let task = state
        .store
        .create(&draft)
        .await
        .map_err(|e| ApiError::from_store(Operation::Create, e))?;

    tracing::info!(task_id = %task.id, "task created");
    Ok(envelope(Operation::Create, task))
}

/// `PATCH /tasks/complete/{id}`
pub async fn complete_task<S: TaskStore>(
    State(state): Shared<S>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<TaskEnvelope>, ApiError> {
    set_completed(&state, Operation::Complete, &id, &body, true).await
}

/// `PATCH /tasks/notComplete/{id}`
pub async fn not_complete_task<S: TaskStore>(
    State(state): Shared<S>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<TaskEnvelope>, ApiError> {
    set_completed(&state, Operation::NotComplete, &id, &body, false).await
}

async fn set_completed<S: TaskStore>(
    state: &ApiState<S>,
    op: Operation,
    raw_id: &str,
    body: &[u8],
    implied: bool,
) -> Result<Json<TaskEnvelope>, ApiError> {
    let id = parse_id(raw_id)?;
    let completed = parse_completion(body, implied)?;

    let task = state
        .store
        .set_completed(&id, completed)
        .await
        .map_err(|e| ApiError::from_store(op, e))?
        .ok_or_else(ApiError::not_found)?;

    tracing::info!(task_id = %task.id, completed, "task completion changed");
    Ok(envelope(op, task))
}

/// `DELETE /tasks/delete/{id}`
pub async fn delete_task<S: TaskStore>(
    State(state): Shared<S>,
    Path(id): Path<String>,
) -> Result<Json<TaskEnvelope>, ApiError> {
    let id = parse_id(&id)?;
    let task = state
        .store
        .delete(&id)
        .await
        .map_err(|e| ApiError::from_store(Operation::Delete, e))?
        .ok_or_else(ApiError::not_found)?;

    tracing::info!(task_id = %task.id, "task deleted");
    Ok(envelope(Operation::Delete, task))
}

/// `PUT /tasks/update/{id}`
///
/// The body is validated before the id is looked up, so a bad body is
/// reported even when the id names no task.
pub async fn update_task<S: TaskStore>(
    State(state): Shared<S>,
    Path(id): Path<String>,
    payload: Result<Json<TaskDraft>, JsonRejection>,
) -> Result<Json<TaskEnvelope>, ApiError> {
    let Json(draft) = payload?;
    schema::validate(&draft).map_err(|e| ApiError::validation(e.to_string()))?;
    let id = parse_id(&id)?;
    let task = state
        .store
        .replace_fields(&id, &draft)
        .await
        .map_err(|e| ApiError::from_store(Operation::Update, e))?
        .ok_or_else(ApiError::not_found)?;

    tracing::info!(task_id = %task.id, "task updated");
    Ok(envelope(Operation::Update, task))
}

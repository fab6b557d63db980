//! Task persistence.
//!
//! Defines the [`TaskStore`] trait the route handlers are written against,
//! plus the concrete backends:
//! - [`memory::MemoryStore`] — insertion-ordered in-process collection
//! - [`sqlite::SqliteStore`] — the collection as a SQLite table behind a
//!   connection pool
//!
//! [`DocumentStore`] picks a backend from a database connection string.

pub mod memory;
pub mod sqlite;

use std::future::Future;

use tasklist_proto::api::{SortKey, TaskDraft};
use tasklist_proto::task::{Task, TaskId};

use crate::schema::SchemaError;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The draft violated the task schema; nothing was written.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The database rejected the statement or could not be reached.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data could not be turned back into tasks.
    #[error("stored collection is corrupt: {0}")]
    Corrupt(String),

    /// The connection string names a backend that does not exist.
    #[error("unsupported database url {0:?}")]
    UnsupportedUrl(String),
}

/// Single-collection task storage.
///
/// Lookups by id return `Ok(None)` when the task does not exist. Every
/// operation touches at most one task and applies atomically, so two
/// concurrent writes to the same id resolve as last-write-wins.
pub trait TaskStore: Send + Sync {
    /// Returns every task, sorted ascending by `sort` or in insertion order.
    fn list(
        &self,
        sort: Option<SortKey>,
    ) -> impl Future<Output = Result<Vec<Task>, StoreError>> + Send;

    /// Validates the draft and inserts a new pending task.
    fn create(&self, draft: &TaskDraft) -> impl Future<Output = Result<Task, StoreError>> + Send;

    /// Sets the `completed` flag, returning the updated task.
    fn set_completed(
        &self,
        id: &TaskId,
        completed: bool,
    ) -> impl Future<Output = Result<Option<Task>, StoreError>> + Send;

    /// Validates the draft and replaces title, description and due date.
    ///
    /// `id`, `createdOn` and `completed` are left untouched.
    fn replace_fields(
        &self,
        id: &TaskId,
        draft: &TaskDraft,
    ) -> impl Future<Output = Result<Option<Task>, StoreError>> + Send;

    /// Permanently removes a task, returning it as it was before removal.
    fn delete(&self, id: &TaskId) -> impl Future<Output = Result<Option<Task>, StoreError>> + Send;
}

/// A store backend chosen at startup from the database connection string.
pub enum DocumentStore {
    /// Volatile in-process collection.
    Memory(MemoryStore),
    /// SQLite database, on disk or in memory.
    Sqlite(SqliteStore),
}

impl DocumentStore {
    /// Opens the backend named by `database_url`.
    ///
    /// Accepted forms:
    /// - `memory://` or `memory`
    /// - `sqlite://path/tasks.db`, `sqlite:///absolute/tasks.db` or
    ///   `sqlite::memory:`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsupportedUrl`] for any other scheme, or
    /// [`StoreError::Database`] if the database cannot be opened.
    pub async fn open(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let trimmed = database_url.trim();
        if trimmed == "memory" || trimmed.starts_with("memory://") {
            return Ok(Self::Memory(MemoryStore::new()));
        }

        if trimmed.starts_with("sqlite:") {
            let store = SqliteStore::connect(trimmed, max_connections).await?;
            return Ok(Self::Sqlite(store));
        }

        Err(StoreError::UnsupportedUrl(trimmed.to_string()))
    }

    /// Short backend name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Sqlite(_) => "sqlite",
        }
    }
}

impl TaskStore for DocumentStore {
    async fn list(&self, sort: Option<SortKey>) -> Result<Vec<Task>, StoreError> {
        match self {
            Self::Memory(s) => s.list(sort).await,
            Self::Sqlite(s) => s.list(sort).await,
        }
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        match self {
            Self::Memory(s) => s.create(draft).await,
            Self::Sqlite(s) => s.create(draft).await,
        }
    }

    async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<Option<Task>, StoreError> {
        match self {
            Self::Memory(s) => s.set_completed(id, completed).await,
            Self::Sqlite(s) => s.set_completed(id, completed).await,
        }
    }

    async fn replace_fields(
        &self,
        id: &TaskId,
        draft: &TaskDraft,
    ) -> Result<Option<Task>, StoreError> {
        match self {
            Self::Memory(s) => s.replace_fields(id, draft).await,
            Self::Sqlite(s) => s.replace_fields(id, draft).await,
        }
    }

    async fn delete(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        match self {
            Self::Memory(s) => s.delete(id).await,
            Self::Sqlite(s) => s.delete(id).await,
        }
    }
}

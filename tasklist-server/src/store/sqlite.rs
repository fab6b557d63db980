//! SQLite-backed task collection.
//!
//! Tasks live in a single `tasks` table. The `seq` column is an
//! autoincrement key recording insertion order, which is the collection's
//! natural order. Every mutation is one SQL statement (`INSERT`, or
//! `UPDATE`/`DELETE ... RETURNING`), so a write either applies completely or
//! not at all, and concurrent writes to one id resolve as last-write-wins.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tasklist_proto::api::{SortKey, TaskDraft};
use tasklist_proto::task::{Task, TaskId};

use super::{StoreError, TaskStore};
use crate::schema;

/// Default upper bound on pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

const COLUMNS: &str = "id, title, description, due_date, created_on, completed";

/// Task collection stored in SQLite behind a connection pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connects to `url` (e.g. `sqlite://tasks.db` or `sqlite::memory:`),
    /// creating the database file and the `tasks` table if missing.
    ///
    /// In-memory databases are pinned to a single long-lived connection so
    /// the data outlives idle connections.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the url is invalid, the database
    /// cannot be opened, or the table cannot be created.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = if is_in_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        }
        .connect_with(options)
        .await?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tasks (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL CHECK (length(trim(title)) > 0),
                description TEXT NOT NULL CHECK (length(trim(description)) > 0),
                due_date TEXT NOT NULL,
                created_on TEXT NOT NULL,
                completed INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn row_to_task(row: &SqliteRow) -> Result<Task, StoreError> {
    let raw_id: String = row.try_get("id")?;
    let id = raw_id
        .parse::<TaskId>()
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;

    Ok(Task {
        id,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        due_date: row.try_get::<DateTime<Utc>, _>("due_date")?,
        created_on: row.try_get::<DateTime<Utc>, _>("created_on")?,
        completed: row.try_get("completed")?,
    })
}

const fn list_sql(sort: Option<SortKey>) -> &'static str {
    // `seq` breaks ties so equal keys keep natural order.
    match sort {
        None => "SELECT id, title, description, due_date, created_on, completed FROM tasks ORDER BY seq",
        Some(SortKey::DueDate) => {
            "SELECT id, title, description, due_date, created_on, completed FROM tasks ORDER BY due_date, seq"
        }
        Some(SortKey::CreatedOn) => {
            "SELECT id, title, description, due_date, created_on, completed FROM tasks ORDER BY created_on, seq"
        }
    }
}

impl TaskStore for SqliteStore {
    async fn list(&self, sort: Option<SortKey>) -> Result<Vec<Task>, StoreError> {
        let rows = sqlx::query(list_sql(sort)).fetch_all(&self.pool).await?;
        rows.iter().map(row_to_task).collect()
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        let valid = schema::validate(draft)?;
        let task = Task::new(valid.title, valid.description, valid.due_date);

        sqlx::query(
            "INSERT INTO tasks (id, title, description, due_date, created_on, completed) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(task.id.to_string())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.due_date)
        .bind(task.created_on)
        .bind(task.completed)
        .execute(&self.pool)
        .await?;

        tracing::debug!(task_id = %task.id, "task row inserted");
        Ok(task)
    }

    async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query(&format!(
            "UPDATE tasks SET completed = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(completed)
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_task).transpose()
    }

    async fn replace_fields(
        &self,
        id: &TaskId,
        draft: &TaskDraft,
    ) -> Result<Option<Task>, StoreError> {
        let valid = schema::validate(draft)?;
        let row = sqlx::query(&format!(
            "UPDATE tasks SET title = ?, description = ?, due_date = ? \
             WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(valid.title)
        .bind(valid.description)
        .bind(valid.due_date)
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_task).transpose()
    }

    async fn delete(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        let row = sqlx::query(&format!("DELETE FROM tasks WHERE id = ? RETURNING {COLUMNS}"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_task).transpose()
    }
}

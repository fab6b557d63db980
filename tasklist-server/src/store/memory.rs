//! In-memory task collection.
//!
//! The [`MemoryStore`] keeps tasks in an [`IndexMap`] keyed by id, so lookups
//! are constant time and iteration yields insertion order, which is the
//! collection's natural order. Removal uses `shift_remove` to keep that order
//! intact.

use indexmap::IndexMap;
use tasklist_proto::api::{SortKey, TaskDraft, sort_tasks};
use tasklist_proto::task::{Task, TaskId};
use tokio::sync::RwLock;

use super::{StoreError, TaskStore};
use crate::schema;

/// Insertion-ordered task collection guarded by an async [`RwLock`].
pub struct MemoryStore {
    tasks: RwLock<IndexMap<TaskId, Task>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(IndexMap::new()),
        }
    }

    /// Creates a store pre-populated with `tasks`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if two tasks share an id.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, StoreError> {
        let mut map = IndexMap::with_capacity(tasks.len());
        for task in tasks {
            let id = task.id;
            if map.insert(id, task).is_some() {
                return Err(StoreError::Corrupt(format!("duplicate task id {id}")));
            }
        }
        Ok(Self {
            tasks: RwLock::new(map),
        })
    }

    /// Returns every task in natural order.
    pub async fn snapshot(&self) -> Vec<Task> {
        self.tasks.read().await.values().cloned().collect()
    }

    /// Returns the number of stored tasks.
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    /// Returns `true` if no tasks are stored.
    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

impl TaskStore for MemoryStore {
    async fn list(&self, sort: Option<SortKey>) -> Result<Vec<Task>, StoreError> {
        let mut tasks = self.snapshot().await;
        if let Some(key) = sort {
            sort_tasks(&mut tasks, key);
        }
        Ok(tasks)
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        let valid = schema::validate(draft)?;
        let task = Task::new(valid.title, valid.description, valid.due_date);
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<Option<Task>, StoreError> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.get_mut(id).map(|task| {
            task.completed = completed;
            task.clone()
        }))
    }

    async fn replace_fields(
        &self,
        id: &TaskId,
        draft: &TaskDraft,
    ) -> Result<Option<Task>, StoreError> {
        let valid = schema::validate(draft)?;
        let mut tasks = self.tasks.write().await;
        Ok(tasks.get_mut(id).map(|task| {
            task.title = valid.title;
            task.description = valid.description;
            task.due_date = valid.due_date;
            task.clone()
        }))
    }

    async fn delete(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.write().await.shift_remove(id))
    }
}

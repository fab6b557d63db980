//! Sync worker bridging the TUI with the task service.
//!
//! The TUI event loop is synchronous (crossterm poll-based), so all HTTP
//! traffic happens on a background tokio task. The main thread sends
//! [`SyncCommand`]s and drains [`SyncEvent`]s on each tick.
//!
//! ```text
//! TUI (main thread)  <-- SyncEvent ---  sync worker  <-- HTTP -->  task service
//!                    --- SyncCommand ->
//! ```
//!
//! The worker keeps no task state of its own. Every successful mutation is
//! followed by a full list fetch, and the resulting [`SyncEvent::Snapshot`]
//! replaces whatever the TUI was showing. A failed request emits
//! [`SyncEvent::Failed`] and skips the refresh; nothing is retried.

use tasklist_proto::api::{SortKey, TaskDraft, TaskEnvelope};
use tasklist_proto::task::{Task, TaskId};
use tokio::sync::mpsc;

use crate::client::{ApiClient, ClientError};

/// Default channel capacity for commands and events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// A change to submit to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Create a task from form values.
    Create(TaskDraft),
    /// Replace a task's title, description and due date.
    Update(TaskId, TaskDraft),
    /// Mark a task done.
    Complete(TaskId),
    /// Mark a task not done.
    NotComplete(TaskId),
    /// Delete a task.
    Delete(TaskId),
}

impl Mutation {
    /// Returns which kind of mutation this is.
    #[must_use]
    pub const fn kind(&self) -> MutationKind {
        match self {
            Self::Create(_) => MutationKind::Create,
            Self::Update(..) => MutationKind::Update,
            Self::Complete(_) => MutationKind::Complete,
            Self::NotComplete(_) => MutationKind::NotComplete,
            Self::Delete(_) => MutationKind::Delete,
        }
    }
}

/// Discriminant of a [`Mutation`], carried on events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// See [`Mutation::Create`].
    Create,
    /// See [`Mutation::Update`].
    Update,
    /// See [`Mutation::Complete`].
    Complete,
    /// See [`Mutation::NotComplete`].
    NotComplete,
    /// See [`Mutation::Delete`].
    Delete,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Complete => write!(f, "complete"),
            Self::NotComplete => write!(f, "not complete"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Commands sent from the TUI main loop to the sync worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCommand {
    /// Fetch the full list with the given sort.
    Refresh {
        /// Server-side ordering; `None` is natural order.
        sort: Option<SortKey>,
    },
    /// Apply a mutation, then refresh with the given sort.
    Mutate {
        /// The change to submit.
        mutation: Mutation,
        /// Ordering for the follow-up refresh.
        sort: Option<SortKey>,
    },
    /// Stop the worker.
    Shutdown,
}

/// Events sent from the sync worker to the TUI main loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The service's full current task list.
    Snapshot(Vec<Task>),
    /// A mutation succeeded.
    Mutated {
        /// Which mutation.
        kind: MutationKind,
        /// The affected task as the service returned it.
        task: Task,
        /// The service's outcome message, if any.
        message: Option<String>,
    },
    /// A request failed; its follow-up refresh was skipped.
    Failed {
        /// What was being attempted (`"refresh"` or a mutation name).
        action: String,
        /// Error description.
        error: String,
    },
}

/// Spawn the sync worker and return its channel handles.
///
/// Must be called from within a tokio runtime. The worker runs until it
/// receives [`SyncCommand::Shutdown`] or either channel closes.
#[must_use]
pub fn spawn_sync(
    client: ApiClient,
    capacity: usize,
) -> (mpsc::Sender<SyncCommand>, mpsc::Receiver<SyncEvent>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<SyncCommand>(capacity);
    let (evt_tx, evt_rx) = mpsc::channel::<SyncEvent>(capacity);

    tokio::spawn(async move {
        command_handler(client, cmd_rx, evt_tx).await;
    });

    (cmd_tx, evt_rx)
}

/// Background task: process commands one at a time, in order.
async fn command_handler(
    client: ApiClient,
    mut cmd_rx: mpsc::Receiver<SyncCommand>,
    evt_tx: mpsc::Sender<SyncEvent>,
) {
    while let Some(cmd) = cmd_rx.recv().await {
        let events = match cmd {
            SyncCommand::Shutdown => {
                tracing::info!("sync worker shutting down");
                break;
            }
            SyncCommand::Refresh { sort } => vec![refresh(&client, sort).await],
            SyncCommand::Mutate { mutation, sort } => {
                let kind = mutation.kind();
                match apply(&client, mutation).await {
                    Ok(envelope) => {
                        tracing::debug!(%kind, task_id = %envelope.task.id, "mutation applied");
                        vec![
                            SyncEvent::Mutated {
                                kind,
                                task: envelope.task,
                                message: envelope.message,
                            },
                            refresh(&client, sort).await,
                        ]
                    }
                    Err(e) => vec![failed(&kind.to_string(), &e)],
                }
            }
        };

        for event in events {
            if evt_tx.send(event).await.is_err() {
                tracing::debug!("event channel closed, stopping sync worker");
                return;
            }
        }
    }
}

async fn apply(client: &ApiClient, mutation: Mutation) -> Result<TaskEnvelope, ClientError> {
    match mutation {
        Mutation::Create(draft) => client.create(&draft).await,
        Mutation::Update(id, draft) => client.update(&id, &draft).await,
        Mutation::Complete(id) => client.complete(&id).await,
        Mutation::NotComplete(id) => client.not_complete(&id).await,
        Mutation::Delete(id) => client.delete(&id).await,
    }
}

async fn refresh(client: &ApiClient, sort: Option<SortKey>) -> SyncEvent {
    match client.list(sort).await {
        Ok(tasks) => SyncEvent::Snapshot(tasks),
        Err(e) => failed("refresh", &e),
    }
}

fn failed(action: &str, error: &ClientError) -> SyncEvent {
    tracing::warn!(action, error = %error, "request failed");
    SyncEvent::Failed {
        action: action.to_string(),
        error: error.to_string(),
    }
}

//! Integration tests for the TUI's sync worker against a live server.
//!
//! Verifies the command → HTTP → event flow: refreshes produce snapshots,
//! successful mutations produce `Mutated` followed by a fresh snapshot, and
//! failures produce `Failed` with no refresh.
//!
//! Verification command: `cargo test --test sync_worker`

use std::time::Duration;

use tokio::sync::mpsc;

use tasklist::app::App;
use tasklist::client::ApiClient;
use tasklist::net::{Mutation, MutationKind, SyncCommand, SyncEvent, spawn_sync};
use tasklist_proto::api::{SortKey, TaskDraft};
use tasklist_proto::task::TaskId;

// =============================================================================
// Test helpers
// =============================================================================

async fn setup() -> (mpsc::Sender<SyncCommand>, mpsc::Receiver<SyncEvent>) {
    let (addr, _handle) = tasklist_server::server::start_server("127.0.0.1:0")
        .await
        .unwrap();
    let client = ApiClient::new(&format!("http://{addr}")).unwrap();
    spawn_sync(client, 16)
}

/// Receives the next event, failing the test after a timeout.
async fn next_event(rx: &mut mpsc::Receiver<SyncEvent>) -> SyncEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for sync event")
        .expect("sync worker stopped")
}

fn create(title: &str, due: &str) -> SyncCommand {
    SyncCommand::Mutate {
        mutation: Mutation::Create(TaskDraft::from_form(title, "description", due)),
        sort: None,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn refresh_yields_snapshot() {
    let (tx, mut rx) = setup().await;

    tx.send(SyncCommand::Refresh { sort: None }).await.unwrap();
    assert_eq!(next_event(&mut rx).await, SyncEvent::Snapshot(Vec::new()));
}

#[tokio::test]
async fn create_yields_mutated_then_snapshot() {
    let (tx, mut rx) = setup().await;

    tx.send(create("Buy milk", "2025-08-01")).await.unwrap();

    let SyncEvent::Mutated {
        kind,
        task,
        message,
    } = next_event(&mut rx).await
    else {
        panic!("expected Mutated");
    };
    assert_eq!(kind, MutationKind::Create);
    assert_eq!(task.title, "Buy milk");
    assert_eq!(message.as_deref(), Some("New task created successfully"));

    assert_eq!(next_event(&mut rx).await, SyncEvent::Snapshot(vec![task]));
}

#[tokio::test]
async fn failed_mutation_skips_refresh() {
    let (tx, mut rx) = setup().await;

    tx.send(SyncCommand::Mutate {
        mutation: Mutation::Delete(TaskId::new()),
        sort: None,
    })
    .await
    .unwrap();
    tx.send(SyncCommand::Refresh { sort: None }).await.unwrap();

    let event = next_event(&mut rx).await;
    assert!(
        matches!(event, SyncEvent::Failed { ref action, ref error }
            if action == "delete" && error.contains("Task not found!")),
        "unexpected event: {event:?}"
    );
    // The next event is the explicit refresh, not one triggered by the failure.
    assert_eq!(next_event(&mut rx).await, SyncEvent::Snapshot(Vec::new()));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn refresh_after_mutation_uses_requested_sort() {
    let (tx, mut rx) = setup().await;

    tx.send(create("Late", "2025-12-01")).await.unwrap();
    next_event(&mut rx).await;
    next_event(&mut rx).await;

    tx.send(SyncCommand::Mutate {
        mutation: Mutation::Create(TaskDraft::from_form("Early", "description", "2025-01-01")),
        sort: Some(SortKey::DueDate),
    })
    .await
    .unwrap();
    next_event(&mut rx).await;

    let SyncEvent::Snapshot(tasks) = next_event(&mut rx).await else {
        panic!("expected Snapshot");
    };
    let titles: Vec<_> = tasks.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["Early", "Late"]);
}

#[tokio::test]
async fn app_state_follows_worker_events() {
    let (tx, mut rx) = setup().await;
    let mut app = App::new();

    tx.send(create("Buy milk", "2025-08-01")).await.unwrap();
    app.apply_event(next_event(&mut rx).await);
    app.apply_event(next_event(&mut rx).await);
    assert_eq!(app.pending.len(), 1);
    assert!(app.completed.is_empty());

    let id = app.pending[0].id;
    tx.send(SyncCommand::Mutate {
        mutation: Mutation::Complete(id),
        sort: None,
    })
    .await
    .unwrap();
    app.apply_event(next_event(&mut rx).await);
    app.apply_event(next_event(&mut rx).await);
    assert!(app.pending.is_empty());
    assert_eq!(app.completed.len(), 1);
    assert_eq!(app.completed[0].id, id);
}

//! End-to-end tests for the task service through the typed client.
//!
//! Each test starts an in-memory server on an ephemeral port and drives it
//! with [`ApiClient`], the same path the TUI's sync worker uses.
//!
//! Verification command: `cargo test --test task_api`

use reqwest::StatusCode;
use tasklist::client::{ApiClient, ClientError};
use tasklist_proto::api::{SortKey, TaskDraft};
use tasklist_proto::task::{TaskId, parse_due_date};

// =============================================================================
// Test helpers
// =============================================================================

/// Starts a fresh in-memory server and returns a client bound to it.
async fn setup() -> ApiClient {
    let (addr, _handle) = tasklist_server::server::start_server("127.0.0.1:0")
        .await
        .unwrap();
    ApiClient::new(&format!("http://{addr}")).unwrap()
}

fn draft(title: &str, description: &str, due: &str) -> TaskDraft {
    TaskDraft::from_form(title, description, due)
}

fn assert_status(err: &ClientError, status: StatusCode, message: &str) {
    match err {
        ClientError::Status {
            status: s,
            message: m,
        } => {
            assert_eq!(*s, status);
            assert_eq!(m, message);
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn create_complete_delete_lifecycle() {
    let client = setup().await;

    let created = client
        .create(&draft("Buy milk", "2%", "2025-08-01"))
        .await
        .unwrap();
    assert_eq!(
        created.message.as_deref(),
        Some("New task created successfully")
    );
    let task = created.task;
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.description, "2%");
    assert_eq!(task.due_date, parse_due_date("2025-08-01").unwrap());
    assert!(!task.completed);

    let listed = client.list(Some(SortKey::DueDate)).await.unwrap();
    assert_eq!(listed, vec![task.clone()]);

    let completed = client.complete(&task.id).await.unwrap();
    assert!(completed.task.completed);
    assert_eq!(completed.task.id, task.id);
    assert!(completed.message.is_none());

    let deleted = client.delete(&task.id).await.unwrap();
    assert_eq!(deleted.message.as_deref(), Some("Task deleted successfully"));
    assert_eq!(deleted.task.id, task.id);

    assert!(client.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn toggle_round_trip() {
    let client = setup().await;
    let task = client
        .create(&draft("Walk dog", "around the block", "2025-09-01"))
        .await
        .unwrap()
        .task;

    let done = client.complete(&task.id).await.unwrap().task;
    assert!(done.completed);

    let undone = client.not_complete(&task.id).await.unwrap();
    assert!(!undone.task.completed);
    assert_eq!(
        undone.message.as_deref(),
        Some("Task set to `not complete`")
    );

    let listed = client.list(None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].completed);
}

#[tokio::test]
async fn update_keeps_identity_and_completion() {
    let client = setup().await;
    let original = client
        .create(&draft("Old title", "old description", "2025-08-01"))
        .await
        .unwrap()
        .task;
    client.complete(&original.id).await.unwrap();

    let updated = client
        .update(&original.id, &draft("New title", "new description", "2025-12-24"))
        .await
        .unwrap();
    assert_eq!(updated.message.as_deref(), Some("Task updated successfully!"));

    let task = updated.task;
    assert_eq!(task.id, original.id);
    assert_eq!(task.created_on, original.created_on);
    assert!(task.completed);
    assert_eq!(task.title, "New title");
    assert_eq!(task.description, "new description");
    assert_eq!(task.due_date_input(), "2025-12-24");
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn missing_fields_are_rejected() {
    let client = setup().await;

    let err = client
        .create(&draft("", "description", "2025-08-01"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

    let err = client
        .create(&draft("title", "description", ""))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

    assert!(client.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn operations_on_missing_task_are_not_found() {
    let client = setup().await;
    let task = client
        .create(&draft("Short lived", "gone soon", "2025-08-01"))
        .await
        .unwrap()
        .task;
    client.delete(&task.id).await.unwrap();

    let err = client.delete(&task.id).await.unwrap_err();
    assert_status(&err, StatusCode::BAD_REQUEST, "Task not found!");

    let err = client.complete(&task.id).await.unwrap_err();
    assert_status(&err, StatusCode::BAD_REQUEST, "Task not found!");

    let err = client.not_complete(&TaskId::new()).await.unwrap_err();
    assert_status(&err, StatusCode::BAD_REQUEST, "Task not found!");

    let err = client
        .update(&TaskId::new(), &draft("t", "d", "2025-08-01"))
        .await
        .unwrap_err();
    assert_status(&err, StatusCode::BAD_REQUEST, "Task not found!");
}

// =============================================================================
// Ordering
// =============================================================================

#[tokio::test]
async fn list_orders_by_requested_key() {
    let client = setup().await;
    let late = client
        .create(&draft("Late", "due last", "2025-12-01"))
        .await
        .unwrap()
        .task;
    let early = client
        .create(&draft("Early", "due first", "2025-01-01"))
        .await
        .unwrap()
        .task;

    // Natural order is insertion order.
    let natural: Vec<_> = client.list(None).await.unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(natural, vec![late.id, early.id]);

    let by_due: Vec<_> = client
        .list(Some(SortKey::DueDate))
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(by_due, vec![early.id, late.id]);

    let by_created: Vec<_> = client
        .list(Some(SortKey::CreatedOn))
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(by_created, vec![late.id, early.id]);
}

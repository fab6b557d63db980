//! Router assembly and server startup.

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{delete, get, patch, post, put};
use tasklist_proto::api::paths;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::api::{self, ApiState};
use crate::store::{MemoryStore, TaskStore};

/// Builds the CORS policy: listed origins only, credentials allowed.
///
/// Origins that are not valid header values are skipped with a warning.
#[must_use]
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Builds the task API router over the given state.
pub fn router<S: TaskStore + 'static>(state: Arc<ApiState<S>>, cors: CorsLayer) -> Router {
    Router::new()
        .route(paths::LIST, get(api::list_tasks::<S>))
        .route(paths::CREATE, post(api::create_task::<S>))
        .route("/tasks/complete/{id}", patch(api::complete_task::<S>))
        .route("/tasks/notComplete/{id}", patch(api::not_complete_task::<S>))
        .route("/tasks/delete/{id}", delete(api::delete_task::<S>))
        .route("/tasks/update/{id}", put(api::update_task::<S>))
        .layer(cors)
        .with_state(state)
}

/// Starts an in-memory task server on the given address.
///
/// No CORS origins are allowed. This is the entry point used by tests and
/// embedding; `main.rs` uses [`start_server_with_state`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server(
    addr: &str,
) -> std::io::Result<(std::net::SocketAddr, tokio::task::JoinHandle<()>)> {
    start_server_with_state(addr, Arc::new(ApiState::new(MemoryStore::new())), &[]).await
}

/// Starts the task server over a pre-built [`ApiState`].
///
/// # Errors
///
/// Returns an error if the TCP listener cannot bind to the given address.
pub async fn start_server_with_state<S: TaskStore + 'static>(
    addr: &str,
    state: Arc<ApiState<S>>,
    allowed_origins: &[String],
) -> std::io::Result<(std::net::SocketAddr, tokio::task::JoinHandle<()>)> {
    let app = router(state, cors_layer(allowed_origins));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "task server error");
        }
    });

    Ok((bound_addr, handle))
}

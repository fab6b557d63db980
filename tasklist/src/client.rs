//! Typed HTTP client for the task service.
//!
//! One method per route. Any non-success status is turned into
//! [`ClientError::Status`] carrying the server's `{message}` when it sent one.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tasklist_proto::api::{
    CompletionUpdate, ErrorBody, SORT_QUERY_PARAM, SortKey, TaskDraft, TaskEnvelope, paths,
};
use tasklist_proto::task::{Task, TaskId};
use url::Url;

/// Errors returned by [`ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The configured base URL is not a valid URL.
    #[error("invalid service url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// The server's message, or the status reason if it sent none.
        message: String,
    },
}

impl ClientError {
    /// Returns the HTTP status if the service answered with an error.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// HTTP client bound to one service base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Creates a client for the service at `base_url`
    /// (e.g. `http://127.0.0.1:3000`).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base: Url::parse(base_url)?,
        })
    }

    /// Returns the service base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Appends a route path to the base URL, keeping any base path prefix.
    fn url(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let joined = format!("{}{path}", self.base.path().trim_end_matches('/'));
        url.set_path(&joined);
        url
    }

    /// `GET /tasks`, optionally sorted server-side.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-success status.
    pub async fn list(&self, sort: Option<SortKey>) -> Result<Vec<Task>, ClientError> {
        let mut url = self.url(paths::LIST);
        if let Some(key) = sort {
            url.query_pairs_mut()
                .append_pair(SORT_QUERY_PARAM, key.as_query());
        }
        send(self.http.get(url)).await
    }

    /// `POST /tasks/todo`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-success status.
    pub async fn create(&self, draft: &TaskDraft) -> Result<TaskEnvelope, ClientError> {
        send(self.http.post(self.url(paths::CREATE)).json(draft)).await
    }

    /// `PATCH /tasks/complete/{id}` with `{completed: true}`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-success status.
    pub async fn complete(&self, id: &TaskId) -> Result<TaskEnvelope, ClientError> {
        let body = CompletionUpdate { completed: true };
        send(self.http.patch(self.url(&paths::complete(id))).json(&body)).await
    }

    /// `PATCH /tasks/notComplete/{id}` with `{completed: false}`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-success status.
    pub async fn not_complete(&self, id: &TaskId) -> Result<TaskEnvelope, ClientError> {
        let body = CompletionUpdate { completed: false };
        send(self.http.patch(self.url(&paths::not_complete(id))).json(&body)).await
    }

    /// `DELETE /tasks/delete/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-success status.
    pub async fn delete(&self, id: &TaskId) -> Result<TaskEnvelope, ClientError> {
        send(self.http.delete(self.url(&paths::delete(id)))).await
    }

    /// `PUT /tasks/update/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-success status.
    pub async fn update(&self, id: &TaskId, draft: &TaskDraft) -> Result<TaskEnvelope, ClientError> {
        send(self.http.put(self.url(&paths::update(id))).json(draft)).await
    }
}

/// Sends a request and decodes a success body, or maps the failure.
async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };
        return Err(ClientError::Status { status, message });
    }
    Ok(response.json::<T>().await?)
}

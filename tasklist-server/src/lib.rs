//! tasklist server library.
//!
//! Exposes the REST task service for use in tests and embedding. The
//! service keeps a single collection of tasks behind a [`store::TaskStore`]
//! and serves create, list, toggle, update, and delete over HTTP.

pub mod api;
pub mod config;
pub mod schema;
pub mod server;
pub mod store;

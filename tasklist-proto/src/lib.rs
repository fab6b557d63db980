//! Shared wire model for the tasklist service and client.

pub mod api;
pub mod task;

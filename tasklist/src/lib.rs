//! Terminal to-do list client for the tasklist task service.

pub mod app;
pub mod client;
pub mod config;
pub mod net;
pub mod ui;

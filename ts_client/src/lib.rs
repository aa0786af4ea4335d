//! Terminal frontends for a websocket poker table.
//!
//! Both frontends drive a [`table_sync::Session`]; they differ only in how
//! the presenter draws entities and where commands come from.

pub mod commands;
pub mod config;
pub mod describe;
pub mod line_client;
pub mod logging;
pub mod tui_app;

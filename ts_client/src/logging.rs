//! Logging setup.
//!
//! `table_sync` logs through the `log` facade; `tracing-subscriber` picks
//! those records up through its `tracing-log` bridge. The TUI owns the
//! terminal, so in that mode everything goes to a file instead of stderr.

use std::{fs::OpenOptions, path::Path, sync::Mutex};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tungstenite=warn"))
}

/// Initialize logging to stderr for line mode.
pub fn init_stderr() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .init();

    tracing::debug!("logging to stderr");
}

/// Initialize logging to `path`, appending, for TUI mode.
///
/// # Errors
///
/// Returns error if the log file cannot be opened.
pub fn init_file(path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .init();

    tracing::info!("logging to {}", path.display());
    Ok(())
}

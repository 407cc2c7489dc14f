//! Opsbrief: local-first field situation reporting.
//!
//! Reports are composed from structured fields, compiled to a line-based
//! markup text, and stored flat; the display renderer and document codec
//! both re-parse that text through one classifier. Consolidation windows
//! stored reports by distinct report-day and synthesises a command
//! briefing through an external generate endpoint.

pub mod config;
pub mod consolidation;
pub mod db;
pub mod export;
pub mod markup;
pub mod media;
pub mod models;
pub mod report;

use tracing_subscriber::EnvFilter;

/// Initialises tracing from `RUST_LOG`, falling back to the app default.
/// Call once at process start.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}

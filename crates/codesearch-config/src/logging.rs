//! Process-wide `tracing` initialization.
//!
//! Matches the lifecycle-at-info / detail-at-debug / recoverable-at-warn
//! density the rest of the workspace uses, driven by the resolved
//! `AppConfig::log_level` (itself overridable by `RUST_LOG`).

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global `tracing` subscriber. Safe to call once per
/// process; a second call is a no-op that logs a warning rather than
/// panicking, since test binaries may attempt it more than once.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::warn!("tracing subscriber already initialized; ignoring second init_logging call");
    }
}

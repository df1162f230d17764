//! Process-wide logging initialization (§9a).
//!
//! `tracing_subscriber::EnvFilter` (`RUST_LOG`) controls verbosity, the same
//! convention the reference crate drives through `env_logger`, upgraded to
//! the `tracing` ecosystem since this crate's ambient stack is span-structured
//! throughout (see `util::logging::span_frame_processing`), not just leaf
//! `log` calls. `env_logger` is initialized alongside it so the `log` facade
//! (used by a few leaf helpers) still reaches the same output.

use log::{debug, error, info, log_enabled, warn, Level};
use tracing_subscriber::EnvFilter;

/// Initialize both the `tracing` and `log` backends from `RUST_LOG`,
/// defaulting to `info` when unset.
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    let _ = env_logger::try_init();
}

/// Logs an error message.
pub fn log_error(message: &str) {
    if log_enabled!(Level::Error) {
        error!("{message}");
    }
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}

/// Logs a debug message.
pub fn log_debug(message: &str) {
    if log_enabled!(Level::Debug) {
        debug!("{message}");
    }
}

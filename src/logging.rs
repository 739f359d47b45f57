//! Logger initialization and leveled logging helpers.

use log::{log_enabled, warn, Level};

/// Initializes the logger with the `env_logger` crate.
///
/// Verbosity is controlled through `RUST_LOG`, e.g. `RUST_LOG=psem_tables=debug`
/// traces every fetch, cache hit and skipped optional section.
pub fn init_logger() {
    env_logger::init();
}

/// Initializes the logger at a fixed default level unless `RUST_LOG` is set.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger_with_level(level: log::LevelFilter) {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// Logs a warning message.
pub fn log_warn(message: &str) {
    if log_enabled!(Level::Warn) {
        warn!("{message}");
    }
}

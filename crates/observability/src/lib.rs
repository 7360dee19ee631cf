//! Tracing/logging setup shared by processes embedding the identity core.

/// Initialize process-wide tracing with settings read from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&tracing::LogConfig::from_env());
}

/// Tracing configuration (filters, formatters).
pub mod tracing;

pub use self::tracing::{LogConfig, LogFormat};

//! Tracing subscriber setup for embedding services and tests.
//!
//! The crate itself only emits through `tracing` macros; installing a
//! subscriber is left to the binary. These helpers cover the common cases.

use tracing_subscriber::EnvFilter;

/// Output format for a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output for development.
    #[default]
    Pretty,
    /// Newline-delimited JSON for log shippers.
    Json,
}

/// Installs a subscriber honoring `RUST_LOG`, defaulting to `planforge=info`.
///
/// Safe to call more than once; later calls are no-ops, which keeps tests
/// that each initialize logging from stepping on one another.
pub fn init() {
    init_with(LogFormat::Pretty, "planforge=info");
}

/// Installs a subscriber with an explicit format and fallback filter.
pub fn init_with(format: LogFormat, default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let result = match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init_with(LogFormat::Json, "planforge=debug");
        // Second call must not panic.
    }
}

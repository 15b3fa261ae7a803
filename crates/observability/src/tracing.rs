//! Tracing subscriber initialization.
//!
//! JSON lines with timestamps. Verbosity comes from `RUST_LOG`, e.g.
//! `RUST_LOG=orderdesk_infra=debug`.

use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Filter from `RUST_LOG`, falling back to `default`.
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber. Returns `false` if one was already installed.
pub fn try_init_with(filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .with_current_span(true)
        .try_init()
        .is_ok()
}

/// Human-readable output routed through the test harness capture.
///
/// Returns `false` if a subscriber was already installed.
pub fn try_init_for_tests(directive: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_test_writer()
        .try_init()
        .is_ok()
}

/// Initialize tracing for the process. Safe to call multiple times.
pub fn init() {
    let _ = try_init_with(env_filter(DEFAULT_FILTER));
}

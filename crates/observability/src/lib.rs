//! Process-wide logging setup shared by every binary embedding the order desk.

/// Initialize process-wide observability (structured JSON logs).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Subscriber configuration (filters, formatting).
pub mod tracing;

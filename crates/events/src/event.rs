use chrono::{DateTime, Utc};

/// A fact produced by an aggregate decision.
///
/// Events are immutable and named with a stable dotted identifier
/// (e.g. `"sales.order.status_changed"`) so logs stay greppable across versions.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// Business time of the fact.
    fn occurred_at(&self) -> DateTime<Utc>;
}

//! Aggregate root traits for records whose state changes go through decisions.

/// Aggregate root marker + minimal interface.
pub trait AggregateRoot {
    /// Strongly-typed aggregate identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;

    /// Number of events applied to this instance since it was loaded or created.
    fn version(&self) -> u64;
}

/// Decide/apply split for aggregates.
///
/// - `handle(&self, cmd)` validates a command against current state and returns the
///   events it would produce. It never mutates and never performs IO.
/// - `apply(&mut self, event)` evolves state from one event.
///
/// Anything with side effects (persisting records, appending stock movements) is done
/// by the infrastructure layer from the returned events.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + core::fmt::Debug;
    type Event: Clone + core::fmt::Debug;
    type Error: core::fmt::Debug;

    fn apply(&mut self, event: &Self::Event);

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;
}

//! Value objects: compared by value, never by identity.
//!
//! `Money`, `VatRate` and order lines are value objects. To change one, build a new
//! one.

/// Marker trait for value objects.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

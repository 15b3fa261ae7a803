//! `orderdesk-core`: shared domain building blocks.
//!
//! Identifiers, the domain error model, aggregate/entity/value-object traits,
//! money arithmetic and the explicit session context. No IO lives here.

pub mod aggregate;
pub mod context;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use context::SessionContext;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, TenantId, UserId};
pub use money::{Money, VatRate};
pub use value_object::ValueObject;

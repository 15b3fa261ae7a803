//! Tenant-scoped document storage.
//!
//! Records (orders, products, clients, invoices) live in collections partitioned by
//! `TenantId`. Writes publish `Change`s to live subscribers after they commit.

pub mod collection;
pub mod document;
pub mod error;
pub mod in_memory;

pub use collection::DocumentCollection;
pub use document::Document;
pub use error::StoreError;
pub use in_memory::InMemoryCollection;

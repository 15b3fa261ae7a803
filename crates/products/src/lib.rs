//! Product catalog records.
//!
//! Products are plain tenant-scoped documents. Current stock is never stored on the
//! product; it is derived from the stock ledger and invoices by the reporting layer.

pub mod product;

pub use product::{Product, ProductId, ProductStatus, RegisterProduct};

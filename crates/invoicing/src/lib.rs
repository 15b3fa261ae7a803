//! Invoice records.
//!
//! Within this workspace invoices matter as the source of sold quantities for stock
//! reporting. Invoice lines reference products by description (the product name),
//! not by id.

pub mod invoice;

pub use invoice::{Invoice, InvoiceId, InvoiceItem, InvoiceStatus, IssueInvoice};

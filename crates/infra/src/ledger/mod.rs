//! Stock movement ledger boundary.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryStockLedger;
pub use r#trait::StockLedger;

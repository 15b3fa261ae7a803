//! Infrastructure layer: storage collaborators, order orchestration, read models.
//!
//! Domain crates decide; this crate writes. `OrderLifecycleManager` and
//! `StockAdjuster` compose the `DocumentCollection` and `StockLedger` traits, so
//! the in-memory implementations here can be swapped for remote backends without
//! touching domain code.

pub mod clock;
pub mod config;
pub mod ledger;
pub mod order_manager;
pub mod projections;
pub mod stock_adjuster;
pub mod store;


pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, OrderDeskConfig};
pub use ledger::{InMemoryStockLedger, StockLedger};
pub use order_manager::{OrderError, OrderLifecycleManager, StatusTransition, WriteStage};
pub use projections::{OrderBook, StockReports};
pub use stock_adjuster::{AdjustError, StockAdjuster};
pub use store::{Document, DocumentCollection, InMemoryCollection, StoreError};

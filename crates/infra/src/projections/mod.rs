//! Read-side projections.
//!
//! Both are disposable: `OrderBook` is rebuilt from the orders collection and
//! follows its change feed, stock reports are recomputed on every call.

pub mod order_book;
pub mod stock_levels;

pub use order_book::OrderBook;
pub use stock_levels::{
    HistoryEntry, HistoryKind, HistoryWindow, SalesStats, StockReports, StockStatus,
    StockSummary,
};

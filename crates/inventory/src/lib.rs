//! Stock ledger domain.
//!
//! The ledger is append-only: every quantity change is a `StockMovement`, and no
//! stored counter is trusted as "current stock". This crate holds the movement
//! records and the rules for manual stock corrections; storage lives in
//! `orderdesk-infra`.

pub mod adjustment;
pub mod movement;

pub use adjustment::{AdjustmentMode, AdjustmentOutcome, StockAdjustment};
pub use movement::{
    MovementKind, NewStockMovement, StockMovement, StockMovementId, net_quantity_for_reference,
};

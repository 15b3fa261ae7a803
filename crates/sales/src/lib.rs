//! Orders domain module.
//!
//! Pure business rules for customer orders: draft validation, initial status
//! derivation, numbering, the stock impact of status transitions, and list queries.
//! No IO; `orderdesk-infra` persists the results.

pub mod draft;
pub mod listing;
pub mod numbering;
pub mod order;
pub mod transition;

pub use draft::{ClientSelection, DeliveryChoice, LineDraft, OrderDraft, OrderPatch, ValidatedOrder};
pub use listing::{
    DateWindow, OrderFilter, OrderSort, OrderStats, Page, SortDirection, SortKey, paginate,
    query_orders,
};
pub use numbering::{DEFAULT_ORDER_PREFIX, format_order_number, next_order_number};
pub use order::{
    ChangeStatus, Order, OrderAggregate, OrderClient, OrderCommand, OrderEvent, OrderId,
    OrderItem, OrderPlaced, OrderRemoved, OrderRevised, OrderStatus, OrderStatusChanged,
    OrderTotals, PlaceOrder, RemoveOrder, ReviseOrder,
};
pub use transition::{StockImpact, derive_initial_status};

//! Order lifecycle orchestration.
//!
//! The manager is the only writer of order records. Each operation runs the same
//! pipeline the rest of the workspace uses for aggregates:
//!
//! ```text
//! load record (tenant-scoped)
//!   ↓
//! decide (OrderAggregate::handle, pure)
//!   ↓
//! write: order record and stock ledger batch, with compensation
//!   ↓
//! apply + return
//! ```
//!
//! The order record and the ledger batch are two separate writes. Their order is
//! fixed per operation and a failure of the second write triggers a compensating
//! write of the first:
//!
//! | operation       | first write        | second write   | compensation          |
//! |-----------------|--------------------|----------------|-----------------------|
//! | `create`        | add order          | debit batch    | delete the order      |
//! | `update_status` | movement batch     | update order   | append reverse batch  |
//! | `delete`        | return batch       | delete order   | append reverse batch  |
//!
//! A failed compensation is logged at `error` and the original failure is returned.

use chrono::{DateTime, Datelike, Utc};
use thiserror::Error;

use orderdesk_core::{Aggregate, AggregateId, DomainError, SessionContext};
use orderdesk_inventory::{NewStockMovement, StockMovement};
use orderdesk_products::ProductId;
use orderdesk_sales::{
    ChangeStatus, Order, OrderAggregate, OrderCommand, OrderDraft, OrderEvent, OrderId,
    OrderPatch, OrderStatus, PlaceOrder, RemoveOrder, ReviseOrder, StockImpact,
    next_order_number,
};

use crate::clock::Clock;
use crate::config::OrderDeskConfig;
use crate::ledger::StockLedger;
use crate::store::{DocumentCollection, StoreError};

/// Which storage step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    LoadOrders,
    SaveOrder,
    AppendMovements,
    RemoveOrder,
}

impl core::fmt::Display for WriteStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            WriteStage::LoadOrders => "loading orders",
            WriteStage::SaveOrder => "saving the order",
            WriteStage::AppendMovements => "appending stock movements",
            WriteStage::RemoveOrder => "removing the order",
        })
    }
}

#[derive(Debug, Error)]
pub enum OrderError {
    /// Rejected input; nothing was written.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("order not found")]
    NotFound,

    /// Storage failure. Compensations (if any) have already been attempted.
    #[error("{stage} failed: {source}")]
    RemoteWrite {
        stage: WriteStage,
        #[source]
        source: StoreError,
    },
}

impl OrderError {
    fn remote(stage: WriteStage) -> impl FnOnce(StoreError) -> OrderError {
        move |source| OrderError::RemoteWrite { stage, source }
    }
}

impl From<DomainError> for OrderError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound => OrderError::NotFound,
            DomainError::Validation(msg)
            | DomainError::InvariantViolation(msg)
            | DomainError::InvalidId(msg)
            | DomainError::Conflict(msg) => OrderError::Validation(msg),
        }
    }
}

/// Outcome of `update_status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTransition {
    pub order: Order,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub stock_impact: StockImpact,
    /// Movements appended for this transition (empty for `Unchanged`).
    pub movements: Vec<StockMovement>,
}

/// Order CRUD plus the stock debit/credit that follows status changes.
///
/// Generic over the order collection `O`, the stock ledger `L` and the clock `K` so
/// tests run against in-memory collaborators and a fixed clock.
#[derive(Debug)]
pub struct OrderLifecycleManager<O, L, K> {
    orders: O,
    ledger: L,
    clock: K,
    config: OrderDeskConfig,
}

impl<O, L, K> OrderLifecycleManager<O, L, K> {
    pub fn new(orders: O, ledger: L, clock: K, config: OrderDeskConfig) -> Self {
        Self {
            orders,
            ledger,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &OrderDeskConfig {
        &self.config
    }

    pub fn into_parts(self) -> (O, L, K) {
        (self.orders, self.ledger, self.clock)
    }

    /// Stock effect of moving `order` to `new_status`, without writing anything.
    pub fn stock_impact(order: &Order, new_status: OrderStatus) -> StockImpact {
        order.stock_impact(new_status)
    }
}

impl<O, L, K> OrderLifecycleManager<O, L, K>
where
    O: DocumentCollection<Order>,
    L: StockLedger,
    K: Clock,
{
    pub fn get(&self, ctx: &SessionContext, id: OrderId) -> Result<Option<Order>, OrderError> {
        self.orders
            .get(ctx.tenant_id(), id.0)
            .map_err(OrderError::remote(WriteStage::LoadOrders))
    }

    pub fn list(&self, ctx: &SessionContext) -> Result<Vec<Order>, OrderError> {
        self.orders
            .list(ctx.tenant_id())
            .map_err(OrderError::remote(WriteStage::LoadOrders))
    }

    /// Create an order from a draft and debit stock for every line.
    pub fn create(&self, ctx: &SessionContext, draft: OrderDraft) -> Result<Order, OrderError> {
        let tenant_id = ctx.tenant_id();
        let now = self.clock.now();

        // Reject bad input before touching storage.
        draft.validate()?;

        let existing = self.list(ctx)?;
        let number = next_order_number(&self.config.order_prefix, now.year(), &existing);

        let order_id = OrderId::new(AggregateId::new());
        let mut aggregate = OrderAggregate::empty(order_id);
        let order = decide_and_apply(
            &mut aggregate,
            OrderCommand::PlaceOrder(PlaceOrder {
                tenant_id,
                order_id,
                number,
                draft,
                occurred_at: now,
            }),
        )?
        .ok_or(OrderError::NotFound)?;

        let order = self
            .orders
            .add(tenant_id, order)
            .map_err(OrderError::remote(WriteStage::SaveOrder))?;

        let batch = if order.stock_debited() {
            stock_batch(ctx, &order, StockImpact::Debit, now)
        } else {
            Vec::new()
        };

        if let Err(source) = self.ledger.append(tenant_id, batch) {
            self.undo_add(ctx, &order);
            return Err(OrderError::RemoteWrite {
                stage: WriteStage::AppendMovements,
                source,
            });
        }

        tracing::info!(
            tenant_id = %tenant_id,
            actor = ctx.actor_name(),
            order_number = order.number(),
            status = %order.status(),
            lines = order.items().len(),
            total = %order.totals().total_ttc,
            "order created"
        );

        Ok(order)
    }

    /// Edit client, dates, VAT choice or lines. Stock is left as it is.
    pub fn update(
        &self,
        ctx: &SessionContext,
        id: OrderId,
        patch: OrderPatch,
    ) -> Result<Order, OrderError> {
        let tenant_id = ctx.tenant_id();
        let current = self.get(ctx, id)?.ok_or(OrderError::NotFound)?;
        let number = current.number().to_string();

        let mut aggregate = OrderAggregate::loaded(current);
        let revised = decide_and_apply(
            &mut aggregate,
            OrderCommand::ReviseOrder(ReviseOrder {
                tenant_id,
                order_id: id,
                patch,
                occurred_at: self.clock.now(),
            }),
        )?
        .ok_or(OrderError::NotFound)?;

        let revised = self
            .orders
            .update(tenant_id, revised)
            .map_err(OrderError::remote(WriteStage::SaveOrder))?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = ctx.actor_name(),
            order_number = %number,
            total = %revised.totals().total_ttc,
            "order updated"
        );

        Ok(revised)
    }

    /// Delete an order, returning its stock first if it was debited.
    pub fn delete(&self, ctx: &SessionContext, id: OrderId) -> Result<(), OrderError> {
        let tenant_id = ctx.tenant_id();
        let now = self.clock.now();
        let order = self.get(ctx, id)?.ok_or(OrderError::NotFound)?;

        let aggregate = OrderAggregate::loaded(order.clone());
        let events = aggregate.handle(&OrderCommand::RemoveOrder(RemoveOrder {
            tenant_id,
            order_id: id,
            occurred_at: now,
        }))?;
        let impact = combined_impact(&events);

        let batch = stock_batch(ctx, &order, impact, now);
        let appended = self
            .ledger
            .append(tenant_id, batch.clone())
            .map_err(OrderError::remote(WriteStage::AppendMovements))?;

        if let Err(source) = self.orders.delete(tenant_id, id.0) {
            self.undo_append(ctx, order.number(), &batch, now);
            return Err(OrderError::RemoteWrite {
                stage: WriteStage::RemoveOrder,
                source,
            });
        }

        tracing::info!(
            tenant_id = %tenant_id,
            actor = ctx.actor_name(),
            order_number = order.number(),
            stock_impact = ?impact,
            movements = appended.len(),
            "order deleted"
        );

        Ok(())
    }

    /// Move an order to `new_status`, debiting or returning stock as the
    /// transition requires.
    ///
    /// An id that does not resolve is a silent no-op (`Ok(None)`).
    pub fn update_status(
        &self,
        ctx: &SessionContext,
        id: OrderId,
        new_status: OrderStatus,
    ) -> Result<Option<StatusTransition>, OrderError> {
        let tenant_id = ctx.tenant_id();
        let now = self.clock.now();

        let Some(order) = self.get(ctx, id)? else {
            tracing::warn!(
                tenant_id = %tenant_id,
                order_id = %id,
                status = %new_status,
                "status change for unknown order ignored"
            );
            return Ok(None);
        };

        let from = order.status();
        let mut aggregate = OrderAggregate::loaded(order);
        let events = aggregate.handle(&OrderCommand::ChangeStatus(ChangeStatus {
            tenant_id,
            order_id: id,
            status: new_status,
            occurred_at: now,
        }))?;
        let impact = combined_impact(&events);
        for e in &events {
            aggregate.apply(e);
        }
        let updated = aggregate.into_order().ok_or(OrderError::NotFound)?;
        let number = updated.number().to_string();

        let batch = stock_batch(ctx, &updated, impact, now);
        let movements = self
            .ledger
            .append(tenant_id, batch.clone())
            .map_err(OrderError::remote(WriteStage::AppendMovements))?;

        let updated = match self.orders.update(tenant_id, updated) {
            Ok(order) => order,
            Err(source) => {
                self.undo_append(ctx, &number, &batch, now);
                return Err(OrderError::RemoteWrite {
                    stage: WriteStage::SaveOrder,
                    source,
                });
            }
        };

        tracing::info!(
            tenant_id = %tenant_id,
            actor = ctx.actor_name(),
            order_number = updated.number(),
            from = %from,
            to = %new_status,
            stock_impact = ?impact,
            movements = movements.len(),
            "order status changed"
        );

        Ok(Some(StatusTransition {
            order: updated,
            from,
            to: new_status,
            stock_impact: impact,
            movements,
        }))
    }

    fn undo_add(&self, ctx: &SessionContext, order: &Order) {
        match self.orders.delete(ctx.tenant_id(), order.id().0) {
            Ok(()) => tracing::warn!(
                tenant_id = %ctx.tenant_id(),
                order_number = order.number(),
                "order removed after failed stock debit"
            ),
            Err(err) => tracing::error!(
                tenant_id = %ctx.tenant_id(),
                order_number = order.number(),
                error = %err,
                "compensation failed: order saved without stock debit"
            ),
        }
    }

    fn undo_append(
        &self,
        ctx: &SessionContext,
        order_number: &str,
        batch: &[NewStockMovement],
        at: DateTime<Utc>,
    ) {
        if batch.is_empty() {
            return;
        }
        let reversal: Vec<NewStockMovement> = batch.iter().map(|m| m.reversal(at)).collect();
        match self.ledger.append(ctx.tenant_id(), reversal) {
            Ok(appended) => tracing::warn!(
                tenant_id = %ctx.tenant_id(),
                order_number,
                movements = appended.len(),
                "stock movements reversed after failed order write"
            ),
            Err(err) => tracing::error!(
                tenant_id = %ctx.tenant_id(),
                order_number,
                error = %err,
                "compensation failed: stock ledger out of step with order"
            ),
        }
    }
}

/// Run `command` against `aggregate`, apply the resulting events and return the
/// record afterwards.
fn decide_and_apply(
    aggregate: &mut OrderAggregate,
    command: OrderCommand,
) -> Result<Option<Order>, OrderError> {
    let events = aggregate.handle(&command)?;
    for e in &events {
        aggregate.apply(e);
    }
    Ok(aggregate.order().cloned())
}

fn combined_impact(events: &[OrderEvent]) -> StockImpact {
    events
        .iter()
        .map(OrderEvent::stock_impact)
        .find(|i| i.moves_stock())
        .unwrap_or(StockImpact::Unchanged)
}

/// One movement per order line for `impact`.
fn stock_batch(
    ctx: &SessionContext,
    order: &Order,
    impact: StockImpact,
    at: DateTime<Utc>,
) -> Vec<NewStockMovement> {
    let make: fn(&SessionContext, ProductId, &str, i64, &str, DateTime<Utc>) -> NewStockMovement =
        match impact {
            StockImpact::Debit => NewStockMovement::order_debit,
            StockImpact::Return => NewStockMovement::order_return,
            StockImpact::Unchanged => return Vec::new(),
        };

    order
        .items()
        .iter()
        .map(|item| {
            make(
                ctx,
                item.product_id,
                &item.product_name,
                item.quantity,
                order.number(),
                at,
            )
        })
        .collect()
}

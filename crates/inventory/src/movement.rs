use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderdesk_core::{AggregateId, Entity, SessionContext, TenantId, UserId};
use orderdesk_events::{Event, TenantScoped};
use orderdesk_products::ProductId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StockMovementId(pub AggregateId);

impl StockMovementId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for StockMovementId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Why stock moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Stock leaving for an order (negative quantity).
    OrderOut,
    /// Stock coming back from a cancelled or deleted order (positive quantity).
    OrderCancelReturn,
    /// Manual correction.
    Adjustment,
    InitialStock,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::OrderOut => "order_out",
            MovementKind::OrderCancelReturn => "order_cancel_return",
            MovementKind::Adjustment => "adjustment",
            MovementKind::InitialStock => "initial_stock",
        }
    }
}

pub const ORDER_DEBIT_REASON: &str = "Order";
pub const ORDER_RETURN_REASON: &str = "Order cancellation";

/// A movement ready to be appended (no ledger position yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStockMovement {
    pub id: StockMovementId,
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    /// Product name at the time of the movement.
    pub product_name: String,
    pub kind: MovementKind,
    /// Signed delta: negative leaves stock, positive enters it.
    pub quantity: i64,
    pub reason: String,
    /// Business reference, e.g. the order number.
    pub reference: Option<String>,
    pub previous_stock: Option<i64>,
    pub new_stock: Option<i64>,
    pub actor_id: UserId,
    pub actor_name: String,
    pub occurred_at: DateTime<Utc>,
}

impl NewStockMovement {
    fn for_order(
        ctx: &SessionContext,
        kind: MovementKind,
        product_id: ProductId,
        product_name: &str,
        quantity: i64,
        reason: &str,
        order_number: &str,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: StockMovementId::new(AggregateId::new()),
            tenant_id: ctx.tenant_id(),
            product_id,
            product_name: product_name.to_string(),
            kind,
            quantity,
            reason: reason.to_string(),
            reference: Some(order_number.to_string()),
            previous_stock: None,
            new_stock: None,
            actor_id: ctx.actor_id(),
            actor_name: ctx.actor_name().to_string(),
            occurred_at,
        }
    }

    /// Stock leaving for an order line; `quantity` is the (positive) ordered amount.
    pub fn order_debit(
        ctx: &SessionContext,
        product_id: ProductId,
        product_name: &str,
        quantity: i64,
        order_number: &str,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self::for_order(
            ctx,
            MovementKind::OrderOut,
            product_id,
            product_name,
            -quantity,
            ORDER_DEBIT_REASON,
            order_number,
            occurred_at,
        )
    }

    /// Stock returned from an order line; `quantity` is the (positive) ordered amount.
    pub fn order_return(
        ctx: &SessionContext,
        product_id: ProductId,
        product_name: &str,
        quantity: i64,
        order_number: &str,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self::for_order(
            ctx,
            MovementKind::OrderCancelReturn,
            product_id,
            product_name,
            quantity,
            ORDER_RETURN_REASON,
            order_number,
            occurred_at,
        )
    }

    /// Manual correction from `previous_stock` to `new_stock`.
    pub fn adjustment(
        ctx: &SessionContext,
        product_id: ProductId,
        product_name: &str,
        previous_stock: i64,
        new_stock: i64,
        reason: &str,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: StockMovementId::new(AggregateId::new()),
            tenant_id: ctx.tenant_id(),
            product_id,
            product_name: product_name.to_string(),
            kind: MovementKind::Adjustment,
            quantity: new_stock.saturating_sub(previous_stock),
            reason: reason.to_string(),
            reference: None,
            previous_stock: Some(previous_stock),
            new_stock: Some(new_stock),
            actor_id: ctx.actor_id(),
            actor_name: ctx.actor_name().to_string(),
            occurred_at,
        }
    }

    /// The movement that cancels this one out (same product and reference).
    pub fn reversal(&self, occurred_at: DateTime<Utc>) -> Self {
        let kind = match self.kind {
            MovementKind::OrderOut => MovementKind::OrderCancelReturn,
            MovementKind::OrderCancelReturn => MovementKind::OrderOut,
            other => other,
        };
        let reason = match kind {
            MovementKind::OrderOut => ORDER_DEBIT_REASON.to_string(),
            MovementKind::OrderCancelReturn => ORDER_RETURN_REASON.to_string(),
            _ => self.reason.clone(),
        };

        Self {
            id: StockMovementId::new(AggregateId::new()),
            kind,
            quantity: self.quantity.saturating_neg(),
            reason,
            previous_stock: None,
            new_stock: None,
            occurred_at,
            ..self.clone()
        }
    }

    /// Attach the ledger position assigned on append.
    pub fn into_stored(self, position: u64) -> StockMovement {
        StockMovement {
            id: self.id,
            tenant_id: self.tenant_id,
            position,
            product_id: self.product_id,
            product_name: self.product_name,
            kind: self.kind,
            quantity: self.quantity,
            reason: self.reason,
            reference: self.reference,
            previous_stock: self.previous_stock,
            new_stock: self.new_stock,
            actor_id: self.actor_id,
            actor_name: self.actor_name,
            occurred_at: self.occurred_at,
        }
    }
}

/// A movement as recorded in the ledger. Never mutated after append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: StockMovementId,
    pub tenant_id: TenantId,
    /// Monotonically increasing position in the tenant's ledger (starts at 1).
    pub position: u64,
    pub product_id: ProductId,
    pub product_name: String,
    pub kind: MovementKind,
    pub quantity: i64,
    pub reason: String,
    pub reference: Option<String>,
    pub previous_stock: Option<i64>,
    pub new_stock: Option<i64>,
    pub actor_id: UserId,
    pub actor_name: String,
    pub occurred_at: DateTime<Utc>,
}

impl StockMovement {
    pub fn is_adjustment_of(&self, product_id: ProductId) -> bool {
        self.kind == MovementKind::Adjustment && self.product_id == product_id
    }

    pub fn references(&self, reference: &str) -> bool {
        self.reference.as_deref() == Some(reference)
    }
}

impl Entity for StockMovement {
    type Id = StockMovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for StockMovement {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl Event for StockMovement {
    fn event_type(&self) -> &'static str {
        match self.kind {
            MovementKind::OrderOut => "inventory.stock.order_out",
            MovementKind::OrderCancelReturn => "inventory.stock.order_cancel_return",
            MovementKind::Adjustment => "inventory.stock.adjusted",
            MovementKind::InitialStock => "inventory.stock.initial",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Net signed quantity of all movements carrying `reference`.
///
/// Zero for an order whose debits have all been returned.
pub fn net_quantity_for_reference<'a>(
    movements: impl IntoIterator<Item = &'a StockMovement>,
    reference: &str,
) -> i64 {
    movements
        .into_iter()
        .filter(|m| m.references(reference))
        .map(|m| m.quantity)
        .sum()
}

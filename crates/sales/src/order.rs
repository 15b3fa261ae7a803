use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderdesk_core::{
    Aggregate, AggregateId, AggregateRoot, DomainError, Money, TenantId, ValueObject, VatRate,
};
use orderdesk_events::Event;
use orderdesk_parties::ClientId;
use orderdesk_products::ProductId;

use crate::draft::{OrderDraft, OrderPatch, ValidatedOrder};
use crate::transition::{StockImpact, derive_initial_status};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Fulfillment status. `InDelivery` and `Delivered` are active: stock is debited
/// while the order is in either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    #[serde(rename = "en_cours_livraison")]
    InDelivery,
    #[serde(rename = "livre")]
    Delivered,
    #[serde(rename = "annule")]
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::InDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn is_active(self) -> bool {
        matches!(self, OrderStatus::InDelivery | OrderStatus::Delivered)
    }

    /// Stored status code.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::InDelivery => "en_cours_livraison",
            OrderStatus::Delivered => "livre",
            OrderStatus::Cancelled => "annule",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown order status: {s}")))
    }
}

/// Who the order is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderClient {
    /// A registered company client; `name` is a snapshot taken when selected.
    Company { client_id: ClientId, name: String },
    /// A walk-in customer known only by name.
    Individual { name: String },
}

impl OrderClient {
    pub fn display_name(&self) -> &str {
        match self {
            OrderClient::Company { name, .. } | OrderClient::Individual { name } => name,
        }
    }

    pub fn is_company(&self) -> bool {
        matches!(self, OrderClient::Company { .. })
    }
}

/// One order line, always bound to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub vat_rate: VatRate,
    /// `unit_price × quantity`, excluding VAT.
    pub total: Money,
    pub unit: Option<String>,
}

impl OrderItem {
    pub fn new(
        product_id: ProductId,
        product_name: impl Into<String>,
        quantity: i64,
        unit_price: Money,
        vat_rate: VatRate,
        unit: Option<String>,
    ) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
            vat_rate,
            total: unit_price.times(quantity),
            unit,
        }
    }

    pub fn vat(&self) -> Money {
        self.total.at_rate(self.vat_rate)
    }
}

impl ValueObject for OrderItem {}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub total_vat: Money,
    /// Subtotal plus VAT.
    pub total_ttc: Money,
}

impl OrderTotals {
    pub fn compute(items: &[OrderItem], vat_applies: bool) -> Self {
        let subtotal: Money = items.iter().map(|i| i.total).sum();
        let total_vat: Money = if vat_applies {
            items.iter().map(OrderItem::vat).sum()
        } else {
            Money::ZERO
        };
        Self {
            subtotal,
            total_vat,
            total_ttc: subtotal + total_vat,
        }
    }
}

impl ValueObject for OrderTotals {}

/// Stored order record.
///
/// Only `OrderAggregate::apply` builds or changes one, so `stock_debited` always
/// equals `status.is_active()` for records produced here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    tenant_id: TenantId,
    number: String,
    client: OrderClient,
    ordered_at: DateTime<Utc>,
    delivery_at: Option<DateTime<Utc>>,
    items: Vec<OrderItem>,
    totals: OrderTotals,
    status: OrderStatus,
    stock_debited: bool,
    apply_vat: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn client(&self) -> &OrderClient {
        &self.client
    }

    pub fn ordered_at(&self) -> DateTime<Utc> {
        self.ordered_at
    }

    pub fn delivery_at(&self) -> Option<DateTime<Utc>> {
        self.delivery_at
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn totals(&self) -> OrderTotals {
        self.totals
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn stock_debited(&self) -> bool {
        self.stock_debited
    }

    pub fn apply_vat(&self) -> bool {
        self.apply_vat
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Stock effect of moving this order to `new_status` (status dialog preview).
    pub fn stock_impact(&self, new_status: OrderStatus) -> StockImpact {
        StockImpact::of_transition(self.stock_debited, new_status)
    }
}

/// Command: create an order from a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub tenant_id: TenantId,
    pub order_id: OrderId,
    pub number: String,
    pub draft: OrderDraft,
    /// "Now": the initial status is derived against this instant.
    pub occurred_at: DateTime<Utc>,
}

/// Command: edit client, dates or lines. Never moves stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseOrder {
    pub tenant_id: TenantId,
    pub order_id: OrderId,
    pub patch: OrderPatch,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStatus {
    pub tenant_id: TenantId,
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveOrder {
    pub tenant_id: TenantId,
    pub order_id: OrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderCommand {
    PlaceOrder(PlaceOrder),
    ReviseOrder(ReviseOrder),
    ChangeStatus(ChangeStatus),
    RemoveOrder(RemoveOrder),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    pub tenant_id: TenantId,
    pub order: Order,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRevised {
    pub tenant_id: TenantId,
    pub order_id: OrderId,
    pub revision: ValidatedOrder,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    pub tenant_id: TenantId,
    pub order_id: OrderId,
    pub from: OrderStatus,
    pub to: OrderStatus,
    pub stock_impact: StockImpact,
    pub stock_debited: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRemoved {
    pub tenant_id: TenantId,
    pub order_id: OrderId,
    pub number: String,
    pub stock_impact: StockImpact,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    OrderPlaced(OrderPlaced),
    OrderRevised(OrderRevised),
    OrderStatusChanged(OrderStatusChanged),
    OrderRemoved(OrderRemoved),
}

impl OrderEvent {
    /// Ledger movements this event calls for.
    pub fn stock_impact(&self) -> StockImpact {
        match self {
            OrderEvent::OrderPlaced(e) if e.order.stock_debited => StockImpact::Debit,
            OrderEvent::OrderPlaced(_) | OrderEvent::OrderRevised(_) => StockImpact::Unchanged,
            OrderEvent::OrderStatusChanged(e) => e.stock_impact,
            OrderEvent::OrderRemoved(e) => e.stock_impact,
        }
    }
}

impl Event for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "sales.order.placed",
            OrderEvent::OrderRevised(_) => "sales.order.revised",
            OrderEvent::OrderStatusChanged(_) => "sales.order.status_changed",
            OrderEvent::OrderRemoved(_) => "sales.order.removed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            OrderEvent::OrderPlaced(e) => e.occurred_at,
            OrderEvent::OrderRevised(e) => e.occurred_at,
            OrderEvent::OrderStatusChanged(e) => e.occurred_at,
            OrderEvent::OrderRemoved(e) => e.occurred_at,
        }
    }
}

/// Decision wrapper around an (optional) order record.
///
/// `empty` for an id that has no record yet, `loaded` for a record read from storage.
/// After `OrderRemoved` is applied the aggregate is empty again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAggregate {
    id: OrderId,
    state: Option<Order>,
    version: u64,
}

impl OrderAggregate {
    pub fn empty(id: OrderId) -> Self {
        Self {
            id,
            state: None,
            version: 0,
        }
    }

    pub fn loaded(order: Order) -> Self {
        Self {
            id: order.id,
            state: Some(order),
            version: 0,
        }
    }

    pub fn order(&self) -> Option<&Order> {
        self.state.as_ref()
    }

    pub fn into_order(self) -> Option<Order> {
        self.state
    }
}

impl AggregateRoot for OrderAggregate {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

impl Aggregate for OrderAggregate {
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            OrderEvent::OrderPlaced(e) => {
                self.id = e.order.id;
                self.state = Some(e.order.clone());
            }
            OrderEvent::OrderRevised(e) => {
                if let Some(order) = self.state.as_mut() {
                    let r = &e.revision;
                    order.client = r.client.clone();
                    order.apply_vat = r.apply_vat;
                    order.ordered_at = r.ordered_at;
                    order.delivery_at = r.delivery_at;
                    order.items = r.items.clone();
                    order.totals = r.totals;
                    order.updated_at = Some(e.occurred_at);
                }
            }
            OrderEvent::OrderStatusChanged(e) => {
                if let Some(order) = self.state.as_mut() {
                    order.status = e.to;
                    order.stock_debited = e.stock_debited;
                    order.updated_at = Some(e.occurred_at);
                }
            }
            OrderEvent::OrderRemoved(_) => {
                self.state = None;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::PlaceOrder(cmd) => self.handle_place(cmd),
            OrderCommand::ReviseOrder(cmd) => self.handle_revise(cmd),
            OrderCommand::ChangeStatus(cmd) => self.handle_change_status(cmd),
            OrderCommand::RemoveOrder(cmd) => self.handle_remove(cmd),
        }
    }
}

impl OrderAggregate {
    fn existing(&self, tenant_id: TenantId, order_id: OrderId) -> Result<&Order, DomainError> {
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        let order = self.state.as_ref().ok_or_else(DomainError::not_found)?;
        if order.tenant_id != tenant_id {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        Ok(order)
    }

    fn handle_place(&self, cmd: &PlaceOrder) -> Result<Vec<OrderEvent>, DomainError> {
        if self.state.is_some() {
            return Err(DomainError::conflict("order already exists"));
        }
        if cmd.number.trim().is_empty() {
            return Err(DomainError::validation("order number cannot be empty"));
        }

        let validated = cmd.draft.validate()?;
        let status = derive_initial_status(validated.delivery_at, cmd.occurred_at);

        let order = Order {
            id: cmd.order_id,
            tenant_id: cmd.tenant_id,
            number: cmd.number.trim().to_string(),
            client: validated.client,
            ordered_at: validated.ordered_at,
            delivery_at: validated.delivery_at,
            items: validated.items,
            totals: validated.totals,
            status,
            stock_debited: status.is_active(),
            apply_vat: validated.apply_vat,
            created_at: cmd.occurred_at,
            updated_at: None,
        };

        Ok(vec![OrderEvent::OrderPlaced(OrderPlaced {
            tenant_id: cmd.tenant_id,
            order,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_revise(&self, cmd: &ReviseOrder) -> Result<Vec<OrderEvent>, DomainError> {
        let order = self.existing(cmd.tenant_id, cmd.order_id)?;
        let revision = cmd.patch.resolve(order)?;

        Ok(vec![OrderEvent::OrderRevised(OrderRevised {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            revision,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_status(&self, cmd: &ChangeStatus) -> Result<Vec<OrderEvent>, DomainError> {
        let order = self.existing(cmd.tenant_id, cmd.order_id)?;
        let impact = order.stock_impact(cmd.status);

        Ok(vec![OrderEvent::OrderStatusChanged(OrderStatusChanged {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            from: order.status,
            to: cmd.status,
            stock_impact: impact,
            stock_debited: impact.debited_after(order.stock_debited),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, cmd: &RemoveOrder) -> Result<Vec<OrderEvent>, DomainError> {
        let order = self.existing(cmd.tenant_id, cmd.order_id)?;

        Ok(vec![OrderEvent::OrderRemoved(OrderRemoved {
            tenant_id: cmd.tenant_id,
            order_id: cmd.order_id,
            number: order.number.clone(),
            stock_impact: StockImpact::of_removal(order.stock_debited),
            occurred_at: cmd.occurred_at,
        })])
    }
}

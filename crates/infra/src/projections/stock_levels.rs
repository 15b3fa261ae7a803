//! Derived stock views for the product screens.
//!
//! Nothing here is stored: every report is recomputed from the product record,
//! the tenant's adjustment movements and its invoices. Sales are counted from
//! invoice lines whose description equals the product name. Reports may show
//! negative stock; nothing here blocks a sale.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use orderdesk_core::TenantId;
use orderdesk_invoicing::Invoice;
use orderdesk_inventory::{MovementKind, StockMovement};
use orderdesk_products::{Product, ProductId};

use crate::ledger::StockLedger;
use crate::store::{DocumentCollection, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    OutOfStock,
    Low,
    InStock,
}

impl StockStatus {
    /// `OutOfStock` at or below zero, `Low` at or below the product minimum.
    pub fn classify(current_stock: i64, min_stock: i64) -> Self {
        if current_stock <= 0 {
            StockStatus::OutOfStock
        } else if current_stock <= min_stock {
            StockStatus::Low
        } else {
            StockStatus::InStock
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    pub initial_stock: i64,
    pub total_adjustments: i64,
    pub total_sales: i64,
    pub current_stock: i64,
    /// Most recent correction by `occurred_at`.
    pub last_adjustment: Option<StockMovement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesStats {
    pub remaining_stock: i64,
    /// Distinct invoices with at least one line for the product.
    pub invoice_count: usize,
    pub total_ordered: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "window")]
pub enum HistoryWindow {
    All,
    /// Last 7 days.
    Week,
    /// Last 30 days.
    Month,
    /// Last 90 days.
    Quarter,
    /// Both days inclusive (UTC).
    Range { from: NaiveDate, to: NaiveDate },
}

impl HistoryWindow {
    pub fn contains(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match *self {
            HistoryWindow::All => true,
            HistoryWindow::Week => at >= now - Duration::days(7),
            HistoryWindow::Month => at >= now - Duration::days(30),
            HistoryWindow::Quarter => at >= now - Duration::days(90),
            HistoryWindow::Range { from, to } => {
                let day = at.date_naive();
                day >= from && day <= to
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum HistoryKind {
    Initial,
    Sale { invoice_number: String },
    Adjustment { reason: String, actor_name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub kind: HistoryKind,
    /// Signed change.
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
}

fn is_adjustment_of(product: &Product) -> impl Fn(&&StockMovement) -> bool + '_ {
    move |m| m.kind == MovementKind::Adjustment && m.product_id == product.id
}

fn total_sales(product: &Product, invoices: &[Invoice]) -> i64 {
    invoices
        .iter()
        .map(|inv| inv.quantity_of(&product.name))
        .fold(0, i64::saturating_add)
}

fn total_adjustments(product: &Product, movements: &[StockMovement]) -> i64 {
    movements
        .iter()
        .filter(is_adjustment_of(product))
        .map(|m| m.quantity)
        .fold(0, i64::saturating_add)
}

/// `initial + adjustments − invoiced quantity`.
pub fn current_stock(product: &Product, movements: &[StockMovement], invoices: &[Invoice]) -> i64 {
    product
        .initial_stock
        .saturating_add(total_adjustments(product, movements))
        .saturating_sub(total_sales(product, invoices))
}

pub fn summary(product: &Product, movements: &[StockMovement], invoices: &[Invoice]) -> StockSummary {
    let total_adjustments = total_adjustments(product, movements);
    let total_sales = total_sales(product, invoices);
    let last_adjustment = movements
        .iter()
        .filter(is_adjustment_of(product))
        .max_by_key(|m| (m.occurred_at, m.position))
        .cloned();

    StockSummary {
        initial_stock: product.initial_stock,
        total_adjustments,
        total_sales,
        current_stock: product
            .initial_stock
            .saturating_add(total_adjustments)
            .saturating_sub(total_sales),
        last_adjustment,
    }
}

pub fn stock_status(product: &Product, movements: &[StockMovement], invoices: &[Invoice]) -> StockStatus {
    StockStatus::classify(current_stock(product, movements, invoices), product.min_stock)
}

pub fn sales_stats(product: &Product, movements: &[StockMovement], invoices: &[Invoice]) -> SalesStats {
    let mut seen = HashSet::new();
    let mut total_ordered = 0;
    for inv in invoices {
        let qty = inv.quantity_of(&product.name);
        if inv.lines_for(&product.name).next().is_some() {
            seen.insert(inv.id);
            total_ordered += qty;
        }
    }

    SalesStats {
        remaining_stock: current_stock(product, movements, invoices),
        invoice_count: seen.len(),
        total_ordered,
    }
}

/// Chronological stock history, newest first.
///
/// Sales carry a running level that starts at the initial stock and walks the
/// invoice lines in date order; adjustments carry the levels recorded when they
/// were made.
pub fn history(
    product: &Product,
    movements: &[StockMovement],
    invoices: &[Invoice],
    window: HistoryWindow,
    now: DateTime<Utc>,
) -> Vec<HistoryEntry> {
    let mut entries = Vec::new();

    if product.initial_stock > 0 {
        entries.push(HistoryEntry {
            at: product.created_at,
            kind: HistoryKind::Initial,
            quantity: product.initial_stock,
            previous_stock: 0,
            new_stock: product.initial_stock,
        });
    }

    let mut sales: Vec<(&Invoice, i64)> = invoices
        .iter()
        .flat_map(|inv| inv.lines_for(&product.name).map(move |line| (inv, line.quantity)))
        .collect();
    sales.sort_by_key(|(inv, _)| inv.date);

    let mut level = product.initial_stock;
    for (inv, qty) in sales {
        entries.push(HistoryEntry {
            at: inv.date,
            kind: HistoryKind::Sale {
                invoice_number: inv.number.clone(),
            },
            quantity: -qty,
            previous_stock: level,
            new_stock: level.saturating_sub(qty),
        });
        level = level.saturating_sub(qty);
    }

    for m in movements.iter().filter(is_adjustment_of(product)) {
        let previous = m.previous_stock.unwrap_or_default();
        entries.push(HistoryEntry {
            at: m.occurred_at,
            kind: HistoryKind::Adjustment {
                reason: m.reason.clone(),
                actor_name: m.actor_name.clone(),
            },
            quantity: m.quantity,
            previous_stock: previous,
            new_stock: m.new_stock.unwrap_or(previous.saturating_add(m.quantity)),
        });
    }

    entries.retain(|e| window.contains(e.at, now));
    // Stable sort keeps insertion order for equal timestamps.
    entries.sort_by(|a, b| b.at.cmp(&a.at));
    entries
}

/// Tenant-scoped stock reports over live collections.
#[derive(Debug)]
pub struct StockReports<P, I, L> {
    products: P,
    invoices: I,
    ledger: L,
}

/// Everything a report needs for one product.
struct Inputs {
    product: Product,
    movements: Vec<StockMovement>,
    invoices: Vec<Invoice>,
}

impl<P, I, L> StockReports<P, I, L>
where
    P: DocumentCollection<Product>,
    I: DocumentCollection<Invoice>,
    L: StockLedger,
{
    pub fn new(products: P, invoices: I, ledger: L) -> Self {
        Self {
            products,
            invoices,
            ledger,
        }
    }

    fn load(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Option<Inputs>, StoreError> {
        let Some(product) = self.products.get(tenant_id, product_id.0)? else {
            return Ok(None);
        };
        Ok(Some(Inputs {
            movements: self.ledger.adjustments_for(tenant_id, product_id)?,
            invoices: self.invoices.list(tenant_id)?,
            product,
        }))
    }

    /// `None` if the product does not exist for this tenant.
    pub fn current_stock(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Option<i64>, StoreError> {
        Ok(self
            .load(tenant_id, product_id)?
            .map(|i| current_stock(&i.product, &i.movements, &i.invoices)))
    }

    pub fn summary(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Option<StockSummary>, StoreError> {
        Ok(self
            .load(tenant_id, product_id)?
            .map(|i| summary(&i.product, &i.movements, &i.invoices)))
    }

    pub fn stock_status(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Option<StockStatus>, StoreError> {
        Ok(self
            .load(tenant_id, product_id)?
            .map(|i| stock_status(&i.product, &i.movements, &i.invoices)))
    }

    pub fn sales_stats(&self, tenant_id: TenantId, product_id: ProductId) -> Result<Option<SalesStats>, StoreError> {
        Ok(self
            .load(tenant_id, product_id)?
            .map(|i| sales_stats(&i.product, &i.movements, &i.invoices)))
    }

    pub fn history(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
        window: HistoryWindow,
        now: DateTime<Utc>,
    ) -> Result<Option<Vec<HistoryEntry>>, StoreError> {
        Ok(self
            .load(tenant_id, product_id)?
            .map(|i| history(&i.product, &i.movements, &i.invoices, window, now)))
    }
}

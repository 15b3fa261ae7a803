use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderdesk_core::{AggregateId, DomainError, DomainResult, Entity, Money, VatRate};
use orderdesk_parties::ClientId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub AggregateId);

impl InvoiceId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Unpaid,
    Paid,
    Collected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub line_no: u32,
    /// Free-text description; equals the product name when the line sells a product.
    pub description: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub vat_rate: VatRate,
    pub total: Money,
    pub unit: Option<String>,
}

impl InvoiceItem {
    pub fn new(
        line_no: u32,
        description: impl Into<String>,
        quantity: i64,
        unit_price: Money,
        vat_rate: VatRate,
    ) -> Self {
        Self {
            line_no,
            description: description.into(),
            quantity,
            unit_price,
            vat_rate,
            total: unit_price.times(quantity),
            unit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueInvoice {
    pub invoice_id: InvoiceId,
    pub number: String,
    pub client_id: ClientId,
    pub date: DateTime<Utc>,
    pub items: Vec<InvoiceItem>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub number: String,
    pub client_id: ClientId,
    /// Invoice (business) date.
    pub date: DateTime<Utc>,
    pub items: Vec<InvoiceItem>,
    pub status: InvoiceStatus,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn issue(cmd: IssueInvoice) -> DomainResult<Self> {
        if cmd.number.trim().is_empty() {
            return Err(DomainError::validation("invoice number cannot be empty"));
        }
        if cmd.items.is_empty() {
            return Err(DomainError::validation("invoice must have at least one line"));
        }
        if cmd.items.iter().any(|i| i.quantity <= 0) {
            return Err(DomainError::validation("line quantity must be positive"));
        }

        Ok(Self {
            id: cmd.invoice_id,
            number: cmd.number.trim().to_string(),
            client_id: cmd.client_id,
            date: cmd.date,
            items: cmd.items,
            status: InvoiceStatus::Draft,
            created_at: cmd.occurred_at,
        })
    }

    pub fn subtotal(&self) -> Money {
        self.items.iter().map(|i| i.total).sum()
    }

    /// Lines selling the product named `product_name` (exact match).
    pub fn lines_for<'a>(&'a self, product_name: &'a str) -> impl Iterator<Item = &'a InvoiceItem> + 'a {
        self.items.iter().filter(move |i| i.description == product_name)
    }

    pub fn quantity_of(&self, product_name: &str) -> i64 {
        self.lines_for(product_name).map(|i| i.quantity).fold(0, i64::saturating_add)
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(items: Vec<InvoiceItem>) -> DomainResult<Invoice> {
        Invoice::issue(IssueInvoice {
            invoice_id: InvoiceId::new(AggregateId::new()),
            number: "FAC-2026-001".to_string(),
            client_id: ClientId::new(AggregateId::new()),
            date: Utc::now(),
            items,
            occurred_at: Utc::now(),
        })
    }

    #[test]
    fn quantity_of_matches_by_exact_name() {
        let inv = issue(vec![
            InvoiceItem::new(1, "Bolt M6", 4, Money::from_major(1), VatRate::from_percent(20)),
            InvoiceItem::new(2, "Bolt M6", 6, Money::from_major(1), VatRate::from_percent(20)),
            InvoiceItem::new(3, "bolt m6", 100, Money::from_major(1), VatRate::ZERO),
        ])
        .unwrap();

        assert_eq!(inv.quantity_of("Bolt M6"), 10);
        assert_eq!(inv.quantity_of("Nut"), 0);
        assert_eq!(inv.subtotal(), Money::from_major(110));
    }

    #[test]
    fn empty_invoice_is_rejected() {
        assert!(matches!(issue(vec![]), Err(DomainError::Validation(_))));
    }
}

//! Order input as captured by a form, and its validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult, Money, VatRate};
use orderdesk_parties::Client;
use orderdesk_products::{Product, ProductId};

use crate::order::{Order, OrderClient, OrderItem, OrderTotals};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientSelection {
    /// Company mode; `None` until a client has been picked.
    Company(Option<Client>),
    /// Walk-in customer name.
    Individual(String),
}

impl ClientSelection {
    fn resolve(&self) -> DomainResult<OrderClient> {
        match self {
            ClientSelection::Company(Some(client)) => Ok(OrderClient::Company {
                client_id: client.id,
                name: client.name.clone(),
            }),
            ClientSelection::Company(None) => {
                Err(DomainError::validation("a client must be selected"))
            }
            ClientSelection::Individual(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(DomainError::validation("client name is required"));
                }
                Ok(OrderClient::Individual {
                    name: name.to_string(),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryChoice {
    /// No separate delivery date.
    Immediate,
    /// Delivery date requested; `None` when the field was left empty.
    Scheduled(Option<DateTime<Utc>>),
}

impl DeliveryChoice {
    fn resolve(self) -> DomainResult<Option<DateTime<Utc>>> {
        match self {
            DeliveryChoice::Immediate => Ok(None),
            DeliveryChoice::Scheduled(Some(at)) => Ok(Some(at)),
            DeliveryChoice::Scheduled(None) => {
                Err(DomainError::validation("delivery date is required"))
            }
        }
    }
}

/// One form line. The product stays unbound until the operator picks one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDraft {
    pub product: Option<(ProductId, String)>,
    pub quantity: i64,
    pub unit_price: Money,
    pub vat_rate: VatRate,
    pub unit: Option<String>,
}

impl LineDraft {
    /// Line prefilled from the catalog (sale price, unit).
    pub fn for_product(product: &Product, quantity: i64) -> Self {
        Self {
            product: Some((product.id, product.name.clone())),
            quantity,
            unit_price: product.sale_price,
            vat_rate: VatRate::ZERO,
            unit: Some(product.unit.clone()).filter(|u| !u.is_empty()),
        }
    }

    pub fn bound(
        product_id: ProductId,
        product_name: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Self {
        Self {
            product: Some((product_id, product_name.into())),
            quantity,
            unit_price,
            vat_rate: VatRate::ZERO,
            unit: None,
        }
    }

    pub fn unbound(quantity: i64, unit_price: Money) -> Self {
        Self {
            product: None,
            quantity,
            unit_price,
            vat_rate: VatRate::ZERO,
            unit: None,
        }
    }

    pub fn with_vat_rate(mut self, vat_rate: VatRate) -> Self {
        self.vat_rate = vat_rate;
        self
    }

    fn to_item(&self) -> DomainResult<OrderItem> {
        let (product_id, product_name) = self
            .product
            .as_ref()
            .ok_or_else(|| DomainError::validation("every line needs a product"))?;
        if self.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if self.unit_price < Money::ZERO {
            return Err(DomainError::validation("unit price cannot be negative"));
        }

        Ok(OrderItem::new(
            *product_id,
            product_name.clone(),
            self.quantity,
            self.unit_price,
            self.vat_rate,
            self.unit.clone(),
        ))
    }
}

fn resolve_lines(lines: &[LineDraft]) -> DomainResult<Vec<OrderItem>> {
    if lines.is_empty() {
        return Err(DomainError::validation("an order needs at least one line"));
    }
    lines.iter().map(LineDraft::to_item).collect()
}

/// VAT is mandatory for companies; individuals opt in.
fn vat_applies(client: &OrderClient, requested: bool) -> bool {
    client.is_company() || requested
}

/// A new order as entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub client: ClientSelection,
    pub ordered_at: DateTime<Utc>,
    pub delivery: DeliveryChoice,
    pub lines: Vec<LineDraft>,
    pub apply_vat: bool,
}

/// Checked order content with computed totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedOrder {
    pub client: OrderClient,
    pub apply_vat: bool,
    pub ordered_at: DateTime<Utc>,
    pub delivery_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItem>,
    pub totals: OrderTotals,
}

impl OrderDraft {
    /// Checks run in form order: client, lines, products, quantities, delivery date.
    pub fn validate(&self) -> DomainResult<ValidatedOrder> {
        let client = self.client.resolve()?;
        let items = resolve_lines(&self.lines)?;
        let delivery_at = self.delivery.resolve()?;
        let apply_vat = vat_applies(&client, self.apply_vat);
        let totals = OrderTotals::compute(&items, apply_vat);

        Ok(ValidatedOrder {
            client,
            apply_vat,
            ordered_at: self.ordered_at,
            delivery_at,
            items,
            totals,
        })
    }
}

/// Edit of an existing order. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPatch {
    pub client: Option<ClientSelection>,
    pub apply_vat: Option<bool>,
    pub ordered_at: Option<DateTime<Utc>>,
    pub delivery: Option<DeliveryChoice>,
    pub lines: Option<Vec<LineDraft>>,
}

impl OrderPatch {
    pub fn is_empty(&self) -> bool {
        self.client.is_none()
            && self.apply_vat.is_none()
            && self.ordered_at.is_none()
            && self.delivery.is_none()
            && self.lines.is_none()
    }

    /// Merge onto `current`, validating only the provided fields. Totals are
    /// always recomputed.
    pub(crate) fn resolve(&self, current: &Order) -> DomainResult<ValidatedOrder> {
        let client = match &self.client {
            Some(selection) => selection.resolve()?,
            None => current.client().clone(),
        };
        let items = match &self.lines {
            Some(lines) => resolve_lines(lines)?,
            None => current.items().to_vec(),
        };
        let delivery_at = match self.delivery {
            Some(choice) => choice.resolve()?,
            None => current.delivery_at(),
        };
        let apply_vat = vat_applies(&client, self.apply_vat.unwrap_or(current.apply_vat()));
        let totals = OrderTotals::compute(&items, apply_vat);

        Ok(ValidatedOrder {
            client,
            apply_vat,
            ordered_at: self.ordered_at.unwrap_or(current.ordered_at()),
            delivery_at,
            items,
            totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderdesk_core::AggregateId;
    use orderdesk_parties::{ClientId, ContactInfo, RegisterClient};
    use proptest::prelude::*;

    fn client() -> Client {
        Client::register(RegisterClient {
            client_id: ClientId::new(AggregateId::new()),
            name: "Atlas Distribution".to_string(),
            ice: "001525689000045".to_string(),
            contact: ContactInfo::default(),
            occurred_at: Utc::now(),
        })
        .unwrap()
    }

    fn line(quantity: i64, price: i64) -> LineDraft {
        LineDraft::bound(ProductId::new(AggregateId::new()), "Bolt", quantity, Money::from_major(price))
    }

    fn draft(client: ClientSelection, lines: Vec<LineDraft>) -> OrderDraft {
        OrderDraft {
            client,
            ordered_at: Utc::now(),
            delivery: DeliveryChoice::Immediate,
            lines,
            apply_vat: false,
        }
    }

    fn validation_message(err: DomainError) -> String {
        match err {
            DomainError::Validation(msg) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_company_is_rejected_first() {
        let d = draft(ClientSelection::Company(None), vec![]);
        let msg = validation_message(d.validate().unwrap_err());
        assert!(msg.contains("client"));
    }

    #[test]
    fn blank_individual_name_is_rejected() {
        let d = draft(ClientSelection::Individual("   ".to_string()), vec![line(1, 1)]);
        assert!(d.validate().is_err());
    }

    #[test]
    fn empty_lines_are_rejected() {
        let d = draft(ClientSelection::Individual("Sara".to_string()), vec![]);
        let msg = validation_message(d.validate().unwrap_err());
        assert!(msg.contains("at least one line"));
    }

    #[test]
    fn unbound_line_is_rejected() {
        let d = draft(
            ClientSelection::Individual("Sara".to_string()),
            vec![line(1, 1), LineDraft::unbound(2, Money::from_major(3))],
        );
        let msg = validation_message(d.validate().unwrap_err());
        assert!(msg.contains("product"));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let d = draft(ClientSelection::Individual("Sara".to_string()), vec![line(0, 1)]);
        let msg = validation_message(d.validate().unwrap_err());
        assert!(msg.contains("quantity"));
    }

    #[test]
    fn requested_but_empty_delivery_is_rejected() {
        let mut d = draft(ClientSelection::Individual("Sara".to_string()), vec![line(1, 1)]);
        d.delivery = DeliveryChoice::Scheduled(None);
        let msg = validation_message(d.validate().unwrap_err());
        assert!(msg.contains("delivery"));
    }

    #[test]
    fn company_always_applies_vat() {
        let d = draft(
            ClientSelection::Company(Some(client())),
            vec![line(5, 10).with_vat_rate(VatRate::from_percent(20))],
        );
        let v = d.validate().unwrap();
        assert!(v.apply_vat);
        assert_eq!(v.totals.subtotal, Money::from_major(50));
        assert_eq!(v.totals.total_vat, Money::from_major(10));
        assert_eq!(v.totals.total_ttc, Money::from_major(60));
    }

    #[test]
    fn individual_without_vat_pays_subtotal() {
        let d = draft(
            ClientSelection::Individual("Sara".to_string()),
            vec![line(5, 10).with_vat_rate(VatRate::from_percent(20))],
        );
        let v = d.validate().unwrap();
        assert!(!v.apply_vat);
        assert_eq!(v.totals.total_vat, Money::ZERO);
        assert_eq!(v.totals.total_ttc, v.totals.subtotal);
    }

    #[test]
    fn two_line_scenario_totals_ninety() {
        let d = draft(
            ClientSelection::Individual("Sara".to_string()),
            vec![line(5, 10), line(2, 20)],
        );
        assert_eq!(d.validate().unwrap().totals.subtotal, Money::from_major(90));
    }

    #[test]
    fn empty_patch_is_empty() {
        assert!(OrderPatch::default().is_empty());
        let patch = OrderPatch {
            apply_vat: Some(true),
            ..OrderPatch::default()
        };
        assert!(!patch.is_empty());
    }

    proptest! {
        #[test]
        fn totals_are_consistent(
            lines in proptest::collection::vec((1i64..100, 0i64..10_000, 0u32..3_000), 1..10),
            apply_vat in any::<bool>(),
        ) {
            let drafts: Vec<LineDraft> = lines
                .iter()
                .map(|(q, p, r)| {
                    LineDraft::bound(ProductId::new(AggregateId::new()), "P", *q, Money::from_minor(*p))
                        .with_vat_rate(VatRate::from_basis_points(*r))
                })
                .collect();
            let mut d = draft(ClientSelection::Individual("Sara".to_string()), drafts);
            d.apply_vat = apply_vat;
            let v = d.validate().unwrap();

            let expected: i64 = lines.iter().map(|(q, p, _)| q * p).sum();
            prop_assert_eq!(v.totals.subtotal.minor(), expected);
            prop_assert_eq!(v.totals.total_ttc, v.totals.subtotal + v.totals.total_vat);
            if !apply_vat {
                prop_assert_eq!(v.totals.total_vat, Money::ZERO);
            }
        }
    }
}

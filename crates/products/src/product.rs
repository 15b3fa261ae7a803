use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use orderdesk_core::{AggregateId, DomainError, DomainResult, Entity, Money};

/// Product identifier (tenant scope comes from the collection the product lives in).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
}

/// Input for registering a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterProduct {
    pub product_id: ProductId,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub purchase_price: Money,
    pub sale_price: Money,
    /// Unit-of-measure label ("kg", "box", ...). Blank means plain units.
    pub unit: String,
    pub initial_stock: i64,
    pub min_stock: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub purchase_price: Money,
    pub sale_price: Money,
    pub unit: String,
    /// Quantity on hand when the product was registered.
    pub initial_stock: i64,
    /// Threshold at or below which stock is reported as low.
    pub min_stock: i64,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_UNIT: &str = "unit";

impl Product {
    pub fn register(cmd: RegisterProduct) -> DomainResult<Self> {
        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        if cmd.sale_price < Money::ZERO || cmd.purchase_price < Money::ZERO {
            return Err(DomainError::validation("prices cannot be negative"));
        }
        if cmd.initial_stock < 0 {
            return Err(DomainError::validation("initial stock cannot be negative"));
        }
        if cmd.min_stock < 0 {
            return Err(DomainError::validation("minimum stock cannot be negative"));
        }

        let unit = match cmd.unit.trim() {
            "" => DEFAULT_UNIT.to_string(),
            u => u.to_string(),
        };

        Ok(Self {
            id: cmd.product_id,
            name: name.to_string(),
            sku: cmd.sku.trim().to_string(),
            category: cmd.category.trim().to_string(),
            purchase_price: cmd.purchase_price,
            sale_price: cmd.sale_price,
            unit,
            initial_stock: cmd.initial_stock,
            min_stock: cmd.min_stock,
            status: ProductStatus::Active,
            created_at: cmd.occurred_at,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    pub fn deactivate(&mut self) {
        self.status = ProductStatus::Inactive;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn register(name: &str, initial_stock: i64) -> RegisterProduct {
        RegisterProduct {
            product_id: ProductId::new(AggregateId::new()),
            name: name.to_string(),
            sku: "SKU-1".to_string(),
            category: "Hardware".to_string(),
            purchase_price: Money::from_major(6),
            sale_price: Money::from_major(10),
            unit: String::new(),
            initial_stock,
            min_stock: 5,
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn register_trims_name_and_defaults_unit() {
        let p = Product::register(register("  Bolt M6 ", 40)).unwrap();
        assert_eq!(p.name, "Bolt M6");
        assert_eq!(p.unit, DEFAULT_UNIT);
        assert!(p.is_active());
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Product::register(register("   ", 0)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn deactivate_keeps_identity() {
        let mut p = Product::register(register("Nut", 0)).unwrap();
        let id = p.id;
        p.deactivate();
        assert_eq!(*Entity::id(&p), id);
        assert_eq!(p.status, ProductStatus::Inactive);
    }

    proptest! {
        #[test]
        fn negative_initial_stock_is_always_rejected(stock in i64::MIN..0) {
            prop_assert!(Product::register(register("Washer", stock)).is_err());
        }

        #[test]
        fn non_negative_initial_stock_is_kept(stock in 0i64..1_000_000) {
            let p = Product::register(register("Washer", stock)).unwrap();
            prop_assert_eq!(p.initial_stock, stock);
        }
    }
}

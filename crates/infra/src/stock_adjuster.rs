//! Manual stock corrections.

use thiserror::Error;

use orderdesk_core::{DomainError, SessionContext};
use orderdesk_inventory::{NewStockMovement, StockAdjustment, StockMovement};
use orderdesk_invoicing::Invoice;
use orderdesk_products::{Product, ProductId};

use crate::clock::Clock;
use crate::ledger::StockLedger;
use crate::projections::stock_levels::current_stock;
use crate::store::{DocumentCollection, StoreError};

#[derive(Debug, Error)]
pub enum AdjustError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("product not found")]
    ProductNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for AdjustError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound => AdjustError::ProductNotFound,
            other => AdjustError::Validation(other.to_string()),
        }
    }
}

/// Records `adjustment` movements against the reported current stock.
#[derive(Debug)]
pub struct StockAdjuster<P, I, L, K> {
    products: P,
    invoices: I,
    ledger: L,
    clock: K,
}

impl<P, I, L, K> StockAdjuster<P, I, L, K>
where
    P: DocumentCollection<Product>,
    I: DocumentCollection<Invoice>,
    L: StockLedger,
    K: Clock,
{
    pub fn new(products: P, invoices: I, ledger: L, clock: K) -> Self {
        Self {
            products,
            invoices,
            ledger,
            clock,
        }
    }

    /// Validate `adjustment` against the current stock and append one movement
    /// taking the product from the current level to the new one.
    pub fn adjust(
        &self,
        ctx: &SessionContext,
        product_id: ProductId,
        adjustment: &StockAdjustment,
    ) -> Result<StockMovement, AdjustError> {
        let tenant_id = ctx.tenant_id();
        let product = self
            .products
            .get(tenant_id, product_id.0)?
            .ok_or(AdjustError::ProductNotFound)?;

        let movements = self.ledger.adjustments_for(tenant_id, product_id)?;
        let invoices = self.invoices.list(tenant_id)?;
        let current = current_stock(&product, &movements, &invoices);

        let outcome = adjustment.evaluate(current)?;
        let movement = NewStockMovement::adjustment(
            ctx,
            product.id,
            &product.name,
            outcome.previous_stock,
            outcome.new_stock,
            adjustment.recorded_reason(),
            self.clock.now(),
        );

        let mut stored = self.ledger.append(tenant_id, vec![movement])?;
        let stored = stored
            .pop()
            .ok_or_else(|| StoreError::remote_write("ledger returned no movement"))?;

        tracing::info!(
            tenant_id = %tenant_id,
            actor = ctx.actor_name(),
            product = %product.name,
            previous_stock = outcome.previous_stock,
            new_stock = outcome.new_stock,
            reason = %stored.reason,
            "stock adjusted"
        );

        Ok(stored)
    }
}

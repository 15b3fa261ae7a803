use std::sync::Arc;

use orderdesk_core::TenantId;
use orderdesk_events::Subscription;
use orderdesk_inventory::{MovementKind, NewStockMovement, StockMovement};
use orderdesk_products::ProductId;

use crate::store::StoreError;

/// Append-only, tenant-scoped stock movement ledger.
///
/// ## Append semantics
///
/// `append()`:
/// - rejects a batch containing another tenant's movement (`TenantIsolation`)
/// - assigns positions starting at the tenant's last position + 1
/// - persists the whole batch or nothing
///
/// Movements are never updated or deleted. A mistaken movement is cancelled by
/// appending its reversal.
pub trait StockLedger: Send + Sync {
    fn append(
        &self,
        tenant_id: TenantId,
        batch: Vec<NewStockMovement>,
    ) -> Result<Vec<StockMovement>, StoreError>;

    /// All of a tenant's movements in position order.
    fn movements(&self, tenant_id: TenantId) -> Result<Vec<StockMovement>, StoreError>;

    /// Movements carrying `reference` (e.g. an order number), in position order.
    fn by_reference(
        &self,
        tenant_id: TenantId,
        reference: &str,
    ) -> Result<Vec<StockMovement>, StoreError> {
        Ok(self
            .movements(tenant_id)?
            .into_iter()
            .filter(|m| m.references(reference))
            .collect())
    }

    /// Manual corrections recorded for one product, in position order.
    fn adjustments_for(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> Result<Vec<StockMovement>, StoreError> {
        Ok(self
            .movements(tenant_id)?
            .into_iter()
            .filter(|m| m.kind == MovementKind::Adjustment && m.product_id == product_id)
            .collect())
    }

    /// Live stream of a tenant's appended movements.
    fn subscribe(&self, tenant_id: TenantId) -> Subscription<StockMovement>;
}

impl<L> StockLedger for Arc<L>
where
    L: StockLedger + ?Sized,
{
    fn append(
        &self,
        tenant_id: TenantId,
        batch: Vec<NewStockMovement>,
    ) -> Result<Vec<StockMovement>, StoreError> {
        (**self).append(tenant_id, batch)
    }

    fn movements(&self, tenant_id: TenantId) -> Result<Vec<StockMovement>, StoreError> {
        (**self).movements(tenant_id)
    }

    fn by_reference(
        &self,
        tenant_id: TenantId,
        reference: &str,
    ) -> Result<Vec<StockMovement>, StoreError> {
        (**self).by_reference(tenant_id, reference)
    }

    fn adjustments_for(
        &self,
        tenant_id: TenantId,
        product_id: ProductId,
    ) -> Result<Vec<StockMovement>, StoreError> {
        (**self).adjustments_for(tenant_id, product_id)
    }

    fn subscribe(&self, tenant_id: TenantId) -> Subscription<StockMovement> {
        (**self).subscribe(tenant_id)
    }
}

use std::collections::HashMap;
use std::sync::RwLock;

use orderdesk_core::TenantId;
use orderdesk_events::{ChangeFeed, InMemoryChangeFeed, Subscription};
use orderdesk_inventory::{NewStockMovement, StockMovement};

use super::r#trait::StockLedger;
use crate::store::StoreError;

/// In-memory stock ledger for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryStockLedger {
    tenants: RwLock<HashMap<TenantId, Vec<StockMovement>>>,
    feed: InMemoryChangeFeed<StockMovement>,
}

impl InMemoryStockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn last_position(movements: &[StockMovement]) -> u64 {
        movements.last().map(|m| m.position).unwrap_or(0)
    }
}

impl StockLedger for InMemoryStockLedger {
    fn append(
        &self,
        tenant_id: TenantId,
        batch: Vec<NewStockMovement>,
    ) -> Result<Vec<StockMovement>, StoreError> {
        if batch.is_empty() {
            return Ok(vec![]);
        }

        for (idx, m) in batch.iter().enumerate() {
            if m.tenant_id != tenant_id {
                return Err(StoreError::TenantIsolation(format!(
                    "batch contains a movement for another tenant (index {idx})"
                )));
            }
        }

        let committed = {
            let mut tenants = self.tenants.write().map_err(|_| StoreError::poisoned())?;
            let ledger = tenants.entry(tenant_id).or_default();
            let mut next = Self::last_position(ledger) + 1;

            let mut committed = Vec::with_capacity(batch.len());
            for m in batch {
                committed.push(m.into_stored(next));
                next += 1;
            }
            ledger.extend(committed.iter().cloned());
            committed
        };

        for m in &committed {
            if let Err(err) = self.feed.publish(m.clone()) {
                tracing::warn!(?err, movement_id = %m.id, "stock feed publish failed");
            }
        }

        Ok(committed)
    }

    fn movements(&self, tenant_id: TenantId) -> Result<Vec<StockMovement>, StoreError> {
        let tenants = self.tenants.read().map_err(|_| StoreError::poisoned())?;
        Ok(tenants.get(&tenant_id).cloned().unwrap_or_default())
    }

    fn subscribe(&self, tenant_id: TenantId) -> Subscription<StockMovement> {
        self.feed.subscribe_tenant(tenant_id)
    }
}

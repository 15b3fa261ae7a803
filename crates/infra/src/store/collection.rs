use std::sync::Arc;

use orderdesk_core::{AggregateId, TenantId};
use orderdesk_events::{Change, Subscription};

use super::document::Document;
use super::error::StoreError;

/// Tenant-partitioned document collection.
///
/// Every call names the tenant explicitly; a record is only visible under the tenant
/// it was added with. Each successful write is published as a `Change` to live
/// subscribers of that tenant.
pub trait DocumentCollection<R: Document>: Send + Sync {
    /// Insert a new record. `Duplicate` if the id is already taken.
    fn add(&self, tenant_id: TenantId, record: R) -> Result<R, StoreError>;

    /// Replace an existing record (last write wins). `NotFound` if absent.
    fn update(&self, tenant_id: TenantId, record: R) -> Result<R, StoreError>;

    /// `NotFound` if absent.
    fn delete(&self, tenant_id: TenantId, id: AggregateId) -> Result<(), StoreError>;

    fn get(&self, tenant_id: TenantId, id: AggregateId) -> Result<Option<R>, StoreError>;

    fn list(&self, tenant_id: TenantId) -> Result<Vec<R>, StoreError>;

    /// Live changes for one tenant, starting with the next write.
    fn subscribe(&self, tenant_id: TenantId) -> Subscription<Change<R>>;
}

impl<R, C> DocumentCollection<R> for Arc<C>
where
    R: Document,
    C: DocumentCollection<R> + ?Sized,
{
    fn add(&self, tenant_id: TenantId, record: R) -> Result<R, StoreError> {
        (**self).add(tenant_id, record)
    }

    fn update(&self, tenant_id: TenantId, record: R) -> Result<R, StoreError> {
        (**self).update(tenant_id, record)
    }

    fn delete(&self, tenant_id: TenantId, id: AggregateId) -> Result<(), StoreError> {
        (**self).delete(tenant_id, id)
    }

    fn get(&self, tenant_id: TenantId, id: AggregateId) -> Result<Option<R>, StoreError> {
        (**self).get(tenant_id, id)
    }

    fn list(&self, tenant_id: TenantId) -> Result<Vec<R>, StoreError> {
        (**self).list(tenant_id)
    }

    fn subscribe(&self, tenant_id: TenantId) -> Subscription<Change<R>> {
        (**self).subscribe(tenant_id)
    }
}

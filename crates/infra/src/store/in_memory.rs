use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

use orderdesk_core::{AggregateId, TenantId};
use orderdesk_events::{Change, ChangeFeed, InMemoryChangeFeed, Subscription};

use super::collection::DocumentCollection;
use super::document::Document;
use super::error::StoreError;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct DocKey {
    tenant_id: TenantId,
    id: AggregateId,
}

#[derive(Debug, Default)]
struct State {
    docs: BTreeMap<DocKey, JsonValue>,
    revision: u64,
}

/// In-memory document collection for tests/dev.
///
/// Records are held as JSON, as a remote document store would, so every write
/// round-trips through serde. `list` returns a tenant's records in id order
/// (UUIDv7, so roughly creation order).
pub struct InMemoryCollection<R: Document> {
    state: RwLock<State>,
    feed: InMemoryChangeFeed<Change<R>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Document> InMemoryCollection<R> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            feed: InMemoryChangeFeed::new(),
            _record: PhantomData,
        }
    }

    /// Number of records across all tenants.
    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn encode(record: &R) -> Result<JsonValue, StoreError> {
        serde_json::to_value(record).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode(value: &JsonValue) -> Result<R, StoreError> {
        serde_json::from_value(value.clone()).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn publish(&self, change: Change<R>) {
        // The write is already committed; a feed failure only delays readers.
        if let Err(err) = self.feed.publish(change) {
            tracing::warn!(collection = R::COLLECTION, ?err, "change feed publish failed");
        }
    }
}

impl<R: Document> Default for InMemoryCollection<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Document> core::fmt::Debug for InMemoryCollection<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryCollection")
            .field("collection", &R::COLLECTION)
            .field("len", &self.len())
            .finish()
    }
}

impl<R: Document> DocumentCollection<R> for InMemoryCollection<R> {
    fn add(&self, tenant_id: TenantId, record: R) -> Result<R, StoreError> {
        let id = record.document_id();
        let key = DocKey { tenant_id, id };
        let encoded = Self::encode(&record)?;

        let revision = {
            let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;
            if state.docs.contains_key(&key) {
                return Err(StoreError::Duplicate(format!("{}/{id}", R::COLLECTION)));
            }
            state.docs.insert(key, encoded);
            state.revision += 1;
            state.revision
        };

        self.publish(Change::Added {
            tenant_id,
            id,
            revision,
            record: record.clone(),
        });
        Ok(record)
    }

    fn update(&self, tenant_id: TenantId, record: R) -> Result<R, StoreError> {
        let id = record.document_id();
        let key = DocKey { tenant_id, id };
        let encoded = Self::encode(&record)?;

        let revision = {
            let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;
            match state.docs.get_mut(&key) {
                Some(slot) => *slot = encoded,
                None => return Err(StoreError::NotFound(format!("{}/{id}", R::COLLECTION))),
            }
            state.revision += 1;
            state.revision
        };

        self.publish(Change::Updated {
            tenant_id,
            id,
            revision,
            record: record.clone(),
        });
        Ok(record)
    }

    fn delete(&self, tenant_id: TenantId, id: AggregateId) -> Result<(), StoreError> {
        let key = DocKey { tenant_id, id };

        let revision = {
            let mut state = self.state.write().map_err(|_| StoreError::poisoned())?;
            if state.docs.remove(&key).is_none() {
                return Err(StoreError::NotFound(format!("{}/{id}", R::COLLECTION)));
            }
            state.revision += 1;
            state.revision
        };

        self.publish(Change::Removed {
            tenant_id,
            id,
            revision,
        });
        Ok(())
    }

    fn get(&self, tenant_id: TenantId, id: AggregateId) -> Result<Option<R>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::poisoned())?;
        state
            .docs
            .get(&DocKey { tenant_id, id })
            .map(Self::decode)
            .transpose()
    }

    fn list(&self, tenant_id: TenantId) -> Result<Vec<R>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::poisoned())?;
        state
            .docs
            .iter()
            .filter(|(k, _)| k.tenant_id == tenant_id)
            .map(|(_, v)| Self::decode(v))
            .collect()
    }

    fn subscribe(&self, tenant_id: TenantId) -> Subscription<Change<R>> {
        self.feed.subscribe_tenant(tenant_id)
    }
}

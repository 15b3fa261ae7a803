use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};

use orderdesk_core::{AggregateId, TenantId};
use orderdesk_events::{Change, Subscription, TenantScoped};
use orderdesk_sales::{Order, OrderFilter, OrderSort, OrderStats, Page, paginate, query_orders};

use crate::store::DocumentCollection;

#[derive(Debug, Default)]
struct BookState {
    orders: HashMap<AggregateId, Order>,
    /// Last applied revision per record, kept after removal.
    revisions: HashMap<AggregateId, u64>,
}

/// Local snapshot of one tenant's orders, kept current by the orders change feed.
///
/// Read models are disposable: `open` rebuilds one from the collection at any time.
/// Applying a change is idempotent, so changes that overlap the initial snapshot
/// are harmless. Revisions are compared per record: changes to different orders
/// may arrive in any order.
#[derive(Debug)]
pub struct OrderBook {
    tenant_id: TenantId,
    state: RwLock<BookState>,
}

impl OrderBook {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            state: RwLock::new(BookState::default()),
        }
    }

    /// Subscribe to `orders`, then load the current snapshot.
    ///
    /// Subscribing first means no write can fall between the snapshot and the feed.
    pub fn open<C>(orders: &C, tenant_id: TenantId) -> anyhow::Result<(Self, Subscription<Change<Order>>)>
    where
        C: DocumentCollection<Order>,
    {
        let subscription = orders.subscribe(tenant_id);
        let snapshot = orders
            .list(tenant_id)
            .with_context(|| format!("loading orders for tenant {tenant_id}"))?;

        let book = Self::new(tenant_id);
        {
            let mut state = book.write_state()?;
            state.orders = snapshot
                .into_iter()
                .map(|o| (o.id().0, o))
                .collect();
        }
        Ok((book, subscription))
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn write_state(&self) -> anyhow::Result<std::sync::RwLockWriteGuard<'_, BookState>> {
        self.state
            .write()
            .map_err(|_| anyhow::anyhow!("order book lock poisoned"))
    }

    /// Apply one change. Returns `false` for a change already seen.
    pub fn apply_change(&self, change: &Change<Order>) -> anyhow::Result<bool> {
        if change.tenant_id() != self.tenant_id {
            bail!(
                "change for tenant {} delivered to order book of tenant {}",
                change.tenant_id(),
                self.tenant_id
            );
        }
        if let Some(order) = change.record() {
            if order.tenant_id() != self.tenant_id {
                bail!("order {} carries tenant {}", order.number(), order.tenant_id());
            }
            if order.id().0 != change.record_id() {
                bail!("order {} does not match change id {}", order.id(), change.record_id());
            }
        }

        let mut state = self.write_state()?;
        let id = change.record_id();
        if state.revisions.get(&id).is_some_and(|seen| change.revision() <= *seen) {
            return Ok(false);
        }

        match change {
            Change::Added { id, record, .. } | Change::Updated { id, record, .. } => {
                state.orders.insert(*id, record.clone());
            }
            Change::Removed { id, .. } => {
                state.orders.remove(id);
            }
        }
        state.revisions.insert(id, change.revision());
        Ok(true)
    }

    /// Apply everything already delivered on `subscription` without blocking.
    pub fn catch_up(&self, subscription: &Subscription<Change<Order>>) -> anyhow::Result<usize> {
        let mut applied = 0;
        for change in subscription.drain() {
            if self
                .apply_change(&change)
                .with_context(|| format!("applying change revision {}", change.revision()))?
            {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Follow `subscription` until the feed is dropped. Intended for a dedicated thread.
    pub fn run(&self, subscription: Subscription<Change<Order>>) {
        while let Ok(change) = subscription.recv() {
            if let Err(err) = self.apply_change(&change) {
                tracing::error!(tenant_id = %self.tenant_id, error = %err, "order book change rejected");
            }
        }
        tracing::debug!(tenant_id = %self.tenant_id, "order book feed closed");
    }

    /// Snapshot, newest `created_at` first.
    pub fn orders(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = match self.state.read() {
            Ok(state) => state.orders.values().cloned().collect(),
            Err(_) => return vec![],
        };
        orders.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        orders
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|s| s.orders.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> OrderStats {
        OrderStats::from_orders(&self.orders())
    }

    /// Filtered, sorted page of the snapshot.
    pub fn query(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        page: usize,
        page_size: usize,
        now: DateTime<Utc>,
    ) -> Page<Order> {
        let snapshot = self.orders();
        let hits: Vec<Order> = query_orders(&snapshot, filter, sort, now)
            .into_iter()
            .cloned()
            .collect();
        paginate(&hits, page, page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCollection;
    use chrono::Duration;
    use orderdesk_core::{Aggregate, Money};
    use orderdesk_products::ProductId;
    use orderdesk_sales::{
        ClientSelection, DeliveryChoice, LineDraft, OrderAggregate, OrderCommand, OrderDraft,
        OrderId, OrderStatus, PlaceOrder,
    };

    fn order(tenant_id: TenantId, number: &str, created_at: DateTime<Utc>) -> Order {
        let order_id = OrderId::new(AggregateId::new());
        let mut agg = OrderAggregate::empty(order_id);
        let cmd = PlaceOrder {
            tenant_id,
            order_id,
            number: number.to_string(),
            draft: OrderDraft {
                client: ClientSelection::Individual("Nadia".to_string()),
                ordered_at: created_at,
                delivery: DeliveryChoice::Immediate,
                lines: vec![LineDraft::bound(
                    ProductId::new(AggregateId::new()),
                    "Tile",
                    3,
                    Money::from_major(4),
                )],
                apply_vat: false,
            },
            occurred_at: created_at,
        };
        for e in agg.handle(&OrderCommand::PlaceOrder(cmd)).unwrap() {
            agg.apply(&e);
        }
        agg.into_order().unwrap()
    }

    #[test]
    fn open_loads_snapshot_and_follows_changes() {
        let orders: InMemoryCollection<Order> = InMemoryCollection::new();
        let t = TenantId::new();
        let now = Utc::now();
        orders.add(t, order(t, "CMD-2026-001", now - Duration::hours(2))).unwrap();

        let (book, sub) = OrderBook::open(&orders, t).unwrap();
        assert_eq!(book.len(), 1);

        let second = orders.add(t, order(t, "CMD-2026-002", now)).unwrap();
        assert_eq!(book.catch_up(&sub).unwrap(), 1);

        let numbers: Vec<String> = book.orders().iter().map(|o| o.number().to_string()).collect();
        assert_eq!(numbers, ["CMD-2026-002", "CMD-2026-001"]);

        orders.delete(t, second.id().0).unwrap();
        book.catch_up(&sub).unwrap();
        assert_eq!(book.len(), 1);
        assert_eq!(book.stats().count(OrderStatus::Delivered), 1);
    }

    #[test]
    fn replayed_change_is_ignored() {
        let t = TenantId::new();
        let book = OrderBook::new(t);
        let o = order(t, "CMD-2026-001", Utc::now());
        let change = Change::Added {
            tenant_id: t,
            id: o.id().0,
            revision: 4,
            record: o,
        };
        assert!(book.apply_change(&change).unwrap());
        assert!(!book.apply_change(&change).unwrap());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn changes_to_different_orders_apply_in_any_order() {
        let t = TenantId::new();
        let book = OrderBook::new(t);
        let a = order(t, "CMD-2026-001", Utc::now());
        let b = order(t, "CMD-2026-002", Utc::now());

        let later = Change::Added {
            tenant_id: t,
            id: b.id().0,
            revision: 2,
            record: b,
        };
        let earlier = Change::Added {
            tenant_id: t,
            id: a.id().0,
            revision: 1,
            record: a,
        };
        assert!(book.apply_change(&later).unwrap());
        assert!(book.apply_change(&earlier).unwrap());
        assert_eq!(book.len(), 2);
    }

    #[test]
    fn stale_change_to_same_order_is_ignored() {
        let t = TenantId::new();
        let book = OrderBook::new(t);
        let placed = order(t, "CMD-2026-001", Utc::now());
        let id = placed.id().0;

        book.apply_change(&Change::Removed {
            tenant_id: t,
            id,
            revision: 5,
        })
        .unwrap();
        let stale = Change::Updated {
            tenant_id: t,
            id,
            revision: 3,
            record: placed,
        };
        assert!(!book.apply_change(&stale).unwrap());
        assert!(book.is_empty());
    }

    #[test]
    fn foreign_tenant_change_is_rejected() {
        let t = TenantId::new();
        let other = TenantId::new();
        let book = OrderBook::new(t);
        let o = order(other, "CMD-2026-001", Utc::now());
        let change = Change::Added {
            tenant_id: other,
            id: o.id().0,
            revision: 1,
            record: o,
        };
        assert!(book.apply_change(&change).is_err());
        assert!(book.is_empty());
    }

    #[test]
    fn query_pages_the_snapshot() {
        let t = TenantId::new();
        let book = OrderBook::new(t);
        let now = Utc::now();
        for i in 0..12u64 {
            let o = order(t, &format!("CMD-2026-{:03}", i + 1), now - Duration::minutes(i as i64));
            book.apply_change(&Change::Added {
                tenant_id: t,
                id: o.id().0,
                revision: i + 1,
                record: o,
            })
            .unwrap();
        }

        let page = book.query(&OrderFilter::default(), OrderSort::default(), 2, 10, now);
        assert_eq!(page.total_items, 12);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].number(), "CMD-2026-012");
    }
}

//! In-process change feed.

use std::sync::{Mutex, mpsc};

use crate::feed::{ChangeFeed, Filter, Subscription};

#[derive(Debug)]
pub enum FeedError {
    /// Subscriber list lock was poisoned by a panicking publisher.
    Poisoned,
}

struct Subscriber<M> {
    filter: Filter<M>,
    sender: mpsc::Sender<M>,
}

/// Fan-out over std channels. Subscribers whose receiver was dropped are pruned on
/// the next publish.
pub struct InMemoryChangeFeed<M> {
    subscribers: Mutex<Vec<Subscriber<M>>>,
}

impl<M> InMemoryChangeFeed<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live subscribers (as of the last publish).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl<M> Default for InMemoryChangeFeed<M> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl<M> core::fmt::Debug for InMemoryChangeFeed<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryChangeFeed")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<M> ChangeFeed<M> for InMemoryChangeFeed<M>
where
    M: Clone + Send + 'static,
{
    type Error = FeedError;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        let mut subs = self.subscribers.lock().map_err(|_| FeedError::Poisoned)?;

        subs.retain(|sub| {
            if !(sub.filter)(&message) {
                return true;
            }
            sub.sender.send(message.clone()).is_ok()
        });

        Ok(())
    }

    fn subscribe(&self, filter: Filter<M>) -> Subscription<M> {
        let (sender, receiver) = mpsc::channel();

        match self.subscribers.lock() {
            Ok(mut subs) => subs.push(Subscriber { filter, sender }),
            Err(_) => tracing::warn!("change feed lock poisoned; subscription will stay empty"),
        }

        Subscription::new(receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::Change;
    use orderdesk_core::{AggregateId, TenantId};

    fn added(tenant_id: TenantId, revision: u64) -> Change<String> {
        Change::Added {
            tenant_id,
            id: AggregateId::new(),
            revision,
            record: format!("rec-{revision}"),
        }
    }

    #[test]
    fn tenant_subscription_only_sees_its_tenant() {
        let feed: InMemoryChangeFeed<Change<String>> = InMemoryChangeFeed::new();
        let a = TenantId::new();
        let b = TenantId::new();
        let sub_a = feed.subscribe_tenant(a);

        feed.publish(added(a, 1)).unwrap();
        feed.publish(added(b, 2)).unwrap();
        feed.publish(added(a, 3)).unwrap();

        let got: Vec<u64> = sub_a.drain().iter().map(|c| c.revision()).collect();
        assert_eq!(got, vec![1, 3]);
    }

    #[test]
    fn every_subscriber_gets_a_copy() {
        let feed: InMemoryChangeFeed<Change<String>> = InMemoryChangeFeed::new();
        let t = TenantId::new();
        let first = feed.subscribe(Box::new(|_: &Change<String>| true));
        let second = feed.subscribe(Box::new(|_: &Change<String>| true));

        feed.publish(added(t, 1)).unwrap();

        assert_eq!(first.drain().len(), 1);
        assert_eq!(second.drain().len(), 1);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let feed: InMemoryChangeFeed<Change<String>> = InMemoryChangeFeed::new();
        let t = TenantId::new();
        {
            let _sub = feed.subscribe(Box::new(|_: &Change<String>| true));
        }
        assert_eq!(feed.subscriber_count(), 1);
        feed.publish(added(t, 1)).unwrap();
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn removal_has_no_record() {
        let change: Change<String> = Change::Removed {
            tenant_id: TenantId::new(),
            id: AggregateId::new(),
            revision: 7,
        };
        assert!(change.is_removal());
        assert!(change.record().is_none());
        assert_eq!(change.revision(), 7);
    }
}

//! Live change feed abstraction.
//!
//! A feed fans every published message out to the subscribers whose filter accepts it.
//! Delivery is at-least-once from the consumer's point of view: a consumer that
//! resubscribes after loading a snapshot may see a change it already applied, so
//! consumers compare `Change::revision` before applying.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvError, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use orderdesk_core::TenantId;

use crate::tenant::TenantScoped;

/// Subscriber-side predicate; only accepted messages are delivered.
pub type Filter<M> = Box<dyn Fn(&M) -> bool + Send + Sync>;

/// Receiving end of a subscription. Intended for a single consuming thread.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    pub fn recv(&self) -> Result<M, RecvError> {
        self.receiver.recv()
    }

    pub fn try_recv(&self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Everything already delivered, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Publish/subscribe over committed changes.
pub trait ChangeFeed<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self, filter: Filter<M>) -> Subscription<M>;

    /// Subscription limited to one tenant's messages.
    fn subscribe_tenant(&self, tenant_id: TenantId) -> Subscription<M>
    where
        M: TenantScoped + 'static,
    {
        self.subscribe(Box::new(move |m: &M| m.tenant_id() == tenant_id))
    }
}

impl<M, F> ChangeFeed<M> for Arc<F>
where
    F: ChangeFeed<M> + ?Sized,
{
    type Error = F::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self, filter: Filter<M>) -> Subscription<M> {
        (**self).subscribe(filter)
    }
}

//! Topic-based publish/subscribe bus.
//!
//! Handlers are registered per [`Topic`] and receive every [`Signal`]
//! published on it, in registration order. Registration returns a
//! [`Subscription`] guard; dropping the guard removes the handler.
//!
//! Handlers are collected before they are invoked, so a handler may publish
//! or subscribe without deadlocking the bus.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::trace;

use super::{Signal, Topic};

type Handler = Arc<dyn Fn(&Signal) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    handlers: HashMap<Topic, Vec<(u64, Handler)>>,
}

fn lock(inner: &Mutex<BusInner>) -> MutexGuard<'_, BusInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Shared handle to a signal bus.
///
/// Cloning a `SignalBus` yields another handle to the same handler table.
#[derive(Clone, Default)]
pub struct SignalBus {
    inner: Arc<Mutex<BusInner>>,
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        let handler_count: usize = inner.handlers.values().map(Vec::len).sum();
        f.debug_struct("SignalBus")
            .field("topics", &inner.handlers.len())
            .field("handlers", &handler_count)
            .finish()
    }
}

impl SignalBus {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for every signal published on `topic`.
    ///
    /// The handler stays registered until the returned guard is dropped.
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&Signal) + Send + Sync + 'static,
    {
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id = inner.next_id.wrapping_add(1);
        inner
            .handlers
            .entry(topic)
            .or_default()
            .push((id, Arc::new(handler)));
        trace!(?topic, id, "subscribed");
        Subscription {
            bus: Arc::downgrade(&self.inner),
            topic,
            id,
        }
    }

    /// Delivers `signal` to every handler registered for its topic.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&self, signal: &Signal) -> usize {
        let topic = signal.topic();
        let handlers: Vec<Handler> = {
            let inner = lock(&self.inner);
            inner
                .handlers
                .get(&topic)
                .map(|entries| entries.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };
        trace!(?topic, handlers = handlers.len(), "publishing");
        for handler in &handlers {
            handler(signal);
        }
        handlers.len()
    }

    /// Returns whether any handler is registered for `topic`.
    #[must_use]
    pub fn has_subscribers(&self, topic: Topic) -> bool {
        self.subscriber_count(topic) > 0
    }

    /// Returns the number of handlers registered for `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        lock(&self.inner).handlers.get(&topic).map_or(0, Vec::len)
    }
}

/// Registration guard returned by [`SignalBus::subscribe`].
///
/// Dropping the guard unregisters the handler. Guards outliving their bus
/// are inert.
#[must_use = "dropping a Subscription unregisters its handler immediately"]
pub struct Subscription {
    bus: Weak<Mutex<BusInner>>,
    topic: Topic,
    id: u64,
}

impl Subscription {
    /// The topic this guard is registered on.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        self.topic
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.bus.upgrade() else {
            return;
        };
        let mut guard = lock(&inner);
        if let Some(entries) = guard.handlers.get_mut(&self.topic) {
            entries.retain(|(id, _)| *id != self.id);
            if entries.is_empty() {
                guard.handlers.remove(&self.topic);
            }
        }
        trace!(topic = ?self.topic, id = self.id, "unsubscribed");
    }
}

//! In-process publish/subscribe channel
//!
//! The store publishes after every successful mutation; analytics panels and
//! grids subscribe to re-derive their views. Delivery is synchronous and
//! at-most-once per subscriber per publish, with no queueing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Event published whenever the product collection changes
pub const INVENTORY_CHANGED: &str = "inventory:changed";

/// What happened to the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Loaded,
    Created,
    Updated,
    Deleted,
}

/// Advisory payload: "something changed, re-derive". Never the diff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub product_id: Option<String>,
    pub product_count: usize,
    pub timestamp: DateTime<Utc>,
}

type Handler<P> = Arc<dyn Fn(&P) + Send + Sync>;

struct Registry<P> {
    next_id: u64,
    handlers: HashMap<String, Vec<(u64, Handler<P>)>>,
}

impl<P> Default for Registry<P> {
    fn default() -> Self {
        Self {
            next_id: 0,
            handlers: HashMap::new(),
        }
    }
}

fn lock<P>(registry: &Mutex<Registry<P>>) -> MutexGuard<'_, Registry<P>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Named-event broadcast channel. Clones share the same subscribers.
pub struct EventChannel<P> {
    registry: Arc<Mutex<Registry<P>>>,
}

/// Channel carrying inventory change events
pub type ChangeChannel = EventChannel<ChangeEvent>;

impl<P> Clone for EventChannel<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<P> Default for EventChannel<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> EventChannel<P> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    /// Register `handler` for `event`. Keep the returned subscription to
    /// unsubscribe later.
    pub fn subscribe<F>(&self, event: &str, handler: F) -> Subscription<P>
    where
        F: Fn(&P) + Send + Sync + 'static,
        P: 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry
            .handlers
            .entry(event.to_string())
            .or_default()
            .push((id, Arc::new(handler)));

        Subscription {
            registry: Arc::downgrade(&self.registry),
            event: event.to_string(),
            id,
        }
    }

    /// Deliver `payload` to every current subscriber of `event`.
    ///
    /// Handlers run after the registry lock is released, so they may
    /// subscribe or unsubscribe. Returns the number of handlers invoked.
    pub fn publish(&self, event: &str, payload: &P) -> usize {
        let handlers: Vec<Handler<P>> = {
            let registry = lock(&self.registry);
            match registry.handlers.get(event) {
                Some(handlers) => handlers.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return 0,
            }
        };

        for handler in &handlers {
            handler(payload);
        }

        tracing::trace!(event, delivered = handlers.len(), "Published event");
        handlers.len()
    }

    pub fn subscriber_count(&self, event: &str) -> usize {
        lock(&self.registry)
            .handlers
            .get(event)
            .map_or(0, Vec::len)
    }
}

/// Handle returned by [`EventChannel::subscribe`]
pub struct Subscription<P> {
    registry: Weak<Mutex<Registry<P>>>,
    event: String,
    id: u64,
}

impl<P> Subscription<P> {
    /// Stop receiving events. Returns false if the channel is gone or the
    /// handler was already removed.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = lock(&registry);
        let Some(handlers) = registry.handlers.get_mut(&self.event) else {
            return false;
        };

        let before = handlers.len();
        handlers.retain(|(id, _)| *id != self.id);
        let removed = handlers.len() != before;
        if handlers.is_empty() {
            registry.handlers.remove(&self.event);
        }
        removed
    }

    pub fn event(&self) -> &str {
        &self.event
    }
}

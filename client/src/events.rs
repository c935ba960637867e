//! In-process broadcast channel with latest-value replay.
//!
//! DESIGN
//! ======
//! Each subscriber owns an unbounded mpsc receiver, so every published value
//! is delivered in order and nothing is coalesced. A new subscriber first
//! receives the most recent value, which lets late subscribers (the route
//! guard started after the session manager) see the current state without a
//! separate "get then subscribe" race. Dropping a `Subscription` removes its
//! sender from the hub.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::mpsc;

struct Hub<T> {
    next_id: u64,
    latest: Option<T>,
    subscribers: HashMap<u64, mpsc::UnboundedSender<T>>,
    closed: bool,
}

/// Multi-subscriber publisher. Cloning shares the same hub.
pub struct Broadcast<T> {
    hub: Arc<Mutex<Hub<T>>>,
}

impl<T> Clone for Broadcast<T> {
    fn clone(&self) -> Self {
        Self { hub: Arc::clone(&self.hub) }
    }
}

impl<T: Clone + Send + 'static> Default for Broadcast<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + 'static> Broadcast<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            hub: Arc::new(Mutex::new(Hub { next_id: 0, latest: None, subscribers: HashMap::new(), closed: false })),
        }
    }

    /// Hub that replays `initial` to its first subscribers.
    #[must_use]
    pub fn with_latest(initial: T) -> Self {
        let this = Self::new();
        this.lock().latest = Some(initial);
        this
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Hub<T>> {
        self.hub.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe. The latest value, if any, is delivered first.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut hub = self.lock();
        let id = hub.next_id;
        hub.next_id += 1;
        if !hub.closed {
            if let Some(latest) = hub.latest.clone() {
                let _ = tx.send(latest);
            }
            hub.subscribers.insert(id, tx);
        }
        Subscription { id, rx, hub: Arc::downgrade(&self.hub) }
    }

    /// Record `value` as latest and deliver it to every subscriber.
    pub fn publish(&self, value: T) {
        let mut hub = self.lock();
        if hub.closed {
            return;
        }
        hub.subscribers.retain(|_, tx| tx.send(value.clone()).is_ok());
        hub.latest = Some(value);
    }

    #[must_use]
    pub fn latest(&self) -> Option<T> {
        self.lock().latest.clone()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// End every subscription. Later publishes are ignored and later
    /// subscriptions yield nothing.
    pub fn close(&self) {
        let mut hub = self.lock();
        hub.closed = true;
        hub.subscribers.clear();
    }
}

impl<T: Clone + PartialEq + Send + 'static> Broadcast<T> {
    /// Publish only when `value` differs from the latest one. Returns whether
    /// it was published.
    pub fn publish_changed(&self, value: T) -> bool {
        if self.lock().latest.as_ref() == Some(&value) {
            return false;
        }
        self.publish(value);
        true
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Ordered stream of values from a [`Broadcast`].
pub struct Subscription<T> {
    id: u64,
    rx: mpsc::UnboundedReceiver<T>,
    hub: Weak<Mutex<Hub<T>>>,
}

impl<T> Subscription<T> {
    /// Next value, or `None` once the hub is closed or dropped.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Next value if one is already queued.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .subscribers
                .remove(&self.id);
        }
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

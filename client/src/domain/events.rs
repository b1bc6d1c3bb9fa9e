//! Synchronous multi-subscriber event bus and the session events it carries.
//!
//! Handlers run on the publishing thread in subscription order. Late
//! subscribers see only events published after they subscribed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::auth::Roles;

/// Events emitted by the session facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Login state after a login attempt or logout.
    LoginStateChanged(bool),
    /// Roles after a login attempt or logout; empty when logged out.
    RolesChanged(Roles),
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Publish/subscribe hub for events of type `E`.
pub struct EventBus<E> {
    next_id: AtomicU64,
    handlers: Mutex<Vec<(SubscriptionId, Handler<E>)>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            handlers: Mutex::new(Vec::new()),
        }
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<E> EventBus<E> {
    /// Create a bus without subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` and return its subscription handle.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(handler)));
        id
    }

    /// Remove a subscription. Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.lock();
        let before = handlers.len();
        handlers.retain(|(candidate, _)| *candidate != id);
        handlers.len() != before
    }

    /// Deliver `event` to every current subscriber and return how many
    /// handlers ran.
    ///
    /// The subscriber list is snapshotted before delivery, so handlers may
    /// subscribe or unsubscribe without deadlocking.
    pub fn publish(&self, event: &E) -> usize {
        let snapshot: Vec<Handler<E>> = self
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in &snapshot {
            handler(event);
        }
        snapshot.len()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Handler<E>)>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

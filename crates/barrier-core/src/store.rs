//! State store: the single owner of the current [`SystemState`].
//!
//! Consumers read the current snapshot with [`StateStore::snapshot`] and
//! register for changes with [`StateStore::subscribe`]. Every committed
//! mutation replaces the snapshot with a freshly built `Arc<SystemState>`,
//! so two snapshots can be compared for change with [`Arc::ptr_eq`].
//!
//! # Locking
//!
//! The snapshot sits behind an [`RwLock`] that is held only while a
//! mutation closure runs and the new value is swapped in. Subscriber
//! callbacks are invoked after the lock is released, so a callback may
//! read the store, mutate it, or drop its own [`Subscription`] without
//! deadlocking.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use barrier_types::SystemState;
use tracing::trace;

/// Callback invoked with every newly committed snapshot.
pub type ChangeCallback = dyn Fn(&Arc<SystemState>) + Send + Sync;

/// One registered observer.
struct Subscriber {
    id: u64,
    active: AtomicBool,
    callback: Box<ChangeCallback>,
}

/// Registry of observers, shared with outstanding [`Subscription`] handles.
#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    subscribers: Mutex<Vec<Arc<Subscriber>>>,
}

impl Registry {
    fn insert(&self, callback: Box<ChangeCallback>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let subscriber = Arc::new(Subscriber {
            id,
            active: AtomicBool::new(true),
            callback,
        });
        self.lock().push(subscriber);
        id
    }

    fn remove(&self, id: u64) {
        let mut subscribers = self.lock();
        if let Some(pos) = subscribers.iter().position(|s| s.id == id) {
            let removed = subscribers.remove(pos);
            // A notification round may already hold a clone of this
            // subscriber; clearing the flag keeps it from being called.
            removed.active.store(false, Ordering::Release);
        }
    }

    fn active(&self) -> Vec<Arc<Subscriber>> {
        self.lock().clone()
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Arc<Subscriber>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle returned by [`StateStore::subscribe`].
///
/// Dropping the handle unsubscribes. [`Subscription::unsubscribe`] does the
/// same explicitly; both are idempotent and safe to call from inside a
/// change callback.
#[must_use = "dropping a Subscription immediately unsubscribes"]
pub struct Subscription {
    registry: Weak<Registry>,
    id: u64,
    released: bool,
}

impl Subscription {
    /// Stop receiving change notifications.
    pub fn unsubscribe(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("released", &self.released)
            .finish()
    }
}

/// Owner of the live [`SystemState`] snapshot.
pub struct StateStore {
    current: RwLock<Arc<SystemState>>,
    registry: Arc<Registry>,
}

impl StateStore {
    /// Create a store holding the given initial state.
    pub fn new(initial: SystemState) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            registry: Arc::new(Registry::default()),
        }
    }

    /// Return the current immutable snapshot.
    pub fn snapshot(&self) -> Arc<SystemState> {
        Arc::clone(&*self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Register a callback invoked synchronously after every committed
    /// mutation.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Arc<SystemState>) + Send + Sync + 'static,
    {
        let id = self.registry.insert(Box::new(callback));
        trace!(subscriber = id, "Subscriber registered");
        Subscription {
            registry: Arc::downgrade(&self.registry),
            id,
            released: false,
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Apply a mutation atomically.
    ///
    /// The closure sees the current state and either returns a replacement
    /// state plus a result (`Some`), which is committed and broadcast to
    /// subscribers, or `None` to leave the store untouched and notify no
    /// one. Mutations are serialized by the write lock.
    pub fn update<F, R>(&self, mutate: F) -> Option<R>
    where
        F: FnOnce(&SystemState) -> Option<(SystemState, R)>,
    {
        let committed = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let (next, result) = mutate(guard.as_ref())?;
            let next = Arc::new(next);
            *guard = Arc::clone(&next);
            (next, result)
        };
        let (snapshot, result) = committed;
        self.notify(&snapshot);
        Some(result)
    }

    fn notify(&self, snapshot: &Arc<SystemState>) {
        for subscriber in self.registry.active() {
            if subscriber.active.load(Ordering::Acquire) {
                (subscriber.callback)(snapshot);
            }
        }
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("snapshot", &self.snapshot())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use rust_decimal::Decimal;

    use super::*;

    fn make_store() -> StateStore {
        StateStore::new(SystemState::initial(Decimal::new(125, 1)))
    }

    fn flip(store: &StateStore) {
        let _ = store.update(|state| {
            let mut next = state.clone();
            next.barrier_active = !state.barrier_active;
            Some((next, ()))
        });
    }

    #[test]
    fn commit_replaces_snapshot() {
        let store = make_store();
        let before = store.snapshot();
        flip(&store);
        let after = store.snapshot();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(before.barrier_active);
        assert!(!after.barrier_active);
    }

    #[test]
    fn skipped_update_keeps_snapshot_and_stays_silent() {
        let store = make_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let before = store.snapshot();
        let result: Option<()> = store.update(|_| None);
        assert!(result.is_none());
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscribers_see_each_new_snapshot() {
        let store = make_store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move |snap| {
            sink.lock().unwrap().push(snap.barrier_active);
        });

        flip(&store);
        flip(&store);
        assert_eq!(*seen.lock().unwrap(), vec![false, true]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let store = make_store();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(store.subscriber_count(), 1);

        flip(&store);
        drop(sub);
        flip(&store);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let store = make_store();
        let mut sub = store.subscribe(|_| {});
        sub.unsubscribe();
        sub.unsubscribe();
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn unsubscribe_during_notification_is_safe() {
        let store = make_store();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicUsize::new(0));

        let own_slot = Arc::clone(&slot);
        let counter = Arc::clone(&calls);
        let sub = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(mut own) = own_slot.lock().unwrap().take() {
                own.unsubscribe();
            }
        });
        *slot.lock().unwrap() = Some(sub);

        flip(&store);
        flip(&store);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn unsubscribing_a_later_subscriber_mid_round_skips_it() {
        let store = make_store();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let later_calls = Arc::new(AtomicUsize::new(0));

        let victim_slot = Arc::clone(&slot);
        let _first = store.subscribe(move |_| {
            if let Some(mut victim) = victim_slot.lock().unwrap().take() {
                victim.unsubscribe();
            }
        });
        let counter = Arc::clone(&later_calls);
        let second = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        *slot.lock().unwrap() = Some(second);

        flip(&store);
        assert_eq!(later_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn callback_may_read_the_store() {
        let store = Arc::new(make_store());
        let observed = Arc::new(Mutex::new(None));
        let reader = Arc::downgrade(&store);
        let sink = Arc::clone(&observed);
        let _sub = store.subscribe(move |snap| {
            if let Some(store) = reader.upgrade() {
                *sink.lock().unwrap() = Some(Arc::ptr_eq(snap, &store.snapshot()));
            }
        });
        flip(&store);
        assert_eq!(*observed.lock().unwrap(), Some(true));
    }
}

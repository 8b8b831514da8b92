// src/services/watchlist_store.rs
//
// Watchlist Store - persisted, insertion-ordered set of movie ids
//
// CRITICAL RULES:
// - Holds identifiers only; movie records are always joined from the catalog
// - No duplicate identifiers, ever
// - Every local mutation is persisted (best-effort) and broadcast
// - Remote changes are applied idempotently and never re-persisted
// - Echoes of this instance's own writes are ignored

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::Watchlist;
use crate::events::{ChangeNotifier, SubscriptionId, WatchlistChanged};
use crate::infrastructure::PersistedState;
use crate::repositories::KeyValueStorage;

pub const WATCHLIST_NAMESPACE: &str = "watchlist-storage";
/// Version 1 stored full movie records; version 2 stores ids only
pub const WATCHLIST_VERSION: u32 = 2;

pub struct WatchlistStore {
    origin: Uuid,
    state: watch::Sender<Watchlist>,
    persisted: PersistedState<Watchlist>,
    notifier: ChangeNotifier,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl WatchlistStore {
    /// Load the persisted watchlist and start listening for remote changes
    pub fn init(storage: Arc<dyn KeyValueStorage>, notifier: ChangeNotifier) -> Arc<Self> {
        let persisted = PersistedState::new(storage, WATCHLIST_NAMESPACE, WATCHLIST_VERSION);
        let watchlist: Watchlist = persisted.load();
        log::info!("[WATCHLIST] loaded {} movies", watchlist.len());

        let (state, _) = watch::channel(watchlist);
        let store = Arc::new(Self {
            origin: Uuid::new_v4(),
            state,
            persisted,
            notifier,
            subscription: Mutex::new(None),
        });

        let weak = Arc::downgrade(&store);
        let id = store.notifier.listen::<WatchlistChanged, _>(move |event| {
            if let Some(store) = weak.upgrade() {
                store.apply_remote(event);
            }
        });
        *store.subscription.lock().unwrap_or_else(|e| e.into_inner()) = id;

        store
    }

    pub fn origin(&self) -> Uuid {
        self.origin
    }

    /// Insert `movie_id`; returns false (no-op) when already present
    pub fn add(&self, movie_id: i64) -> bool {
        self.mutate(|w| w.add(movie_id))
    }

    /// Remove `movie_id`; returns false (no-op) when absent
    pub fn remove(&self, movie_id: i64) -> bool {
        self.mutate(|w| w.remove(movie_id))
    }

    /// Add when absent, remove when present. Returns the new membership.
    pub fn toggle(&self, movie_id: i64) -> bool {
        if self.contains(movie_id) {
            self.remove(movie_id);
            false
        } else {
            self.add(movie_id);
            true
        }
    }

    pub fn clear(&self) {
        self.mutate(|w| {
            if w.is_empty() {
                return false;
            }
            w.clear();
            true
        });
    }

    pub fn contains(&self, movie_id: i64) -> bool {
        self.state.borrow().contains(movie_id)
    }

    /// Movie ids in insertion order
    pub fn list(&self) -> Vec<i64> {
        self.state.borrow().ids().to_vec()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    pub fn state(&self) -> Watchlist {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Watchlist> {
        self.state.subscribe()
    }

    /// Await persistence writes issued so far
    pub async fn flush(&self) {
        self.persisted.flush().await;
    }

    /// Stop applying remote changes
    pub fn dispose(&self) {
        if let Some(id) = self
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            self.notifier.unlisten(id);
        }
    }

    fn mutate<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut Watchlist) -> bool,
    {
        let mut snapshot = None;
        let changed = self.state.send_if_modified(|watchlist| {
            if !f(watchlist) {
                return false;
            }
            // Saved under the state lock so writes reach storage in mutation order
            self.persisted.save(watchlist);
            snapshot = Some(watchlist.ids().to_vec());
            true
        });

        if let Some(movie_ids) = snapshot {
            log::debug!("[WATCHLIST] now {} movies", movie_ids.len());
            self.notifier
                .publish(WatchlistChanged::new(self.origin, movie_ids));
        }
        changed
    }

    fn apply_remote(&self, event: &WatchlistChanged) {
        if event.origin == self.origin {
            return;
        }
        let incoming: Watchlist = event.movie_ids.iter().copied().collect();
        let applied = self.state.send_if_modified(|watchlist| {
            if *watchlist == incoming {
                return false;
            }
            *watchlist = incoming;
            true
        });
        if applied {
            log::debug!("[WATCHLIST] applied remote change from {}", event.origin);
        }
    }
}

impl Drop for WatchlistStore {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::repositories::InMemoryKeyValueStorage;

    fn storage() -> Arc<dyn KeyValueStorage> {
        Arc::new(InMemoryKeyValueStorage::new())
    }

    #[test]
    fn test_add_remove_contains() {
        let store = WatchlistStore::init(storage(), ChangeNotifier::Local);

        assert!(store.add(5));
        assert!(store.add(2));
        assert!(!store.add(5));
        assert_eq!(store.list(), vec![5, 2]);
        assert!(store.contains(2));

        assert!(store.remove(2));
        assert!(!store.remove(2));
        assert_eq!(store.list(), vec![5]);
    }

    #[test]
    fn test_toggle_and_clear() {
        let store = WatchlistStore::init(storage(), ChangeNotifier::Local);
        assert!(store.toggle(7));
        assert!(!store.toggle(7));
        store.add(1);
        store.add(2);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_persisted_across_instances() {
        let storage = storage();
        let first = WatchlistStore::init(Arc::clone(&storage), ChangeNotifier::Local);
        first.add(9);
        first.add(3);

        let second = WatchlistStore::init(storage, ChangeNotifier::Local);
        assert_eq!(second.list(), vec![9, 3]);
    }

    #[test]
    fn test_old_record_version_is_discarded() {
        let storage = storage();
        storage
            .write(
                WATCHLIST_NAMESPACE,
                r#"{"version":1,"state":{"movies":[{"id":1,"title":"Old"}]}}"#,
            )
            .unwrap();

        let store = WatchlistStore::init(storage, ChangeNotifier::Local);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remote_change_converges_without_echo() {
        let bus = Arc::new(EventBus::new());
        let storage = storage();
        let tab_a = WatchlistStore::init(Arc::clone(&storage), ChangeNotifier::broadcast(Arc::clone(&bus)));
        let tab_b = WatchlistStore::init(storage, ChangeNotifier::broadcast(Arc::clone(&bus)));

        tab_a.add(4);
        tab_a.add(8);
        assert_eq!(tab_b.list(), vec![4, 8]);

        tab_b.remove(4);
        assert_eq!(tab_a.list(), vec![8]);
        assert_eq!(bus.get_event_log().len(), 3);
    }

    #[test]
    fn test_disposed_store_ignores_remote_changes() {
        let bus = Arc::new(EventBus::new());
        let tab_a = WatchlistStore::init(storage(), ChangeNotifier::broadcast(Arc::clone(&bus)));
        let tab_b = WatchlistStore::init(storage(), ChangeNotifier::broadcast(Arc::clone(&bus)));

        tab_b.dispose();
        tab_a.add(1);
        assert!(tab_b.is_empty());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let store = WatchlistStore::init(storage(), ChangeNotifier::Local);
        let mut rx = store.subscribe();
        store.add(11);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().ids(), &[11]);

        store.add(11);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_flush_inside_runtime() {
        let storage = storage();
        let store = WatchlistStore::init(Arc::clone(&storage), ChangeNotifier::Local);
        store.add(21);
        store.flush().await;

        assert_eq!(
            storage.read(WATCHLIST_NAMESPACE).unwrap().as_deref(),
            Some(r#"{"version":2,"state":{"movie_ids":[21]}}"#)
        );
    }
}

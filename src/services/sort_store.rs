// src/services/sort_store.rs
//
// Sort Preference Store - one persisted sort option per context
//
// The store only stores and retrieves. The toggle rule (same field flips,
// other field starts at its default direction) lives in
// `SortOption::select`; `select_field` is a convenience that applies it.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::{SortContext, SortDirection, SortField, SortOption, SortPreferences};
use crate::events::{ChangeNotifier, SortPreferenceChanged, SubscriptionId};
use crate::infrastructure::PersistedState;
use crate::repositories::KeyValueStorage;

pub const SORT_NAMESPACE: &str = "sort-storage";
pub const SORT_VERSION: u32 = 1;

pub struct SortStore {
    origin: Uuid,
    state: watch::Sender<SortPreferences>,
    persisted: PersistedState<SortPreferences>,
    notifier: ChangeNotifier,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl SortStore {
    pub fn init(storage: Arc<dyn KeyValueStorage>, notifier: ChangeNotifier) -> Arc<Self> {
        let persisted = PersistedState::new(storage, SORT_NAMESPACE, SORT_VERSION);
        let prefs: SortPreferences = persisted.load();
        log::info!(
            "[SORT] search={} watchlist={}",
            prefs.search_sort,
            prefs.watchlist_sort
        );

        let (state, _) = watch::channel(prefs);
        let store = Arc::new(Self {
            origin: Uuid::new_v4(),
            state,
            persisted,
            notifier,
            subscription: Mutex::new(None),
        });

        let weak = Arc::downgrade(&store);
        let id = store.notifier.listen::<SortPreferenceChanged, _>(move |event| {
            if let Some(store) = weak.upgrade() {
                store.apply_remote(event);
            }
        });
        *store.subscription.lock().unwrap_or_else(|e| e.into_inner()) = id;

        store
    }

    pub fn get_sort(&self, context: SortContext) -> SortOption {
        self.state.borrow().get(context)
    }

    pub fn set_sort(&self, context: SortContext, field: SortField, direction: SortDirection) {
        self.set_option(context, SortOption::new(field, direction));
    }

    pub fn set_option(&self, context: SortContext, option: SortOption) {
        let changed = self.state.send_if_modified(|prefs| {
            if !prefs.set(context, option) {
                return false;
            }
            self.persisted.save(prefs);
            true
        });

        if changed {
            log::debug!("[SORT] {:?} -> {}", context, option);
            self.notifier
                .publish(SortPreferenceChanged::new(self.origin, context, option));
        }
    }

    /// Apply the toggle rule for a picked field and store the result
    pub fn select_field(&self, context: SortContext, field: SortField) -> SortOption {
        let next = self.get_sort(context).select(field);
        self.set_option(context, next);
        next
    }

    pub fn state(&self) -> SortPreferences {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SortPreferences> {
        self.state.subscribe()
    }

    pub async fn flush(&self) {
        self.persisted.flush().await;
    }

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

    fn apply_remote(&self, event: &SortPreferenceChanged) {
        if event.origin == self.origin {
            return;
        }
        self.state
            .send_if_modified(|prefs| prefs.set(event.context, event.sort));
    }
}

impl Drop for SortStore {
    fn drop(&mut self) {
        self.dispose();
    }
}

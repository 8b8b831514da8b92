// src/services/locale_store.rs
//
// Locale Preference Store - system (UI) language and movie (content) language
//
// CRITICAL RULES:
// - Both settings are persisted and broadcast on every local change
// - Remote changes are applied idempotently; own echoes are ignored
// - Any change evicts cached queries tagged with the previous language,
//   locally and in every context that applies the remote change
// - The locale segment of the current path wins over the stored system language

use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use uuid::Uuid;

use crate::domain::{
    canonical_ui_language, is_content_language, locale_from_path, DomainError, DomainResult,
    LocalePreference,
};
use crate::events::{ChangeNotifier, MovieLanguageChanged, SubscriptionId, SystemLanguageChanged};
use crate::infrastructure::PersistedState;
use crate::repositories::KeyValueStorage;
use crate::services::query_cache::QueryCache;

pub const LOCALE_NAMESPACE: &str = "language-storage";
pub const LOCALE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LanguageSetting {
    System,
    Movie,
}

impl LanguageSetting {
    fn slot(self, prefs: &mut LocalePreference) -> &mut String {
        match self {
            LanguageSetting::System => &mut prefs.system_language,
            LanguageSetting::Movie => &mut prefs.movie_language,
        }
    }
}

pub struct LocaleStore {
    origin: Uuid,
    state: watch::Sender<LocalePreference>,
    persisted: PersistedState<LocalePreference>,
    notifier: ChangeNotifier,
    cache: Option<Arc<QueryCache>>,
    subscriptions: Mutex<Vec<SubscriptionId>>,
}

impl LocaleStore {
    /// Load persisted languages (both default to `fallback_language`) and
    /// start listening for changes made in other contexts.
    pub fn init(
        storage: Arc<dyn KeyValueStorage>,
        notifier: ChangeNotifier,
        fallback_language: &str,
        cache: Option<Arc<QueryCache>>,
    ) -> Arc<Self> {
        let persisted = PersistedState::new(storage, LOCALE_NAMESPACE, LOCALE_VERSION);
        let mut prefs = persisted.load_or(LocalePreference::with_fallback(fallback_language));
        if let Some(canonical) = canonical_ui_language(&prefs.system_language) {
            prefs.system_language = canonical.to_string();
        }
        log::info!(
            "[LOCALE] system={} movie={}",
            prefs.system_language,
            prefs.movie_language
        );

        let (state, _) = watch::channel(prefs);
        let store = Arc::new(Self {
            origin: Uuid::new_v4(),
            state,
            persisted,
            notifier,
            cache,
            subscriptions: Mutex::new(Vec::new()),
        });

        let weak = Arc::downgrade(&store);
        let system_id = store.notifier.listen::<SystemLanguageChanged, _>(move |event| {
            if let Some(store) = weak.upgrade() {
                store.apply_remote(LanguageSetting::System, event.origin, &event.language);
            }
        });

        let weak = Arc::downgrade(&store);
        let movie_id = store.notifier.listen::<MovieLanguageChanged, _>(move |event| {
            if let Some(store) = weak.upgrade() {
                store.apply_remote(LanguageSetting::Movie, event.origin, &event.language);
            }
        });

        store
            .subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(system_id.into_iter().chain(movie_id));

        store
    }

    pub fn get_system_language(&self) -> String {
        self.state.borrow().system_language.clone()
    }

    pub fn get_movie_language(&self) -> String {
        self.state.borrow().movie_language.clone()
    }

    /// Set the interface language ("ja", "zh-TW", ...).
    /// Returns false when it was already active.
    pub fn set_system_language(&self, language: &str) -> DomainResult<bool> {
        let language = canonical_ui_language(language.trim())
            .ok_or_else(|| DomainError::UnsupportedLanguage(language.to_string()))?;

        let changed = self.update(LanguageSetting::System, language);
        if changed {
            self.notifier
                .publish(SystemLanguageChanged::new(self.origin, language.to_string()));
        }
        Ok(changed)
    }

    /// Set the catalog content language. Returns false when it was already active.
    pub fn set_movie_language(&self, language: &str) -> DomainResult<bool> {
        let language = language.trim();
        if !is_content_language(language) {
            return Err(DomainError::UnsupportedLanguage(language.to_string()));
        }

        let changed = self.update(LanguageSetting::Movie, language);
        if changed {
            self.notifier
                .publish(MovieLanguageChanged::new(self.origin, language.to_string()));
        }
        Ok(changed)
    }

    /// Adopt the locale segment of a navigated path as the system language.
    /// Returns the adopted language when it differed from the stored one.
    pub fn reconcile_with_path(&self, path: &str) -> Option<String> {
        let language = locale_from_path(path)?;
        if self.state.borrow().system_language == language {
            return None;
        }
        match self.set_system_language(language) {
            Ok(true) => Some(language.to_string()),
            _ => None,
        }
    }

    pub fn state(&self) -> LocalePreference {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LocalePreference> {
        self.state.subscribe()
    }

    pub async fn flush(&self) {
        self.persisted.flush().await;
    }

    pub fn dispose(&self) {
        let ids: Vec<SubscriptionId> = self
            .subscriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .drain(..)
            .collect();
        for id in ids {
            self.notifier.unlisten(id);
        }
    }

    /// Store `language` locally and persist it. Evicts the previous language's cache.
    fn update(&self, setting: LanguageSetting, language: &str) -> bool {
        let mut previous = None;
        self.state.send_if_modified(|prefs| {
            let slot = setting.slot(prefs);
            if slot.as_str() == language {
                return false;
            }
            previous = Some(std::mem::replace(slot, language.to_string()));
            self.persisted.save(prefs);
            true
        });

        match previous {
            Some(previous) => {
                log::info!("[LOCALE] {:?} language {} -> {}", setting, previous, language);
                self.evict(&previous);
                true
            }
            None => false,
        }
    }

    fn apply_remote(&self, setting: LanguageSetting, origin: Uuid, language: &str) {
        if origin == self.origin {
            return;
        }

        let mut previous = None;
        self.state.send_if_modified(|prefs| {
            let slot = setting.slot(prefs);
            if slot.as_str() == language {
                return false;
            }
            previous = Some(std::mem::replace(slot, language.to_string()));
            true
        });

        if let Some(previous) = previous {
            log::debug!("[LOCALE] applied remote {:?} language {}", setting, language);
            self.evict(&previous);
        }
    }

    fn evict(&self, language: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate_language(language);
        }
    }
}

impl Drop for LocaleStore {
    fn drop(&mut self) {
        self.dispose();
    }
}

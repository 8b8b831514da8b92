// src/application/state.rs

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::{
    create_connection_pool, get_connection, initialize_database, verify_database_integrity,
};
use crate::domain::DetectedLocale;
use crate::error::AppResult;
use crate::events::{ChangeNotifier, EventBus};
use crate::integrations::{MovieCatalog, TmdbClient};
use crate::repositories::{KeyValueStorage, SqliteKeyValueStorage};
use crate::services::{
    CatalogQueries, LocaleStore, QueryCache, SortStore, WatchlistStore, WatchlistView,
};

/// Application state shared by every command.
/// All fields are Arc-wrapped for thread-safe sharing.
pub struct AppState {
    pub event_bus: Arc<EventBus>,
    pub cache: Arc<QueryCache>,
    pub queries: Arc<CatalogQueries>,
    pub watchlist: Arc<WatchlistStore>,
    pub sort: Arc<SortStore>,
    pub locale: Arc<LocaleStore>,
    pub watchlist_view: Arc<WatchlistView>,
}

impl AppState {
    /// Build the full stack from configuration:
    /// SQLite store, TMDB client, query cache, preference stores.
    pub fn initialize(config: &AppConfig) -> AppResult<Self> {
        // 1. INFRASTRUCTURE
        let pool = Arc::new(create_connection_pool(&config.database_path())?);
        {
            let conn = get_connection(&pool)?;
            initialize_database(&conn)?;
            verify_database_integrity(&conn)?;
        }
        let storage: Arc<dyn KeyValueStorage> = Arc::new(SqliteKeyValueStorage::new(pool));

        // 2. CATALOG
        let catalog: Arc<dyn MovieCatalog> =
            Arc::new(TmdbClient::new(config)?.with_locale(DetectedLocale::from_env()));

        log::info!(
            "[STATE] initialized at {} (catalog {})",
            config.database_path().display(),
            config.api_base_url
        );

        Ok(Self::assemble(config, catalog, storage, Arc::new(EventBus::new())))
    }

    /// Wire cache, stores and views around an existing catalog and storage.
    /// Every state built on the same bus follows the others' preference changes.
    pub fn assemble(
        config: &AppConfig,
        catalog: Arc<dyn MovieCatalog>,
        storage: Arc<dyn KeyValueStorage>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let notifier = ChangeNotifier::broadcast(Arc::clone(&event_bus));

        let cache = Arc::new(QueryCache::new(
            catalog,
            config.stale_time,
            config.cache_capacity,
        ));

        // 3. STORES
        let locale = LocaleStore::init(
            Arc::clone(&storage),
            notifier.clone(),
            &config.fallback_language,
            Some(Arc::clone(&cache)),
        );
        let sort = SortStore::init(Arc::clone(&storage), notifier.clone());
        let watchlist = WatchlistStore::init(storage, notifier);

        // 4. QUERIES AND VIEWS
        let queries = Arc::new(CatalogQueries::new(Arc::clone(&cache), Arc::clone(&locale)));
        let watchlist_view = Arc::new(WatchlistView::new(
            Arc::clone(&watchlist),
            Arc::clone(&sort),
            Arc::clone(&queries),
        ));

        Self {
            event_bus,
            cache,
            queries,
            watchlist,
            sort,
            locale,
            watchlist_view,
        }
    }

    /// Await pending preference writes
    pub async fn flush(&self) {
        self.watchlist.flush().await;
        self.sort.flush().await;
        self.locale.flush().await;
    }
}

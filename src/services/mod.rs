// src/services/mod.rs
//
// Services Module - Orchestration Layer
//
// The query cache sits between callers and the remote catalog; the stores
// own the persisted user preferences and keep other contexts in sync.

pub mod catalog_queries;
pub mod locale_store;
pub mod query_cache;
pub mod sort_store;
pub mod watchlist_store;
pub mod watchlist_view;

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(test)]
mod query_cache_tests;


// Re-export all services and their types
pub use query_cache::{
    InfinitePages,
    QueryCache,
    QueryData,
    QueryKey,
    QueryState,
    QueryStatus,
};

pub use catalog_queries::{
    CatalogQueries,
    SearchResults,
};

pub use locale_store::{
    LocaleStore,
    LOCALE_NAMESPACE,
};

pub use sort_store::{
    SortStore,
    SORT_NAMESPACE,
};

pub use watchlist_store::{
    WatchlistStore,
    WATCHLIST_NAMESPACE,
};

pub use watchlist_view::{
    WatchlistPage,
    WatchlistView,
};

// src/lib.rs
// Cinelist - movie browsing data layer
//
// Architecture:
// - Domain-centric: records, sort rules and locale rules live in domain
// - Cached: every catalog read goes through the query cache
// - Local-first preferences: watchlist, sort and languages persist in SQLite
// - Synchronized: contexts sharing an event bus follow each other's changes
// - Application Layer: UI boundary (commands + DTOs)

// ============================================================================
// FOUNDATION
// ============================================================================

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod events;
pub mod infrastructure;
pub mod repositories;

// ============================================================================
// CATALOG, CACHE AND STORES
// ============================================================================

pub mod integrations;
pub mod services;

// ============================================================================
// APPLICATION LAYER
// ============================================================================

pub mod application;

// ============================================================================
// PUBLIC API - Domain
// ============================================================================

pub use domain::{
    image_url,
    localized_route,
    sort_movies,
    DomainError,
    DomainResult,
    ImageSize,
    LocalePreference,
    Movie,
    MovieCredits,
    MovieDetail,
    MoviePage,
    MovieReviews,
    MovieVideos,
    Route,
    SortContext,
    SortDirection,
    SortField,
    SortOption,
    SortPreferences,
    Watchlist,
};

// ============================================================================
// PUBLIC API - Errors and Configuration
// ============================================================================

pub use config::AppConfig;
pub use error::{AppError, AppResult, CatalogError};

// ============================================================================
// PUBLIC API - Events
// ============================================================================

pub use events::{
    create_event_bus,
    ChangeNotifier,
    DomainEvent,
    EventBus,
    EventLogEntry,
    MovieLanguageChanged,
    SortPreferenceChanged,
    SystemLanguageChanged,
    WatchlistChanged,
};

// ============================================================================
// PUBLIC API - Storage
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};
pub use infrastructure::PersistedState;
pub use repositories::{InMemoryKeyValueStorage, KeyValueStorage, SqliteKeyValueStorage};

// ============================================================================
// PUBLIC API - Catalog and Services
// ============================================================================

pub use integrations::{CatalogResult, MovieCatalog, MovieListKind, TmdbClient};

pub use services::{
    CatalogQueries,
    InfinitePages,
    LocaleStore,
    QueryCache,
    QueryKey,
    QueryState,
    QueryStatus,
    SearchResults,
    SortStore,
    WatchlistPage,
    WatchlistStore,
    WatchlistView,
};

// ============================================================================
// PUBLIC API - Application Layer
// ============================================================================

pub use application::{AppState, ErrorResponse, ErrorType};

// Re-export application submodules
pub use application::commands;
pub use application::dto;

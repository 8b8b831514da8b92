// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file MUST declare all domain modules and re-export their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod locale;
pub mod movie;
pub mod sort;
pub mod watchlist;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Movie Domain (catalog records)
pub use movie::{
    image_url, validate_movie_page, CastMember, CrewMember, Genre, ImageSize, Movie,
    MovieCollection, MovieCredits, MovieDetail, MoviePage, MovieReview, MovieReviews,
    MovieVideo, MovieVideos, ReviewAuthor, PAGE_SIZE,
};

// Sort Domain
pub use sort::{
    sort_movies, SortContext, SortDirection, SortField, SortOption, SortPreferences, Sortable,
};

// Locale Domain
pub use locale::{
    canonical_ui_language, ensure_locale_prefix, find_ui_language, is_content_language,
    locale_from_path, localized_route, DetectedLocale, LocalePreference, Route, UiLanguage,
    UI_LANGUAGES,
};

// Watchlist Domain
pub use watchlist::{Watchlist, WatchlistRecord, WATCHLIST_PAGE_SIZE};

// ============================================================================
// DOMAIN ERROR TYPES
// ============================================================================

use thiserror::Error;

/// Domain-level errors
/// These represent violations of business rules and invariants
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// Domain result type
pub type DomainResult<T> = Result<T, DomainError>;

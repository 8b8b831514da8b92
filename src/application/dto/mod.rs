// src/application/dto/mod.rs
//
// Data Transfer Objects
//
// CRITICAL PRINCIPLES:
// - DTOs are UI-friendly representations
// - DTOs NEVER leak domain invariants
// - DTOs are simple, serializable structs
// - Conversion FROM domain entities only (never TO)

use serde::{Deserialize, Serialize};

use crate::application::error_handling::ErrorResponse;
use crate::domain::{
    image_url, ImageSize, LocalePreference, Movie, MovieDetail, MoviePage, MovieReviews,
    MovieVideos, SortPreferences, UiLanguage,
};
use crate::services::{InfinitePages, QueryState, QueryStatus, SearchResults, WatchlistPage};

// ============================================================================
// QUERY STATE
// ============================================================================

/// What a screen renders for one query: status, last data, error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryStateDto<T> {
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<ErrorResponse>,
    pub is_fetching: bool,
    pub updated_at: Option<String>,
}

impl<T> QueryStateDto<T> {
    /// Convert a cache state, mapping the payload with `f`
    pub fn from_state<U, F>(state: QueryState<U>, f: F) -> Self
    where
        F: FnOnce(U) -> T,
    {
        Self {
            status: state.status,
            data: state.data.map(f),
            error: state.error.as_ref().map(ErrorResponse::from_catalog_error),
            is_fetching: state.is_fetching,
            updated_at: state.updated_at.map(|at| at.to_rfc3339()),
        }
    }
}

// ============================================================================
// MOVIE DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSummaryDto {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub release_date: String,
    pub vote_average: f64,
    pub popularity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviePageDto {
    pub page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub has_next_page: bool,
    pub movies: Vec<MovieSummaryDto>,
}

/// Flattened pages of an infinite listing or search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieFeedDto {
    pub query: Option<String>,
    pub pages_loaded: u32,
    pub total_results: u64,
    pub has_next_page: bool,
    pub movies: Vec<MovieSummaryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetailDto {
    pub id: i64,
    pub title: String,
    pub tagline: Option<String>,
    pub overview: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub release_date: String,
    pub runtime: Option<u32>,
    pub genres: Vec<String>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub homepage: Option<String>,
    pub imdb_id: Option<String>,
    pub collection: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMemberDto {
    pub name: String,
    pub character: String,
    pub profile_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrailerDto {
    pub name: String,
    pub youtube_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDto {
    pub author: String,
    pub content: String,
    pub rating: Option<f64>,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewPageDto {
    pub page: u32,
    pub total_pages: u32,
    pub reviews: Vec<ReviewDto>,
}

// ============================================================================
// WATCHLIST DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistPageDto {
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub sort: String,
    pub movies: Vec<MovieDetailDto>,
    pub failed: Vec<WatchlistFailureDto>,
    pub pending: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistFailureDto {
    pub movie_id: i64,
    pub error: ErrorResponse,
}

// ============================================================================
// PREFERENCE DTOs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesDto {
    pub system_language: String,
    pub movie_language: String,
    pub search_sort: String,
    pub watchlist_sort: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiLanguageDto {
    /// Value accepted by `set_system_language` and used as route segment
    pub value: String,
    pub tag: String,
    pub code: String,
    pub name: String,
}

/// Outcome of entering a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationDto {
    /// System language after reconciling with the path
    pub system_language: String,
    /// Where to go instead, when the path lacked a locale prefix
    pub redirect: Option<String>,
}

// ============================================================================
// CONVERSION HELPERS (Domain → DTO)
// ============================================================================

impl From<&Movie> for MovieSummaryDto {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            overview: movie.overview.clone(),
            poster_url: image_url(movie.poster_path.as_deref(), ImageSize::W500),
            backdrop_url: image_url(movie.backdrop_path.as_deref(), ImageSize::Original),
            release_date: movie.release_date.clone(),
            vote_average: movie.vote_average,
            popularity: movie.popularity,
        }
    }
}

impl From<MoviePage> for MoviePageDto {
    fn from(page: MoviePage) -> Self {
        Self {
            page: page.page,
            total_pages: page.total_pages,
            total_results: page.total_results,
            has_next_page: page.has_next_page(),
            movies: page.results.iter().map(MovieSummaryDto::from).collect(),
        }
    }
}

impl From<InfinitePages> for MovieFeedDto {
    fn from(pages: InfinitePages) -> Self {
        Self {
            query: None,
            pages_loaded: pages.pages.len() as u32,
            total_results: pages.last_page().map(|p| p.total_results).unwrap_or(0),
            has_next_page: pages.has_next_page,
            movies: pages.movies().map(MovieSummaryDto::from).collect(),
        }
    }
}

impl From<SearchResults> for MovieFeedDto {
    fn from(results: SearchResults) -> Self {
        Self {
            movies: results.movies.iter().map(MovieSummaryDto::from).collect(),
            query: Some(results.query),
            pages_loaded: results.pages_loaded,
            total_results: results.total_results,
            has_next_page: results.has_next_page,
        }
    }
}

impl From<MovieDetail> for MovieDetailDto {
    fn from(detail: MovieDetail) -> Self {
        Self {
            poster_url: image_url(detail.poster_path.as_deref(), ImageSize::W500),
            backdrop_url: image_url(detail.backdrop_path.as_deref(), ImageSize::Original),
            id: detail.id,
            title: detail.title,
            tagline: detail.tagline.filter(|t| !t.is_empty()),
            overview: detail.overview,
            release_date: detail.release_date,
            runtime: detail.runtime,
            genres: detail.genres.into_iter().map(|g| g.name).collect(),
            vote_average: detail.vote_average,
            vote_count: detail.vote_count,
            homepage: detail.homepage.filter(|h| !h.is_empty()),
            imdb_id: detail.imdb_id,
            collection: detail.belongs_to_collection.map(|c| c.name),
        }
    }
}

/// YouTube trailers only, in catalog order
pub fn trailers(videos: MovieVideos) -> Vec<TrailerDto> {
    videos
        .results
        .into_iter()
        .filter(|v| v.is_youtube_trailer())
        .map(|v| TrailerDto {
            name: v.name,
            youtube_key: v.key,
        })
        .collect()
}

impl From<MovieReviews> for ReviewPageDto {
    fn from(reviews: MovieReviews) -> Self {
        Self {
            page: reviews.page,
            total_pages: reviews.total_pages,
            reviews: reviews
                .results
                .into_iter()
                .map(|r| ReviewDto {
                    author: r.author,
                    content: r.content,
                    rating: r.author_details.rating,
                    avatar_url: image_url(r.author_details.avatar_path.as_deref(), ImageSize::W500),
                    created_at: r.created_at,
                })
                .collect(),
        }
    }
}

impl From<WatchlistPage> for WatchlistPageDto {
    fn from(page: WatchlistPage) -> Self {
        Self {
            page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
            sort: page.sort.to_string(),
            movies: page.movies.into_iter().map(MovieDetailDto::from).collect(),
            failed: page
                .failed
                .iter()
                .map(|(movie_id, err)| WatchlistFailureDto {
                    movie_id: *movie_id,
                    error: ErrorResponse::from_catalog_error(err),
                })
                .collect(),
            pending: page.pending,
        }
    }
}

impl PreferencesDto {
    pub fn new(locale: &LocalePreference, sort: &SortPreferences) -> Self {
        Self {
            system_language: locale.system_language.clone(),
            movie_language: locale.movie_language.clone(),
            search_sort: sort.search_sort.to_string(),
            watchlist_sort: sort.watchlist_sort.to_string(),
        }
    }
}

impl From<&UiLanguage> for UiLanguageDto {
    fn from(language: &UiLanguage) -> Self {
        Self {
            value: language.value.to_string(),
            tag: language.tag.to_string(),
            code: language.code.to_string(),
            name: language.name.to_string(),
        }
    }
}

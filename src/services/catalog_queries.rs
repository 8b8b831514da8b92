// src/services/catalog_queries.rs
//
// Catalog Queries - typed reads through the query cache
//
// Every key carries the current movie language, so a language switch never
// serves data fetched for another language. Blank search text never reaches
// the catalog: the query stays idle with no results.

use std::sync::Arc;

use crate::domain::{
    sort_movies, Movie, MovieCredits, MovieDetail, MoviePage, MovieReviews, MovieVideos,
    SortOption,
};
use crate::integrations::{MovieCatalog, MovieListKind};
use crate::services::locale_store::LocaleStore;
use crate::services::query_cache::{InfinitePages, QueryCache, QueryData, QueryKey, QueryState};

/// Search pages flattened in page order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    pub query: String,
    pub movies: Vec<Movie>,
    pub pages_loaded: u32,
    pub total_results: u64,
    pub has_next_page: bool,
}

impl SearchResults {
    pub fn empty(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Self::default()
        }
    }

    fn from_pages(query: &str, pages: InfinitePages) -> Self {
        Self {
            query: query.to_string(),
            movies: pages.movies().cloned().collect(),
            pages_loaded: pages.pages.len() as u32,
            total_results: pages.last_page().map(|p| p.total_results).unwrap_or(0),
            has_next_page: pages.has_next_page,
        }
    }

    /// Client-side reordering of the loaded movies
    pub fn sorted_by(mut self, option: SortOption) -> Self {
        sort_movies(&mut self.movies, option);
        self
    }
}

pub struct CatalogQueries {
    cache: Arc<QueryCache>,
    locale: Arc<LocaleStore>,
}

impl CatalogQueries {
    pub fn new(cache: Arc<QueryCache>, locale: Arc<LocaleStore>) -> Self {
        Self { cache, locale }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    fn language(&self) -> String {
        self.locale.get_movie_language()
    }

    // ========================================================================
    // KEYS
    // ========================================================================

    pub fn movie_list_key(kind: MovieListKind, page: u32, language: &str) -> QueryKey {
        QueryKey::new(kind.as_str(), vec![page.to_string()], language)
    }

    pub fn movie_list_infinite_key(kind: MovieListKind, language: &str) -> QueryKey {
        QueryKey::new(kind.as_str(), vec!["infinite".to_string()], language)
    }

    pub fn movie_details_key(movie_id: i64, language: &str) -> QueryKey {
        QueryKey::new("detail", vec![movie_id.to_string()], language)
    }

    pub fn movie_credits_key(movie_id: i64, language: &str) -> QueryKey {
        QueryKey::new("credits", vec![movie_id.to_string()], language)
    }

    pub fn movie_videos_key(movie_id: i64, language: &str) -> QueryKey {
        QueryKey::new("videos", vec![movie_id.to_string()], language)
    }

    pub fn movie_reviews_key(movie_id: i64, page: u32, language: &str) -> QueryKey {
        QueryKey::new("reviews", vec![movie_id.to_string(), page.to_string()], language)
    }

    pub fn search_key(query: &str, page: u32, language: &str) -> QueryKey {
        QueryKey::new("search", vec![query.to_string(), page.to_string()], language)
    }

    pub fn search_infinite_key(query: &str, language: &str) -> QueryKey {
        QueryKey::new(
            "search",
            vec![query.to_string(), "infinite".to_string()],
            language,
        )
    }

    // ========================================================================
    // LISTINGS
    // ========================================================================

    pub async fn movie_list(&self, kind: MovieListKind, page: u32) -> QueryState<MoviePage> {
        self.list_query(kind, page, false).await
    }

    /// Fetch a listing page again, even when fresh or failed
    pub async fn retry_movie_list(&self, kind: MovieListKind, page: u32) -> QueryState<MoviePage> {
        self.list_query(kind, page, true).await
    }

    pub async fn popular_movies(&self, page: u32) -> QueryState<MoviePage> {
        self.movie_list(MovieListKind::Popular, page).await
    }

    pub async fn now_playing(&self, page: u32) -> QueryState<MoviePage> {
        self.movie_list(MovieListKind::NowPlaying, page).await
    }

    pub async fn upcoming(&self, page: u32) -> QueryState<MoviePage> {
        self.movie_list(MovieListKind::Upcoming, page).await
    }

    async fn list_query(&self, kind: MovieListKind, page: u32, force: bool) -> QueryState<MoviePage> {
        let page = page.max(1);
        let language = self.language();
        let key = Self::movie_list_key(kind, page, &language);
        let fetcher = move |catalog: Arc<dyn MovieCatalog>| async move {
            catalog
                .movie_list(kind, page, Some(&language))
                .await
                .map(QueryData::Movies)
        };

        let state = if force {
            self.cache.refetch(key, fetcher).await
        } else {
            self.cache.fetch(key, fetcher).await
        };
        state.map_data(QueryData::into_movies)
    }

    /// First pages of a listing as an infinite sequence
    pub async fn browse(&self, kind: MovieListKind) -> QueryState<InfinitePages> {
        self.browse_query(kind, false).await
    }

    /// Restart a listing sequence from page 1
    pub async fn retry_browse(&self, kind: MovieListKind) -> QueryState<InfinitePages> {
        self.browse_query(kind, true).await
    }

    async fn browse_query(&self, kind: MovieListKind, force: bool) -> QueryState<InfinitePages> {
        let language = self.language();
        let key = Self::movie_list_infinite_key(kind, &language);
        let fetch_page = move |catalog: Arc<dyn MovieCatalog>, page: u32| async move {
            catalog.movie_list(kind, page, Some(&language)).await
        };

        let state = if force {
            self.cache.refetch_infinite(key, fetch_page).await
        } else {
            self.cache.fetch_infinite(key, fetch_page).await
        };
        state.map_data(QueryData::into_infinite)
    }

    pub async fn browse_next_page(&self, kind: MovieListKind) -> QueryState<InfinitePages> {
        let language = self.language();
        let key = Self::movie_list_infinite_key(kind, &language);
        self.cache
            .fetch_next_page(key, move |catalog, page| async move {
                catalog.movie_list(kind, page, Some(&language)).await
            })
            .await
            .map_data(QueryData::into_infinite)
    }

    // ========================================================================
    // MOVIE DETAIL
    // ========================================================================

    pub async fn movie_details(&self, movie_id: i64) -> QueryState<MovieDetail> {
        self.details_query(movie_id, false).await
    }

    pub async fn retry_movie_details(&self, movie_id: i64) -> QueryState<MovieDetail> {
        self.details_query(movie_id, true).await
    }

    async fn details_query(&self, movie_id: i64, force: bool) -> QueryState<MovieDetail> {
        let language = self.language();
        let key = Self::movie_details_key(movie_id, &language);
        let fetcher = move |catalog: Arc<dyn MovieCatalog>| async move {
            catalog
                .movie_details(movie_id, Some(&language))
                .await
                .map(|detail| QueryData::Detail(Box::new(detail)))
        };

        let state = if force {
            self.cache.refetch(key, fetcher).await
        } else {
            self.cache.fetch(key, fetcher).await
        };
        state.map_data(QueryData::into_detail)
    }

    pub async fn movie_credits(&self, movie_id: i64) -> QueryState<MovieCredits> {
        let language = self.language();
        let key = Self::movie_credits_key(movie_id, &language);
        self.cache
            .fetch(key, move |catalog| async move {
                catalog
                    .movie_credits(movie_id, Some(&language))
                    .await
                    .map(QueryData::Credits)
            })
            .await
            .map_data(QueryData::into_credits)
    }

    pub async fn movie_videos(&self, movie_id: i64) -> QueryState<MovieVideos> {
        let language = self.language();
        let key = Self::movie_videos_key(movie_id, &language);
        self.cache
            .fetch(key, move |catalog| async move {
                catalog
                    .movie_videos(movie_id, Some(&language))
                    .await
                    .map(QueryData::Videos)
            })
            .await
            .map_data(QueryData::into_videos)
    }

    pub async fn movie_reviews(&self, movie_id: i64, page: u32) -> QueryState<MovieReviews> {
        let page = page.max(1);
        let language = self.language();
        let key = Self::movie_reviews_key(movie_id, page, &language);
        self.cache
            .fetch(key, move |catalog| async move {
                catalog
                    .movie_reviews(movie_id, page, Some(&language))
                    .await
                    .map(QueryData::Reviews)
            })
            .await
            .map_data(QueryData::into_reviews)
    }

    // ========================================================================
    // SEARCH
    // ========================================================================

    /// One page of search results. Blank text stays idle.
    pub async fn search_page(&self, query: &str, page: u32) -> QueryState<MoviePage> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return QueryState::idle();
        }
        let page = page.max(1);
        let language = self.language();
        let key = Self::search_key(&query, page, &language);
        self.cache
            .fetch(key, move |catalog| async move {
                catalog
                    .search_movies(&query, page, Some(&language))
                    .await
                    .map(QueryData::Movies)
            })
            .await
            .map_data(QueryData::into_movies)
    }

    /// Infinite search: loads page 1 unless fresh pages are cached.
    /// Blank text stays idle with empty results and makes no call.
    pub async fn search_movies(&self, query: &str) -> QueryState<SearchResults> {
        self.search_query(query, false).await
    }

    /// Restart a search from page 1. Blank text still makes no call.
    pub async fn retry_search_movies(&self, query: &str) -> QueryState<SearchResults> {
        self.search_query(query, true).await
    }

    async fn search_query(&self, query: &str, force: bool) -> QueryState<SearchResults> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Self::idle_search(&query);
        }
        let language = self.language();
        let key = Self::search_infinite_key(&query, &language);
        let text = query.clone();
        let fetch_page = move |catalog: Arc<dyn MovieCatalog>, page: u32| async move {
            catalog.search_movies(&text, page, Some(&language)).await
        };

        let state = if force {
            self.cache.refetch_infinite(key, fetch_page).await
        } else {
            self.cache.fetch_infinite(key, fetch_page).await
        };
        state
            .map_data(|data| data.into_infinite())
            .map_data(|pages| Some(SearchResults::from_pages(&query, pages)))
    }

    /// Append the next search page; no-op past the last page
    pub async fn search_next_page(&self, query: &str) -> QueryState<SearchResults> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Self::idle_search(&query);
        }
        let language = self.language();
        let key = Self::search_infinite_key(&query, &language);
        let text = query.clone();
        self.cache
            .fetch_next_page(key, move |catalog, page| async move {
                catalog.search_movies(&text, page, Some(&language)).await
            })
            .await
            .map_data(|data| data.into_infinite())
            .map_data(|pages| Some(SearchResults::from_pages(&query, pages)))
    }

    fn idle_search(query: &str) -> QueryState<SearchResults> {
        QueryState {
            data: Some(SearchResults::empty(query)),
            ..QueryState::idle()
        }
    }
}

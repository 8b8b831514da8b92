// src/services/test_support.rs
//
// Counting fake of the remote catalog for service tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::domain::{
    Movie, MovieCredits, MovieDetail, MoviePage, MovieReviews, MovieVideos, PAGE_SIZE,
};
use crate::error::CatalogError;
use crate::events::ChangeNotifier;
use crate::integrations::{CatalogResult, MovieCatalog, MovieListKind};
use crate::repositories::{InMemoryKeyValueStorage, KeyValueStorage};
use crate::services::{CatalogQueries, LocaleStore, QueryCache, SortStore, WatchlistStore};

pub fn movie(id: i64, title: &str, popularity: f64, release_date: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        overview: String::new(),
        poster_path: None,
        backdrop_path: None,
        release_date: release_date.to_string(),
        vote_average: 6.0,
        vote_count: 10,
        popularity,
        original_language: "en".to_string(),
        genre_ids: Vec::new(),
        adult: false,
        video: false,
    }
}

pub fn detail(id: i64, title: &str, popularity: f64, release_date: &str) -> MovieDetail {
    MovieDetail {
        id,
        title: title.to_string(),
        overview: String::new(),
        poster_path: None,
        backdrop_path: None,
        release_date: release_date.to_string(),
        vote_average: 6.0,
        vote_count: 10,
        popularity,
        original_language: "en".to_string(),
        adult: false,
        video: false,
        belongs_to_collection: None,
        budget: 0,
        genres: Vec::new(),
        homepage: None,
        imdb_id: None,
        production_companies: Vec::new(),
        production_countries: Vec::new(),
        revenue: 0,
        runtime: Some(100),
        spoken_languages: Vec::new(),
        status: "Released".to_string(),
        tagline: None,
    }
}

/// Catalog double: counts calls, records requests, can be slowed down or failed
pub struct FakeCatalog {
    pub calls: AtomicUsize,
    pub requested_pages: Mutex<Vec<u32>>,
    pub languages: Mutex<Vec<String>>,
    pub delay: Duration,
    pub total_pages: u32,
    failure: Mutex<Option<CatalogError>>,
    failing_ids: Mutex<HashMap<i64, CatalogError>>,
    titles: HashMap<i64, (&'static str, f64, &'static str)>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requested_pages: Mutex::new(Vec::new()),
            languages: Mutex::new(Vec::new()),
            delay: Duration::from_millis(20),
            total_pages: 3,
            failure: Mutex::new(None),
            failing_ids: Mutex::new(HashMap::new()),
            titles: HashMap::new(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = total_pages;
        self
    }

    pub fn with_movie(mut self, id: i64, title: &'static str, popularity: f64, release_date: &'static str) -> Self {
        self.titles.insert(id, (title, popularity, release_date));
        self
    }

    pub fn fail_all(&self, error: Option<CatalogError>) {
        *self.failure.lock().unwrap() = error;
    }

    pub fn fail_id(&self, id: i64, error: CatalogError) {
        self.failing_ids.lock().unwrap().insert(id, error);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn pages(&self) -> Vec<u32> {
        self.requested_pages.lock().unwrap().clone()
    }

    async fn begin(&self, page: Option<u32>, language: Option<&str>) -> CatalogResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(page) = page {
            self.requested_pages.lock().unwrap().push(page);
        }
        self.languages
            .lock()
            .unwrap()
            .push(language.unwrap_or("en").to_string());
        tokio::time::sleep(self.delay).await;

        let failure = self.failure.lock().unwrap().clone();
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn page(&self, page: u32) -> MoviePage {
        let per_page = PAGE_SIZE as i64;
        let first_id = (page as i64 - 1) * per_page;
        MoviePage {
            page,
            results: (0..per_page)
                .map(|n| movie(first_id + n + 1, &format!("Movie {}", first_id + n + 1), 1.0, "2020-01-01"))
                .collect(),
            total_pages: self.total_pages,
            total_results: self.total_pages as u64 * per_page as u64,
        }
    }
}

#[async_trait]
impl MovieCatalog for FakeCatalog {
    async fn movie_list(
        &self,
        _kind: MovieListKind,
        page: u32,
        language: Option<&str>,
    ) -> CatalogResult<MoviePage> {
        self.begin(Some(page), language).await?;
        Ok(self.page(page))
    }

    async fn search_movies(
        &self,
        _query: &str,
        page: u32,
        language: Option<&str>,
    ) -> CatalogResult<MoviePage> {
        self.begin(Some(page), language).await?;
        Ok(self.page(page))
    }

    async fn movie_details(&self, movie_id: i64, language: Option<&str>) -> CatalogResult<MovieDetail> {
        self.begin(None, language).await?;
        if let Some(err) = self.failing_ids.lock().unwrap().get(&movie_id).cloned() {
            return Err(err);
        }
        let (title, popularity, release_date) = self
            .titles
            .get(&movie_id)
            .copied()
            .unwrap_or(("Untitled", 0.0, ""));
        Ok(detail(movie_id, title, popularity, release_date))
    }

    async fn movie_credits(&self, movie_id: i64, language: Option<&str>) -> CatalogResult<MovieCredits> {
        self.begin(None, language).await?;
        Ok(MovieCredits {
            id: movie_id,
            cast: Vec::new(),
            crew: Vec::new(),
        })
    }

    async fn movie_videos(&self, movie_id: i64, language: Option<&str>) -> CatalogResult<MovieVideos> {
        self.begin(None, language).await?;
        Ok(MovieVideos {
            id: movie_id,
            results: Vec::new(),
        })
    }

    async fn movie_reviews(
        &self,
        movie_id: i64,
        page: u32,
        language: Option<&str>,
    ) -> CatalogResult<MovieReviews> {
        self.begin(Some(page), language).await?;
        Ok(MovieReviews {
            id: movie_id,
            page,
            results: Vec::new(),
            total_pages: 1,
            total_results: 0,
        })
    }
}

/// Cache, stores and queries wired around a fake catalog, all in memory
pub struct Harness {
    pub catalog: Arc<FakeCatalog>,
    pub cache: Arc<QueryCache>,
    pub storage: Arc<dyn KeyValueStorage>,
    pub locale: Arc<LocaleStore>,
    pub sort: Arc<SortStore>,
    pub watchlist: Arc<WatchlistStore>,
    pub queries: Arc<CatalogQueries>,
}

impl Harness {
    pub fn new(catalog: FakeCatalog) -> Self {
        Self::with_notifier(catalog, ChangeNotifier::Local, AppConfig::default().stale_time)
    }

    pub fn with_notifier(catalog: FakeCatalog, notifier: ChangeNotifier, stale_time: Duration) -> Self {
        let catalog = Arc::new(catalog);
        let cache = Arc::new(QueryCache::new(
            Arc::clone(&catalog) as Arc<dyn MovieCatalog>,
            stale_time,
            100,
        ));
        let storage: Arc<dyn KeyValueStorage> = Arc::new(InMemoryKeyValueStorage::new());
        let locale = LocaleStore::init(
            Arc::clone(&storage),
            notifier.clone(),
            "en",
            Some(Arc::clone(&cache)),
        );
        let sort = SortStore::init(Arc::clone(&storage), notifier.clone());
        let watchlist = WatchlistStore::init(Arc::clone(&storage), notifier);
        let queries = Arc::new(CatalogQueries::new(Arc::clone(&cache), Arc::clone(&locale)));

        Self {
            catalog,
            cache,
            storage,
            locale,
            sort,
            watchlist,
            queries,
        }
    }
}

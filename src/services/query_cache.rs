// src/services/query_cache.rs
//
// Query Cache - keyed, deduplicated catalog fetches
//
// CRITICAL RULES:
// - One in-flight fetch per key; concurrent callers await the same result
// - Per-key state machine: idle -> loading -> (success | error)
// - A refetch keeps the previous data visible while loading
// - Errors are stored in the key's state, never retried automatically
// - A result whose key was invalidated or superseded is discarded
// - Infinite queries only ever append the page after the last fetched one

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::domain::{Movie, MovieCredits, MovieDetail, MoviePage, MovieReviews, MovieVideos};
use crate::error::CatalogError;
use crate::integrations::{CatalogResult, MovieCatalog};

// ============================================================================
// KEYS AND STATE
// ============================================================================

/// Identity of a cached query: operation, ordered arguments, content language
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub operation: &'static str,
    pub args: Vec<String>,
    pub language: String,
}

impl QueryKey {
    pub fn new(operation: &'static str, args: Vec<String>, language: impl Into<String>) -> Self {
        Self {
            operation,
            args,
            language: language.into(),
        }
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}[{}]@{}", self.operation, self.args.join(","), self.language)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Snapshot of one cache key as consumers see it
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub status: QueryStatus,
    /// Last successful payload; survives refetches and later errors
    pub data: Option<T>,
    pub error: Option<CatalogError>,
    pub is_fetching: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> QueryState<T> {
    pub fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            data: None,
            error: None,
            is_fetching: false,
            updated_at: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.status == QueryStatus::Idle
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }

    /// Convert the payload, keeping status and error
    pub fn map_data<U, F>(self, f: F) -> QueryState<U>
    where
        F: FnOnce(T) -> Option<U>,
    {
        QueryState {
            status: self.status,
            data: self.data.and_then(f),
            error: self.error,
            is_fetching: self.is_fetching,
            updated_at: self.updated_at,
        }
    }
}

/// Pages accumulated by an infinite query, in fetch order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfinitePages {
    pub pages: Vec<MoviePage>,
    pub has_next_page: bool,
}

impl InfinitePages {
    pub fn last_page(&self) -> Option<&MoviePage> {
        self.pages.last()
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        self.pages.iter().map(|p| p.page).collect()
    }

    /// All movies across pages, in page order
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.pages.iter().flat_map(|p| p.results.iter())
    }

    fn push(&mut self, page: MoviePage) {
        self.has_next_page = page.has_next_page();
        self.pages.push(page);
    }
}

/// Payloads the cache stores
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Movies(MoviePage),
    Detail(Box<MovieDetail>),
    Credits(MovieCredits),
    Videos(MovieVideos),
    Reviews(MovieReviews),
    Infinite(InfinitePages),
}

impl QueryData {
    pub fn into_movies(self) -> Option<MoviePage> {
        match self {
            QueryData::Movies(page) => Some(page),
            _ => None,
        }
    }

    pub fn into_detail(self) -> Option<MovieDetail> {
        match self {
            QueryData::Detail(detail) => Some(*detail),
            _ => None,
        }
    }

    pub fn into_credits(self) -> Option<MovieCredits> {
        match self {
            QueryData::Credits(credits) => Some(credits),
            _ => None,
        }
    }

    pub fn into_videos(self) -> Option<MovieVideos> {
        match self {
            QueryData::Videos(videos) => Some(videos),
            _ => None,
        }
    }

    pub fn into_reviews(self) -> Option<MovieReviews> {
        match self {
            QueryData::Reviews(reviews) => Some(reviews),
            _ => None,
        }
    }

    pub fn into_infinite(self) -> Option<InfinitePages> {
        match self {
            QueryData::Infinite(pages) => Some(pages),
            _ => None,
        }
    }

    fn as_infinite(&self) -> Option<&InfinitePages> {
        match self {
            QueryData::Infinite(pages) => Some(pages),
            _ => None,
        }
    }
}

// ============================================================================
// CACHE
// ============================================================================

struct Entry {
    state: watch::Sender<QueryState<QueryData>>,
    /// Token of the fetch currently in flight
    in_flight: Option<u64>,
    fetched_at: Option<Instant>,
    /// Set by `invalidate`, cleared when the next fetch starts
    invalidated: bool,
    last_accessed: Instant,
}

impl Entry {
    fn new() -> Self {
        let (state, _) = watch::channel(QueryState::idle());
        Self {
            state,
            in_flight: None,
            fetched_at: None,
            invalidated: false,
            last_accessed: Instant::now(),
        }
    }

    fn is_fresh(&self, stale_time: Duration) -> bool {
        self.fetched_at
            .map(|at| at.elapsed() < stale_time)
            .unwrap_or(false)
    }

    /// Settled in `error`. Only a manual retry or an invalidation fetches again.
    fn holds_error(&self) -> bool {
        !self.invalidated && self.state.borrow().status == QueryStatus::Error
    }

    fn current(&self) -> QueryState<QueryData> {
        self.state.borrow().clone()
    }

    /// idle/success/error -> loading, keeping data
    fn begin_fetch(&mut self, token: u64) {
        self.in_flight = Some(token);
        self.invalidated = false;
        self.state.send_modify(|state| {
            state.status = QueryStatus::Loading;
            state.error = None;
            state.is_fetching = true;
        });
    }
}

/// How a finished infinite-query page is merged into the stored pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageMerge {
    Append,
    Reset,
}

enum Decision {
    Ready(QueryState<QueryData>),
    Wait(watch::Receiver<QueryState<QueryData>>),
    Start(u64, watch::Receiver<QueryState<QueryData>>),
}

pub struct QueryCache {
    catalog: Arc<dyn MovieCatalog>,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    stale_time: Duration,
    capacity: usize,
    next_token: AtomicU64,
}

impl QueryCache {
    pub fn new(catalog: Arc<dyn MovieCatalog>, stale_time: Duration, capacity: usize) -> Self {
        Self {
            catalog,
            entries: Mutex::new(HashMap::new()),
            stale_time,
            capacity: capacity.max(1),
            next_token: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_token(&self) -> u64 {
        self.next_token.fetch_add(1, Ordering::Relaxed)
    }

    // ========================================================================
    // SINGLE-PAGE QUERIES
    // ========================================================================

    /// Return fresh cached data, or run `fetcher` once for every concurrent
    /// caller of `key` and return the settled state.
    pub async fn fetch<F, Fut>(self: &Arc<Self>, key: QueryKey, fetcher: F) -> QueryState<QueryData>
    where
        F: FnOnce(Arc<dyn MovieCatalog>) -> Fut + Send,
        Fut: Future<Output = CatalogResult<QueryData>> + Send + 'static,
    {
        self.run(key, false, fetcher).await
    }

    /// Fetch again even when fresh. From `error` this is the manual retry.
    pub async fn refetch<F, Fut>(self: &Arc<Self>, key: QueryKey, fetcher: F) -> QueryState<QueryData>
    where
        F: FnOnce(Arc<dyn MovieCatalog>) -> Fut + Send,
        Fut: Future<Output = CatalogResult<QueryData>> + Send + 'static,
    {
        self.run(key, true, fetcher).await
    }

    async fn run<F, Fut>(self: &Arc<Self>, key: QueryKey, force: bool, fetcher: F) -> QueryState<QueryData>
    where
        F: FnOnce(Arc<dyn MovieCatalog>) -> Fut + Send,
        Fut: Future<Output = CatalogResult<QueryData>> + Send + 'static,
    {
        let decision = {
            let mut entries = self.lock();
            let token = self.next_token();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
            entry.last_accessed = Instant::now();

            let decision = if entry.in_flight.is_some() {
                Decision::Wait(entry.state.subscribe())
            } else if !force && (entry.is_fresh(self.stale_time) || entry.holds_error()) {
                Decision::Ready(entry.current())
            } else {
                entry.begin_fetch(token);
                Decision::Start(token, entry.state.subscribe())
            };
            self.evict_locked(&mut entries);
            decision
        };

        match decision {
            Decision::Ready(state) => state,
            Decision::Wait(rx) => {
                log::debug!("[QUERY] {} joined in-flight fetch", key);
                self.wait_settled(&key, rx).await
            }
            Decision::Start(token, rx) => {
                log::debug!("[QUERY] {} fetching", key);
                let fut = fetcher(Arc::clone(&self.catalog));
                let cache = Arc::clone(self);
                let task_key = key.clone();
                tokio::spawn(async move {
                    let result = fut.await;
                    cache.settle(&task_key, token, result);
                });
                self.wait_settled(&key, rx).await
            }
        }
    }

    fn settle(&self, key: &QueryKey, token: u64, result: CatalogResult<QueryData>) {
        let mut entries = self.lock();
        let Some(entry) = Self::claim(&mut entries, key, token) else {
            return;
        };

        match result {
            Ok(data) => {
                entry.fetched_at = Some(Instant::now());
                entry.state.send_modify(|state| {
                    state.status = QueryStatus::Success;
                    state.data = Some(data);
                    state.error = None;
                    state.is_fetching = false;
                    state.updated_at = Some(Utc::now());
                });
            }
            Err(err) => Self::fail(entry, key, err),
        }
    }

    /// The entry for `key` if `token` is still its in-flight fetch
    fn claim<'a>(
        entries: &'a mut HashMap<QueryKey, Entry>,
        key: &QueryKey,
        token: u64,
    ) -> Option<&'a mut Entry> {
        match entries.get_mut(key) {
            Some(entry) if entry.in_flight == Some(token) => {
                entry.in_flight = None;
                Some(entry)
            }
            _ => {
                log::debug!("[QUERY] {} result dropped: {}", key, CatalogError::StaleResultDiscarded);
                None
            }
        }
    }

    fn fail(entry: &mut Entry, key: &QueryKey, err: CatalogError) {
        log::warn!("[QUERY] {} failed: {}", key, err);
        entry.state.send_modify(|state| {
            state.status = QueryStatus::Error;
            state.error = Some(err);
            state.is_fetching = false;
            state.updated_at = Some(Utc::now());
        });
    }

    async fn wait_settled(
        &self,
        key: &QueryKey,
        mut rx: watch::Receiver<QueryState<QueryData>>,
    ) -> QueryState<QueryData> {
        let settled = match rx.wait_for(|state| !state.is_fetching).await {
            Ok(state) => Some((*state).clone()),
            Err(_) => None,
        };
        // Entry removed while waiting: report whatever the key holds now
        settled.unwrap_or_else(|| self.peek(key))
    }

    // ========================================================================
    // INFINITE QUERIES
    // ========================================================================

    /// Load the first page of an infinite query if nothing fresh is cached.
    /// A stale sequence restarts from page 1 while the old pages stay visible.
    pub async fn fetch_infinite<F, Fut>(
        self: &Arc<Self>,
        key: QueryKey,
        fetch_page: F,
    ) -> QueryState<QueryData>
    where
        F: FnOnce(Arc<dyn MovieCatalog>, u32) -> Fut + Send,
        Fut: Future<Output = CatalogResult<MoviePage>> + Send + 'static,
    {
        self.run_infinite(key, false, fetch_page).await
    }

    /// Restart an infinite query from page 1. From `error` this is the manual retry.
    pub async fn refetch_infinite<F, Fut>(
        self: &Arc<Self>,
        key: QueryKey,
        fetch_page: F,
    ) -> QueryState<QueryData>
    where
        F: FnOnce(Arc<dyn MovieCatalog>, u32) -> Fut + Send,
        Fut: Future<Output = CatalogResult<MoviePage>> + Send + 'static,
    {
        self.run_infinite(key, true, fetch_page).await
    }

    async fn run_infinite<F, Fut>(
        self: &Arc<Self>,
        key: QueryKey,
        force: bool,
        fetch_page: F,
    ) -> QueryState<QueryData>
    where
        F: FnOnce(Arc<dyn MovieCatalog>, u32) -> Fut + Send,
        Fut: Future<Output = CatalogResult<MoviePage>> + Send + 'static,
    {
        let decision = {
            let mut entries = self.lock();
            let token = self.next_token();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
            entry.last_accessed = Instant::now();

            let has_pages = entry
                .state
                .borrow()
                .data
                .as_ref()
                .and_then(QueryData::as_infinite)
                .map(|p| !p.pages.is_empty())
                .unwrap_or(false);

            let decision = if entry.in_flight.is_some() {
                Decision::Wait(entry.state.subscribe())
            } else if !force
                && (entry.holds_error() || (has_pages && entry.is_fresh(self.stale_time)))
            {
                Decision::Ready(entry.current())
            } else {
                entry.begin_fetch(token);
                Decision::Start(token, entry.state.subscribe())
            };
            self.evict_locked(&mut entries);
            decision
        };

        self.drive_page(key, decision, 1, PageMerge::Reset, fetch_page)
            .await
    }

    /// Append the page after the last fetched one.
    ///
    /// No network call is made when the last page reports no successor or
    /// when a fetch for `key` is already in flight (the caller then awaits
    /// that fetch instead).
    pub async fn fetch_next_page<F, Fut>(
        self: &Arc<Self>,
        key: QueryKey,
        fetch_page: F,
    ) -> QueryState<QueryData>
    where
        F: FnOnce(Arc<dyn MovieCatalog>, u32) -> Fut + Send,
        Fut: Future<Output = CatalogResult<MoviePage>> + Send + 'static,
    {
        let (decision, next_page) = {
            let mut entries = self.lock();
            let token = self.next_token();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
            entry.last_accessed = Instant::now();

            let (last_page, has_next) = {
                let state = entry.state.borrow();
                let position = match state.data.as_ref().and_then(QueryData::as_infinite) {
                    Some(pages) => (pages.last_page().map(|p| p.page), pages.has_next_page),
                    None => (None, true),
                };
                position
            };
            let next_page = last_page.map(|p| p + 1).unwrap_or(1);

            let decision = if entry.in_flight.is_some() {
                Decision::Wait(entry.state.subscribe())
            } else if last_page.is_some() && !has_next {
                Decision::Ready(entry.current())
            } else {
                entry.begin_fetch(token);
                Decision::Start(token, entry.state.subscribe())
            };
            self.evict_locked(&mut entries);
            (decision, next_page)
        };

        self.drive_page(key, decision, next_page, PageMerge::Append, fetch_page)
            .await
    }

    async fn drive_page<F, Fut>(
        self: &Arc<Self>,
        key: QueryKey,
        decision: Decision,
        page: u32,
        merge: PageMerge,
        fetch_page: F,
    ) -> QueryState<QueryData>
    where
        F: FnOnce(Arc<dyn MovieCatalog>, u32) -> Fut + Send,
        Fut: Future<Output = CatalogResult<MoviePage>> + Send + 'static,
    {
        match decision {
            Decision::Ready(state) => state,
            Decision::Wait(rx) => {
                log::debug!("[QUERY] {} joined in-flight page fetch", key);
                self.wait_settled(&key, rx).await
            }
            Decision::Start(token, rx) => {
                log::debug!("[QUERY] {} fetching page {}", key, page);
                let fut = fetch_page(Arc::clone(&self.catalog), page);
                let cache = Arc::clone(self);
                let task_key = key.clone();
                tokio::spawn(async move {
                    let result = fut.await;
                    cache.settle_page(&task_key, token, merge, result);
                });
                self.wait_settled(&key, rx).await
            }
        }
    }

    fn settle_page(
        &self,
        key: &QueryKey,
        token: u64,
        merge: PageMerge,
        result: CatalogResult<MoviePage>,
    ) {
        let mut entries = self.lock();
        let Some(entry) = Self::claim(&mut entries, key, token) else {
            return;
        };

        match result {
            Ok(page) => {
                entry.fetched_at = Some(Instant::now());
                entry.state.send_modify(|state| {
                    let mut pages = match (merge, state.data.take()) {
                        (PageMerge::Append, Some(QueryData::Infinite(pages))) => pages,
                        _ => InfinitePages::default(),
                    };
                    pages.push(page);
                    state.status = QueryStatus::Success;
                    state.data = Some(QueryData::Infinite(pages));
                    state.error = None;
                    state.is_fetching = false;
                    state.updated_at = Some(Utc::now());
                });
            }
            // Pages fetched so far stay in place
            Err(err) => Self::fail(entry, key, err),
        }
    }

    // ========================================================================
    // OBSERVATION AND HOUSEKEEPING
    // ========================================================================

    /// Current state of `key` without fetching
    pub fn peek(&self, key: &QueryKey) -> QueryState<QueryData> {
        self.lock()
            .get(key)
            .map(Entry::current)
            .unwrap_or_else(QueryState::idle)
    }

    /// Watch every state transition of `key`
    pub fn subscribe(&self, key: &QueryKey) -> watch::Receiver<QueryState<QueryData>> {
        let mut entries = self.lock();
        let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
        entry.last_accessed = Instant::now();
        entry.state.subscribe()
    }

    /// Mark `key` stale so the next read fetches again, errored or not. Data stays visible.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.lock().get_mut(key) {
            entry.fetched_at = None;
            entry.invalidated = true;
        }
    }

    /// Drop every entry fetched in `language`. In-flight results for those
    /// keys are discarded when they arrive.
    pub fn invalidate_language(&self, language: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| key.language != language);
        let removed = before - entries.len();
        log::info!("[QUERY] invalidated {} entries for language {}", removed, language);
        removed
    }

    pub fn invalidate_all(&self) {
        self.lock().clear();
        log::info!("[QUERY] cache cleared");
    }

    pub fn remove(&self, key: &QueryKey) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Evict least recently used entries that nobody is fetching or watching
    fn evict_locked(&self, entries: &mut HashMap<QueryKey, Entry>) {
        if entries.len() <= self.capacity {
            return;
        }

        let mut candidates: Vec<(QueryKey, Instant)> = entries
            .iter()
            .filter(|(_, e)| e.in_flight.is_none() && e.state.receiver_count() == 0)
            .map(|(k, e)| (k.clone(), e.last_accessed))
            .collect();
        candidates.sort_by_key(|(_, accessed)| *accessed);

        let excess = entries.len() - self.capacity;
        for (key, _) in candidates.into_iter().take(excess) {
            log::debug!("[QUERY] evicted {}", key);
            entries.remove(&key);
        }
    }
}

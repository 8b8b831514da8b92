// src/services/watchlist_view.rs
//
// Watchlist View - joins watchlist ids with catalog records
//
// PRINCIPLES:
// - Ids are paginated in insertion order, then the page is sorted
// - Records always come through the query cache, never from the store
// - A failing id never hides the others

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::domain::{sort_movies, MovieDetail, SortContext, SortOption, WATCHLIST_PAGE_SIZE};
use crate::error::CatalogError;
use crate::services::catalog_queries::CatalogQueries;
use crate::services::sort_store::SortStore;
use crate::services::watchlist_store::WatchlistStore;

#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistPage {
    /// 1-based page actually shown after clamping
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub sort: SortOption,
    pub movies: Vec<MovieDetail>,
    /// Ids whose record could not be fetched
    pub failed: Vec<(i64, CatalogError)>,
    /// Ids that settled without data (e.g. the fetch was superseded)
    pub pending: Vec<i64>,
}

pub struct WatchlistView {
    watchlist: Arc<WatchlistStore>,
    sort: Arc<SortStore>,
    queries: Arc<CatalogQueries>,
}

impl WatchlistView {
    pub fn new(
        watchlist: Arc<WatchlistStore>,
        sort: Arc<SortStore>,
        queries: Arc<CatalogQueries>,
    ) -> Self {
        Self {
            watchlist,
            sort,
            queries,
        }
    }

    /// Load one page of the watchlist, sorted by the watchlist sort preference
    pub async fn page(&self, page: usize) -> WatchlistPage {
        let snapshot = self.watchlist.state();
        let sort = self.sort.get_sort(SortContext::Watchlist);
        let total_pages = snapshot.total_pages(WATCHLIST_PAGE_SIZE);
        let page = page.clamp(1, total_pages.max(1));
        let ids = snapshot.page_ids(page, WATCHLIST_PAGE_SIZE).to_vec();

        let mut tasks = JoinSet::new();
        for (idx, movie_id) in ids.iter().copied().enumerate() {
            let queries = Arc::clone(&self.queries);
            tasks.spawn(async move { (idx, movie_id, queries.movie_details(movie_id).await) });
        }

        let mut settled = Vec::with_capacity(ids.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => settled.push(result),
                Err(e) => log::error!("[WATCHLIST] detail task failed: {}", e),
            }
        }
        settled.sort_by_key(|(idx, _, _)| *idx);

        let mut movies = Vec::with_capacity(settled.len());
        let mut failed = Vec::new();
        let mut pending = Vec::new();
        for (_, movie_id, state) in settled {
            match (state.data, state.error) {
                (Some(detail), _) => movies.push(detail),
                (None, Some(err)) => failed.push((movie_id, err)),
                (None, None) => pending.push(movie_id),
            }
        }

        sort_movies(&mut movies, sort);

        WatchlistPage {
            page,
            total_pages,
            total_items: snapshot.len(),
            sort,
            movies,
            failed,
            pending,
        }
    }
}

// src/application/commands/watchlist_commands.rs
//
// Watchlist Command Handlers

use crate::application::{dto::*, state::AppState};

/// Movie ids in insertion order
pub fn get_watchlist_ids(state: &AppState) -> Vec<i64> {
    state.watchlist.list()
}

/// One page of watchlisted movies, joined from the catalog and sorted
pub async fn get_watchlist_page(state: &AppState, page: usize) -> WatchlistPageDto {
    WatchlistPageDto::from(state.watchlist_view.page(page).await)
}

pub fn is_in_watchlist(state: &AppState, movie_id: i64) -> bool {
    state.watchlist.contains(movie_id)
}

/// Returns false when the movie was already listed
pub fn add_to_watchlist(state: &AppState, movie_id: i64) -> bool {
    state.watchlist.add(movie_id)
}

/// Returns false when the movie was not listed
pub fn remove_from_watchlist(state: &AppState, movie_id: i64) -> bool {
    state.watchlist.remove(movie_id)
}

/// Returns the new membership
pub fn toggle_watchlist(state: &AppState, movie_id: i64) -> bool {
    state.watchlist.toggle(movie_id)
}

pub fn clear_watchlist(state: &AppState) {
    state.watchlist.clear();
}

// src/application/commands/movie_commands.rs
//
// Movie Command Handlers
//
// RULES:
// - Accept plain arguments
// - Read through the query layer only
// - Return DTOs
// - Never contain business logic

use crate::application::{dto::*, error_handling::ErrorResponse, state::AppState};
use crate::domain::{image_url, ImageSize, SortContext};
use crate::integrations::MovieListKind;

fn parse_kind(kind: &str) -> Result<MovieListKind, ErrorResponse> {
    kind.parse::<MovieListKind>().map_err(ErrorResponse::from)
}

/// One page of a listing ("popular", "now_playing", "upcoming")
pub async fn list_movies(
    state: &AppState,
    kind: &str,
    page: u32,
) -> Result<QueryStateDto<MoviePageDto>, ErrorResponse> {
    let kind = parse_kind(kind)?;
    let result = state.queries.movie_list(kind, page).await;
    Ok(QueryStateDto::from_state(result, MoviePageDto::from))
}

/// Manual retry of a listing page
pub async fn retry_list_movies(
    state: &AppState,
    kind: &str,
    page: u32,
) -> Result<QueryStateDto<MoviePageDto>, ErrorResponse> {
    let kind = parse_kind(kind)?;
    let result = state.queries.retry_movie_list(kind, page).await;
    Ok(QueryStateDto::from_state(result, MoviePageDto::from))
}

/// Listing as an infinite feed; `more` appends the next page
pub async fn browse_movies(
    state: &AppState,
    kind: &str,
    more: bool,
) -> Result<QueryStateDto<MovieFeedDto>, ErrorResponse> {
    let kind = parse_kind(kind)?;
    let result = if more {
        state.queries.browse_next_page(kind).await
    } else {
        state.queries.browse(kind).await
    };
    Ok(QueryStateDto::from_state(result, MovieFeedDto::from))
}

/// Restart a listing feed from its first page
pub async fn retry_browse_movies(
    state: &AppState,
    kind: &str,
) -> Result<QueryStateDto<MovieFeedDto>, ErrorResponse> {
    let kind = parse_kind(kind)?;
    let result = state.queries.retry_browse(kind).await;
    Ok(QueryStateDto::from_state(result, MovieFeedDto::from))
}

pub async fn get_movie_details(state: &AppState, movie_id: i64) -> QueryStateDto<MovieDetailDto> {
    let result = state.queries.movie_details(movie_id).await;
    QueryStateDto::from_state(result, MovieDetailDto::from)
}

pub async fn retry_movie_details(state: &AppState, movie_id: i64) -> QueryStateDto<MovieDetailDto> {
    let result = state.queries.retry_movie_details(movie_id).await;
    QueryStateDto::from_state(result, MovieDetailDto::from)
}

/// Top-billed cast, at most `limit` members
pub async fn get_movie_cast(
    state: &AppState,
    movie_id: i64,
    limit: usize,
) -> QueryStateDto<Vec<CastMemberDto>> {
    let result = state.queries.movie_credits(movie_id).await;
    QueryStateDto::from_state(result, |credits| {
        let mut cast = credits.cast;
        cast.sort_by_key(|member| member.order);
        cast.into_iter()
            .take(limit)
            .map(|member| CastMemberDto {
                profile_url: image_url(member.profile_path.as_deref(), ImageSize::W500),
                name: member.name,
                character: member.character,
            })
            .collect()
    })
}

pub async fn get_movie_trailers(state: &AppState, movie_id: i64) -> QueryStateDto<Vec<TrailerDto>> {
    let result = state.queries.movie_videos(movie_id).await;
    QueryStateDto::from_state(result, trailers)
}

pub async fn get_movie_reviews(
    state: &AppState,
    movie_id: i64,
    page: u32,
) -> QueryStateDto<ReviewPageDto> {
    let result = state.queries.movie_reviews(movie_id, page).await;
    QueryStateDto::from_state(result, ReviewPageDto::from)
}

/// Search feed sorted by the search sort preference.
/// Blank text answers `idle` with no movies.
pub async fn search_movies(state: &AppState, query: &str, more: bool) -> QueryStateDto<MovieFeedDto> {
    let result = if more {
        state.queries.search_next_page(query).await
    } else {
        state.queries.search_movies(query).await
    };
    let sort = state.sort.get_sort(SortContext::Search);
    QueryStateDto::from_state(result, |results| MovieFeedDto::from(results.sorted_by(sort)))
}

/// Restart a search from its first page
pub async fn retry_search_movies(state: &AppState, query: &str) -> QueryStateDto<MovieFeedDto> {
    let result = state.queries.retry_search_movies(query).await;
    let sort = state.sort.get_sort(SortContext::Search);
    QueryStateDto::from_state(result, |results| MovieFeedDto::from(results.sorted_by(sort)))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::AppConfig;
    use crate::events::EventBus;
    use crate::repositories::InMemoryKeyValueStorage;
    use crate::services::test_support::FakeCatalog;
    use crate::services::QueryStatus;

    fn state() -> AppState {
        AppState::assemble(
            &AppConfig::default(),
            Arc::new(FakeCatalog::new().with_movie(8, "Heat", 40.0, "1995-12-15")),
            Arc::new(InMemoryKeyValueStorage::new()),
            Arc::new(EventBus::new()),
        )
    }

    #[tokio::test]
    async fn test_list_movies_rejects_unknown_kind() {
        let state = state();
        let err = list_movies(&state, "trending", 1).await.unwrap_err();
        assert_eq!(err.error_type, crate::application::ErrorType::BadRequest);
    }

    #[tokio::test]
    async fn test_list_movies_builds_image_urls() {
        let state = state();
        let dto = list_movies(&state, "popular", 1).await.unwrap();

        assert_eq!(dto.status, QueryStatus::Success);
        let page = dto.data.unwrap();
        assert!(page.has_next_page);
        assert_eq!(page.movies.len(), 20);
        assert!(page.movies[0].poster_url.is_none());
    }

    #[tokio::test]
    async fn test_details_map_to_dto() {
        let state = state();
        let dto = get_movie_details(&state, 8).await;

        let detail = dto.data.unwrap();
        assert_eq!(detail.title, "Heat");
        assert_eq!(detail.runtime, Some(100));
        assert!(dto.error.is_none());
    }

    #[tokio::test]
    async fn test_blank_search_is_idle() {
        let state = state();
        let dto = search_movies(&state, "  ", false).await;

        assert_eq!(dto.status, QueryStatus::Idle);
        assert!(dto.data.unwrap().movies.is_empty());
    }

    #[tokio::test]
    async fn test_browse_appends_pages() {
        let state = state();
        browse_movies(&state, "now_playing", false).await.unwrap();
        let dto = browse_movies(&state, "now_playing", true).await.unwrap();

        let feed = dto.data.unwrap();
        assert_eq!(feed.pages_loaded, 2);
        assert_eq!(feed.movies.len(), 40);
    }

    #[tokio::test]
    async fn test_retry_restarts_feeds_from_first_page() {
        let state = state();
        browse_movies(&state, "upcoming", false).await.unwrap();
        browse_movies(&state, "upcoming", true).await.unwrap();

        let feed = retry_browse_movies(&state, "upcoming").await.unwrap().data.unwrap();
        assert_eq!(feed.pages_loaded, 1);

        let search = retry_search_movies(&state, "heat").await;
        assert_eq!(search.status, QueryStatus::Success);
        assert_eq!(search.data.unwrap().pages_loaded, 1);
    }
}

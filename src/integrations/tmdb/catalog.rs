// src/integrations/tmdb/catalog.rs
//
// Catalog access seam
//
// The query cache depends on this trait, never on the HTTP client, so a
// test double can stand in for the remote catalog.
//
// `language: None` means "use the detected locale".

use std::str::FromStr;

use async_trait::async_trait;

use crate::domain::{DomainError, MovieCredits, MovieDetail, MoviePage, MovieReviews, MovieVideos};
use crate::error::CatalogError;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Listing endpoints that share the paginated `MoviePage` shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovieListKind {
    Popular,
    NowPlaying,
    Upcoming,
}

impl MovieListKind {
    pub fn path(&self) -> &'static str {
        match self {
            MovieListKind::Popular => "/movie/popular",
            MovieListKind::NowPlaying => "/movie/now_playing",
            MovieListKind::Upcoming => "/movie/upcoming",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovieListKind::Popular => "popular",
            MovieListKind::NowPlaying => "now_playing",
            MovieListKind::Upcoming => "upcoming",
        }
    }
}

impl FromStr for MovieListKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "popular" => Ok(MovieListKind::Popular),
            "now_playing" => Ok(MovieListKind::NowPlaying),
            "upcoming" => Ok(MovieListKind::Upcoming),
            other => Err(DomainError::InvariantViolation(format!(
                "Unknown movie list: {}",
                other
            ))),
        }
    }
}

#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn movie_list(
        &self,
        kind: MovieListKind,
        page: u32,
        language: Option<&str>,
    ) -> CatalogResult<MoviePage>;

    async fn search_movies(
        &self,
        query: &str,
        page: u32,
        language: Option<&str>,
    ) -> CatalogResult<MoviePage>;

    async fn movie_details(&self, movie_id: i64, language: Option<&str>)
        -> CatalogResult<MovieDetail>;

    async fn movie_credits(
        &self,
        movie_id: i64,
        language: Option<&str>,
    ) -> CatalogResult<MovieCredits>;

    async fn movie_videos(&self, movie_id: i64, language: Option<&str>)
        -> CatalogResult<MovieVideos>;

    async fn movie_reviews(
        &self,
        movie_id: i64,
        page: u32,
        language: Option<&str>,
    ) -> CatalogResult<MovieReviews>;

    async fn popular_movies(&self, page: u32, language: Option<&str>) -> CatalogResult<MoviePage> {
        self.movie_list(MovieListKind::Popular, page, language).await
    }

    async fn now_playing(&self, page: u32, language: Option<&str>) -> CatalogResult<MoviePage> {
        self.movie_list(MovieListKind::NowPlaying, page, language).await
    }

    async fn upcoming(&self, page: u32, language: Option<&str>) -> CatalogResult<MoviePage> {
        self.movie_list(MovieListKind::Upcoming, page, language).await
    }
}

// src/main.rs
//
// cinelist [search terms]
//
// Without arguments prints the popular movies, otherwise the first page of
// search results, in the stored movie language.

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use cinelist::application::commands::{list_movies, search_movies};
use cinelist::application::dto::MovieSummaryDto;
use cinelist::application::ErrorResponse;
use cinelist::{AppConfig, AppState, QueryStatus};

fn init_logging() {
    // Still overridable via RUST_LOG
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cinelist=info,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn print_movies(movies: &[MovieSummaryDto]) {
    for movie in movies {
        let year = movie.release_date.get(..4).unwrap_or("----");
        println!("{:>8}  {}  {:>4.1}  {}", movie.id, year, movie.vote_average, movie.title);
    }
}

fn describe(error: Option<ErrorResponse>) -> String {
    match error {
        Some(e) => match e.details {
            Some(details) => format!("{} ({})", e.message, details),
            None => e.message,
        },
        None => "no data".to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let state = AppState::initialize(&config).context("failed to start")?;
    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");

    let (status, movies, error) = if query.trim().is_empty() {
        let result = list_movies(&state, "popular", 1)
            .await
            .map_err(|e| anyhow::anyhow!(e.message))?;
        (
            result.status,
            result.data.map(|page| page.movies),
            result.error,
        )
    } else {
        let result = search_movies(&state, &query, false).await;
        (
            result.status,
            result.data.map(|feed| feed.movies),
            result.error,
        )
    };

    match (status, movies) {
        (QueryStatus::Success, Some(movies)) => {
            println!(
                "language: {}  ({} movies)",
                state.locale.get_movie_language(),
                movies.len()
            );
            print_movies(&movies);
        }
        _ => bail!("catalog request failed: {}", describe(error)),
    }

    state.flush().await;
    Ok(())
}

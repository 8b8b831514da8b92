// src/integrations/tmdb/client.rs
//
// TMDB REST client
//
// ARCHITECTURE:
// - Bearer-token authenticated GET requests
// - Every request carries `language` and `region`
// - Bodies are checked against a structural schema before decoding
// - Requests are paced, never retried
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - Never returns partially-typed data
// - Retry policy belongs to the caller

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::catalog::{CatalogResult, MovieCatalog, MovieListKind};
use super::schema::{self, Schema};
use crate::config::AppConfig;
use crate::domain::{
    validate_movie_page, DetectedLocale, MovieCredits, MovieDetail, MoviePage, MovieReviews,
    MovieVideos,
};
use crate::error::{AppError, AppResult, CatalogError};

/// Error body the catalog sends with non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    status_message: Option<String>,
}

/// Minimum spacing between consecutive requests
struct RequestPacer {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RequestPacer {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

pub struct TmdbClient {
    base_url: String,
    http_client: Client,
    access_token: String,
    locale: DetectedLocale,
    pacer: RequestPacer,
}

impl TmdbClient {
    /// Create a client from configuration. Fails when no token is configured.
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let access_token = config.require_token()?.to_string();

        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.api_base_url.clone(),
            http_client,
            access_token,
            locale: DetectedLocale::from_env(),
            pacer: RequestPacer::new(config.request_interval),
        })
    }

    /// Override the detected language/region defaults
    pub fn with_locale(mut self, locale: DetectedLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn locale(&self) -> &DetectedLocale {
        &self.locale
    }

    fn params(&self, page: Option<u32>, language: Option<&str>) -> Vec<(&'static str, String)> {
        let language = language
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(&self.locale.language);

        let mut params = Vec::with_capacity(3);
        if let Some(page) = page {
            params.push(("page", page.max(1).to_string()));
        }
        params.push(("language", language.to_string()));
        params.push(("region", self.locale.region.clone()));
        params
    }

    // ========================================================================
    // INTERNAL: Request Execution
    // ========================================================================

    async fn get_validated<T>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
        schema: Schema,
    ) -> CatalogResult<T>
    where
        T: DeserializeOwned,
    {
        self.pacer.wait_turn().await;

        let url = format!("{}{}", self.base_url, path);
        log::debug!("[TMDB] GET {} {:?}", path, params);

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header(header::ACCEPT, "application/json")
            .query(params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = api_error(status, &body);
            log::warn!("[TMDB] {} failed: {}", path, err);
            return Err(err);
        }

        decode(path, &body, &schema)
    }
}

/// Turn a non-2xx response into an `Api` error with a readable message
fn api_error(status: StatusCode, body: &str) -> CatalogError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.status_message)
        .filter(|m| !m.is_empty())
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "Unknown error".to_string());

    CatalogError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Validate the raw body against `schema`, then decode it
fn decode<T>(path: &str, body: &str, schema: &Schema) -> CatalogResult<T>
where
    T: DeserializeOwned,
{
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        log::warn!("[TMDB] {} returned a non-JSON body: {}", path, e);
        CatalogError::Validation {
            fields: vec!["<root>".to_string()],
        }
    })?;

    if let Err(fields) = schema.validate(&value) {
        log::warn!("[TMDB] {} failed validation: {}", path, fields.join(", "));
        return Err(CatalogError::Validation { fields });
    }

    serde_json::from_value(value).map_err(|e| {
        log::warn!("[TMDB] {} could not be decoded: {}", path, e);
        CatalogError::Validation {
            fields: vec![e.to_string()],
        }
    })
}

fn checked_page(page: MoviePage) -> CatalogResult<MoviePage> {
    validate_movie_page(&page).map_err(|e| CatalogError::Validation {
        fields: vec![e.to_string()],
    })?;
    Ok(page)
}

#[async_trait]
impl MovieCatalog for TmdbClient {
    async fn movie_list(
        &self,
        kind: MovieListKind,
        page: u32,
        language: Option<&str>,
    ) -> CatalogResult<MoviePage> {
        let params = self.params(Some(page), language);
        let result = self
            .get_validated(kind.path(), &params, schema::movie_page())
            .await?;
        checked_page(result)
    }

    async fn search_movies(
        &self,
        query: &str,
        page: u32,
        language: Option<&str>,
    ) -> CatalogResult<MoviePage> {
        let mut params = vec![("query", query.to_string())];
        params.extend(self.params(Some(page), language));
        let result = self
            .get_validated("/search/movie", &params, schema::movie_page())
            .await?;
        checked_page(result)
    }

    async fn movie_details(
        &self,
        movie_id: i64,
        language: Option<&str>,
    ) -> CatalogResult<MovieDetail> {
        let params = self.params(None, language);
        self.get_validated(&format!("/movie/{}", movie_id), &params, schema::movie_detail())
            .await
    }

    async fn movie_credits(
        &self,
        movie_id: i64,
        language: Option<&str>,
    ) -> CatalogResult<MovieCredits> {
        let params = self.params(None, language);
        self.get_validated(
            &format!("/movie/{}/credits", movie_id),
            &params,
            schema::movie_credits(),
        )
        .await
    }

    async fn movie_videos(
        &self,
        movie_id: i64,
        language: Option<&str>,
    ) -> CatalogResult<MovieVideos> {
        let params = self.params(None, language);
        self.get_validated(
            &format!("/movie/{}/videos", movie_id),
            &params,
            schema::movie_videos(),
        )
        .await
    }

    async fn movie_reviews(
        &self,
        movie_id: i64,
        page: u32,
        language: Option<&str>,
    ) -> CatalogResult<MovieReviews> {
        let params = self.params(Some(page), language);
        self.get_validated(
            &format!("/movie/{}/reviews", movie_id),
            &params,
            schema::movie_reviews(),
        )
        .await
    }
}

// src/config.rs
//
// Runtime configuration
//
// PRINCIPLES:
// - Every setting has a default except the catalog token
// - Values come from the process environment only
// - Malformed values are reported, never silently replaced

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};

pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_FALLBACK_LANGUAGE: &str = "en";
pub const DEFAULT_STALE_SECS: u64 = 300;
pub const DEFAULT_CACHE_CAPACITY: usize = 500;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REQUEST_INTERVAL_MS: u64 = 25;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bearer token for the catalog API (read access token)
    pub api_token: Option<String>,
    pub api_base_url: String,
    /// Directory holding the SQLite store
    pub data_dir: PathBuf,
    /// Language both locale settings start from
    pub fallback_language: String,
    /// How long a successful query result counts as fresh
    pub stale_time: Duration,
    /// Maximum number of cache entries kept before LRU eviction
    pub cache_capacity: usize,
    pub request_timeout: Duration,
    /// Minimum spacing between two catalog requests
    pub request_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            data_dir: default_data_dir(),
            fallback_language: DEFAULT_FALLBACK_LANGUAGE.to_string(),
            stale_time: Duration::from_secs(DEFAULT_STALE_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            request_interval: Duration::from_millis(DEFAULT_REQUEST_INTERVAL_MS),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            api_token: get("TMDB_API_READ_ACCESS_TOKEN"),
            api_base_url: get("CINELIST_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            data_dir: get("CINELIST_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            fallback_language: get("CINELIST_FALLBACK_LANGUAGE")
                .unwrap_or(defaults.fallback_language),
            stale_time: parse_number(get("CINELIST_STALE_SECS"), "CINELIST_STALE_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.stale_time),
            cache_capacity: parse_number(get("CINELIST_CACHE_CAPACITY"), "CINELIST_CACHE_CAPACITY")?
                .map(|n: u64| n as usize)
                .unwrap_or(defaults.cache_capacity),
            request_timeout: parse_number(
                get("CINELIST_REQUEST_TIMEOUT_SECS"),
                "CINELIST_REQUEST_TIMEOUT_SECS",
            )?
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout),
            request_interval: defaults.request_interval,
        })
    }

    /// Database file path: {data_dir}/cinelist.db
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("cinelist.db")
    }

    /// The token, or a configuration error naming the variable to set
    pub fn require_token(&self) -> AppResult<&str> {
        self.api_token.as_deref().ok_or_else(|| {
            AppError::Config(
                "TMDB API token is not defined. Set TMDB_API_READ_ACCESS_TOKEN.".to_string(),
            )
        })
    }
}

fn parse_number(value: Option<String>, key: &str) -> AppResult<Option<u64>> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .map_err(|e| AppError::Config(format!("{} must be a number: {}", key, e)))
        })
        .transpose()
}

/// Application data directory: {APP_DATA}/cinelist
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("cinelist")
}

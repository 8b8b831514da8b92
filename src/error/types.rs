// src/error/types.rs
use crate::domain::DomainError;
use serde::Serialize;
use thiserror::Error;

/// Failures of a catalog fetch.
/// Cloneable so one cached outcome can be handed to every waiter of a key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Response body did not match the expected structure
    #[error("Catalog response failed validation: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    /// Non-2xx HTTP status
    #[error("Catalog API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Connection, timeout or body read failure
    #[error("Catalog transport error: {0}")]
    Transport(String),

    /// A completed fetch no longer matches its cache key and was dropped
    #[error("Stale catalog result discarded")]
    StaleResultDiscarded,
}

impl CatalogError {
    /// Server-side and transport failures may succeed on a manual retry
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogError::Api { status, .. } => *status >= 500,
            CatalogError::Transport(_) => true,
            CatalogError::Validation { .. } | CatalogError::StaleResultDiscarded => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::Api { status: 404, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::Transport(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

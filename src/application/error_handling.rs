// src/application/error_handling.rs
//
// Error Handling for Commands
//
// ARCHITECTURE:
// - Maps internal errors → user-facing states
// - Provides consistent error format for the UI
// - Never exposes internal implementation details
// - Logs errors for debugging
//
// Persistence failures are swallowed by the stores and never reach this layer.

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::error::{AppError, CatalogError};

/// Standard error response for the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
    /// A manual retry may succeed
    pub retryable: bool,
}

/// Error categories for the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Response did not have the expected structure
    DataUnavailable,

    /// Catalog has no such resource (404)
    NotFound,

    /// Invalid input or other 4xx
    BadRequest,

    /// 5xx or transport failure
    TemporarilyUnavailable,

    /// Other/unknown error
    Internal,
}

impl ErrorResponse {
    fn new(error_type: ErrorType, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error_type,
            message: message.into(),
            details,
            retryable: error_type == ErrorType::TemporarilyUnavailable,
        }
    }

    /// Create error response from a failed catalog query
    pub fn from_catalog_error(error: &CatalogError) -> Self {
        match error {
            CatalogError::Validation { fields } => Self::new(
                ErrorType::DataUnavailable,
                "Movie data is unavailable",
                Some(fields.join(", ")),
            ),

            CatalogError::Api { status: 404, message } => Self {
                details: Some(message.clone()),
                ..Self::not_found("Movie")
            },

            CatalogError::Api { status, message } if *status < 500 => Self::new(
                ErrorType::BadRequest,
                "The catalog rejected the request",
                Some(format!("{} {}", status, message)),
            ),

            CatalogError::Api { status, message } => Self::new(
                ErrorType::TemporarilyUnavailable,
                "The catalog is temporarily unavailable",
                Some(format!("{} {}", status, message)),
            ),

            CatalogError::Transport(reason) => Self::new(
                ErrorType::TemporarilyUnavailable,
                "Could not reach the catalog",
                Some(reason.clone()),
            ),

            CatalogError::StaleResultDiscarded => Self::new(
                ErrorType::Internal,
                "The request was superseded",
                None,
            ),
        }
    }

    /// Create error response from AppError
    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::Catalog(catalog_error) => Self::from_catalog_error(&catalog_error),

            AppError::Domain(domain_error) => Self::from_domain_error(domain_error),

            AppError::Config(message) => {
                log::error!("[COMMAND] configuration error: {}", message);
                Self::new(ErrorType::Internal, message, None)
            }

            other => {
                log::error!("[COMMAND] internal error: {:?}", other);
                Self::new(
                    ErrorType::Internal,
                    "Internal error",
                    Some("Check logs for details".to_string()),
                )
            }
        }
    }

    /// Rejected input
    pub fn from_domain_error(error: DomainError) -> Self {
        Self::new(ErrorType::BadRequest, error.to_string(), None)
    }

    /// Create not found error
    pub fn not_found(resource: &str) -> Self {
        Self::new(ErrorType::NotFound, format!("{} not found", resource), None)
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(error: DomainError) -> Self {
        Self::from_domain_error(error)
    }
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self::from_app_error(error)
    }
}

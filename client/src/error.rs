//! Error handling for the inventory client
//!
//! Every failure carries a kind from a small taxonomy so callers can pick the
//! right user-facing message and backoff policy.

use serde::Serialize;
use shared::ValidationError;
use thiserror::Error;

/// Error categories surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Rejected locally before submission
    Validation,
    /// Server asked the caller to back off (HTTP 429)
    RateLimited,
    /// 4xx other than 429, or an envelope with `success: false`
    RemoteRejected,
    /// No response received
    Transport,
    /// Session token missing or expired
    Unauthorized,
    /// Report generation failed
    Export,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::RemoteRejected => "remote_rejected",
            ErrorKind::Transport => "transport",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Export => "export",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inventory client error types
#[derive(Error, Debug)]
pub enum InventoryError {
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Request rejected ({status}): {message}")]
    RemoteRejected { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("No data to export")]
    NoDataToExport,

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unexpected error: {message}")]
    Unknown {
        status: Option<u16>,
        message: String,
    },
}

impl InventoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InventoryError::Validation { .. } | InventoryError::NotFound(_) => ErrorKind::Validation,
            InventoryError::RateLimited { .. } => ErrorKind::RateLimited,
            InventoryError::RemoteRejected { .. } => ErrorKind::RemoteRejected,
            InventoryError::Transport(_) => ErrorKind::Transport,
            InventoryError::SessionExpired => ErrorKind::Unauthorized,
            InventoryError::NoDataToExport | InventoryError::Export(_) => ErrorKind::Export,
            InventoryError::Configuration(_) | InventoryError::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Map a non-success HTTP status to the taxonomy
    pub fn from_status(status: u16, message: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        let message = message.into();
        match status {
            429 => InventoryError::RateLimited {
                message,
                retry_after_secs,
            },
            400..=499 => InventoryError::RemoteRejected { status, message },
            _ => InventoryError::Unknown {
                status: Some(status),
                message,
            },
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RateLimited | ErrorKind::Transport | ErrorKind::Unknown
        )
    }

    /// Text suitable for a toast
    pub fn user_message(&self) -> String {
        match self {
            InventoryError::Validation { message, .. } => message.clone(),
            InventoryError::NotFound(_) => "The product no longer exists".to_string(),
            InventoryError::RateLimited {
                retry_after_secs: Some(secs),
                ..
            } => format!("Server busy, retry in {} seconds", secs),
            InventoryError::RateLimited { .. } => "Server busy, retry later".to_string(),
            InventoryError::RemoteRejected { message, .. } => message.clone(),
            InventoryError::Transport(_) => {
                "Could not reach the server, check your connection".to_string()
            }
            InventoryError::SessionExpired => "Your session has expired, sign in again".to_string(),
            InventoryError::NoDataToExport => "No data to export".to_string(),
            InventoryError::Export(_) => "The report could not be generated".to_string(),
            InventoryError::Configuration(_) | InventoryError::Unknown { .. } => {
                "Something went wrong, try again".to_string()
            }
        }
    }

    pub fn detail(&self) -> ErrorDetail {
        let field = match self {
            InventoryError::Validation { field, .. } => Some(field.clone()),
            _ => None,
        };
        ErrorDetail {
            kind: self.kind(),
            message: self.user_message(),
            field,
        }
    }
}

impl From<ValidationError> for InventoryError {
    fn from(err: ValidationError) -> Self {
        InventoryError::Validation {
            field: err.field.to_string(),
            message: err.message.to_string(),
        }
    }
}

impl From<reqwest::Error> for InventoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return InventoryError::Unknown {
                status: err.status().map(|s| s.as_u16()),
                message: format!("Failed to parse response: {}", err),
            };
        }
        match err.status() {
            Some(status) => InventoryError::from_status(status.as_u16(), err.to_string(), None),
            None => InventoryError::Transport(err.to_string()),
        }
    }
}

impl From<config::ConfigError> for InventoryError {
    fn from(err: config::ConfigError) -> Self {
        InventoryError::Configuration(err.to_string())
    }
}

/// Serializable error payload for the UI layer
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Result type alias for client operations
pub type InventoryResult<T> = Result<T, InventoryError>;

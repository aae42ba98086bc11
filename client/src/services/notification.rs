//! User notifications raised by the inventory store
//!
//! The store only decides what to say and how severe it is; rendering is up
//! to whichever [`NotificationSink`] the UI layer plugs in.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, InventoryError};

/// Notification severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast payload, either plain text or titled
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Toast {
    Simple {
        text: String,
    },
    Structured {
        title: String,
        message: String,
        severity: Severity,
    },
}

impl Toast {
    pub fn simple(text: impl Into<String>) -> Self {
        Toast::Simple { text: text.into() }
    }

    pub fn structured(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Toast::Structured {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Toast::structured("Done", message, Severity::Success)
    }

    /// Toast for a failed operation. Rate limiting gets its own wording and a
    /// warning severity.
    pub fn from_error(err: &InventoryError) -> Self {
        match err.kind() {
            ErrorKind::RateLimited => {
                Toast::structured("Server busy", err.user_message(), Severity::Warning)
            }
            ErrorKind::Validation => {
                Toast::structured("Check the form", err.user_message(), Severity::Warning)
            }
            _ => Toast::structured("Error", err.user_message(), Severity::Error),
        }
    }

    /// Message text, whatever the shape
    pub fn message(&self) -> &str {
        match self {
            Toast::Simple { text } => text,
            Toast::Structured { message, .. } => message,
        }
    }

    /// Severity, plain toasts count as info
    pub fn severity(&self) -> Severity {
        match self {
            Toast::Simple { .. } => Severity::Info,
            Toast::Structured { severity, .. } => *severity,
        }
    }
}

/// Where notifications are delivered
pub trait NotificationSink: Send + Sync {
    fn notify(&self, toast: &Toast);
}

/// Sink that writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, toast: &Toast) {
        match toast.severity() {
            Severity::Error => tracing::error!(text = toast.message(), "Notification"),
            Severity::Warning => tracing::warn!(text = toast.message(), "Notification"),
            Severity::Info | Severity::Success => {
                tracing::info!(text = toast.message(), "Notification")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_tagged_serialization() {
        let json = serde_json::to_value(Toast::simple("Saved")).unwrap();
        assert_eq!(json["kind"], "simple");
        assert_eq!(json["text"], "Saved");

        let json = serde_json::to_value(Toast::structured("Oops", "Failed", Severity::Error)).unwrap();
        assert_eq!(json["kind"], "structured");
        assert_eq!(json["severity"], "error");
    }

    #[test]
    fn test_simple_toast_defaults_to_info() {
        let toast = Toast::simple("hello");
        assert_eq!(toast.severity(), Severity::Info);
        assert_eq!(toast.message(), "hello");
    }

    #[test]
    fn test_rate_limit_toast_is_warning() {
        let err = InventoryError::from_status(429, "Too Many Requests", None);
        let toast = Toast::from_error(&err);
        assert_eq!(toast.severity(), Severity::Warning);
        assert_eq!(toast.message(), "Server busy, retry later");

        let err = InventoryError::from_status(500, "boom", None);
        assert_eq!(Toast::from_error(&err).severity(), Severity::Error);
    }
}

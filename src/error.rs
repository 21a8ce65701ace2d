use std::collections::BTreeMap;

use thiserror::Error;

/// Fallback shown when the server rejects a call without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Shown for transport failures (timeouts, DNS, refused connections).
pub const CONNECTIVITY_MESSAGE: &str =
    "Could not reach the server. Check your connectivity and try again.";

/// Shown when no access token is available at call time.
pub const UNAUTHENTICATED_MESSAGE: &str =
    "You are not signed in. Configure an access token and try again.";

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("unauthenticated: no access token available")]
    Unauthenticated,

    #[error("server rejected the request (HTTP {status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
        field_errors: BTreeMap<String, String>,
    },

    #[error("connectivity error: {0}")]
    Connectivity(String),

    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("'{0}' is already being updated")]
    Busy(String),

    #[error("item '{0}' not found")]
    NotFound(String),

    #[error("{resource} does not support '{action}'")]
    UnsupportedTransition {
        resource: &'static str,
        action: &'static str,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl DeskError {
    /// Build a client-side validation failure for `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DeskError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Shorthand for the common "<field> required" validation failure.
    pub fn required(field: &str) -> Self {
        Self::validation(field, format!("{field} required"))
    }

    /// The text a user should see for this error in a notification.
    pub fn user_message(&self) -> String {
        match self {
            DeskError::Unauthenticated => UNAUTHENTICATED_MESSAGE.to_string(),
            DeskError::Rejected { message, .. } => message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(GENERIC_FAILURE_MESSAGE)
                .to_string(),
            DeskError::Connectivity(_) => CONNECTIVITY_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// True when the call never reached the network.
    pub fn is_client_side(&self) -> bool {
        matches!(
            self,
            DeskError::Unauthenticated
                | DeskError::Validation { .. }
                | DeskError::Busy(_)
                | DeskError::NotFound(_)
                | DeskError::UnsupportedTransition { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DeskError>;

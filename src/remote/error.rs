//! Error classification for admin API calls.
//!
//! Every failure leaving the HTTP layer is one of two kinds: the server
//! answered with a non-2xx status (`Rejected`, carrying whatever structured
//! message the body had), or the request never completed (`Connectivity`).

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::DeskError;

use super::FieldErrors;

/// Structured error body returned by the admin API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub field_errors: FieldErrors,
}

#[derive(Deserialize)]
struct RawErrorBody {
    #[serde(default, alias = "detail", alias = "error")]
    message: Option<String>,
    #[serde(default, alias = "fieldErrors", alias = "errors")]
    field_errors: BTreeMap<String, serde_json::Value>,
}

impl ErrorBody {
    /// Parse a response body; unparsable bodies yield an empty `ErrorBody`.
    pub fn parse(bytes: &[u8]) -> Self {
        let Ok(raw) = serde_json::from_slice::<RawErrorBody>(bytes) else {
            return Self::default();
        };

        let field_errors = raw
            .field_errors
            .into_iter()
            .filter_map(|(field, value)| flatten_field_error(value).map(|msg| (field, msg)))
            .collect();

        Self {
            message: raw.message.filter(|m| !m.trim().is_empty()),
            field_errors,
        }
    }

    /// Message to surface: the top-level message, else the first field error.
    pub fn best_message(&self) -> Option<String> {
        self.message.clone().or_else(|| {
            self.field_errors
                .iter()
                .next()
                .map(|(field, msg)| format!("{field}: {msg}"))
        })
    }

    pub fn into_error(self, status: reqwest::StatusCode) -> DeskError {
        DeskError::Rejected {
            status: status.as_u16(),
            message: self.best_message(),
            field_errors: self.field_errors,
        }
    }
}

/// Field errors arrive either as a string or as a list of strings.
fn flatten_field_error(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Array(items) => {
            let parts: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// Classify a reqwest failure.
pub fn classify_transport_error(err: reqwest::Error) -> DeskError {
    if err.is_decode() {
        return DeskError::Rejected {
            status: err.status().map(|s| s.as_u16()).unwrap_or(200),
            message: Some("The server returned an unexpected response.".to_string()),
            field_errors: BTreeMap::new(),
        };
    }

    if let Some(status) = err.status() {
        return DeskError::Rejected {
            status: status.as_u16(),
            message: None,
            field_errors: BTreeMap::new(),
        };
    }

    if err.is_builder() {
        return DeskError::Other(format!("failed to build request: {err}"));
    }

    DeskError::Connectivity(err.to_string())
}

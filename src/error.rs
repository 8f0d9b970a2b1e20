// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with consistent user-facing messages.

use serde_json::Value;

/// Error body returned by the backend on non-2xx responses.
///
/// The backend is not consistent about which key carries the text: form
/// validation errors use `message`, token errors use `detail`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub message: Option<String>,
    pub detail: Option<String>,
    /// Raw response text, kept for logging.
    pub raw: String,
}

impl ApiErrorBody {
    /// Parse an error body, tolerating non-JSON payloads.
    pub fn parse(raw: String) -> Self {
        let value = serde_json::from_str::<Value>(&raw).unwrap_or(Value::Null);
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        let message = text("message");
        let detail = text("detail");
        Self {
            message,
            detail,
            raw,
        }
    }

    /// Best available one-line description.
    pub fn summary(&self) -> &str {
        self.message
            .as_deref()
            .or(self.detail.as_deref())
            .unwrap_or(&self.raw)
    }
}

/// Client error type.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP {status}: {}", .body.summary())]
    Api { status: u16, body: ApiErrorBody },

    /// Refresh credential rejected; the session has been cleared.
    #[error("Session expired, login required")]
    SessionExpired(#[source] Box<ClientError>),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to encode request: {0}")]
    Encode(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    /// HTTP 200 whose envelope reports a failure.
    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// `detail` value the backend uses for a dead refresh credential.
    pub const TOKEN_INVALID_DETAIL: &'static str = "Token is invalid";

    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// True for a 401 whose body marks the token as invalid.
    pub fn is_token_invalid(&self) -> bool {
        match self {
            ClientError::Api { status: 401, body } => {
                body.detail.as_deref() == Some(Self::TOKEN_INVALID_DETAIL)
            }
            _ => false,
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired(_))
    }

    /// Text suitable for a transient user notification.
    ///
    /// Prefers the backend's `message`, then `detail`, then `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ClientError::Api { body, .. } => body
                .message
                .clone()
                .or_else(|| body.detail.clone())
                .unwrap_or_else(|| fallback.to_string()),
            ClientError::SessionExpired(_) => "Session expired. Please log in again.".to_string(),
            ClientError::NotAuthenticated => "Please log in first.".to_string(),
            ClientError::Validation(msg) | ClientError::Rejected(msg) => msg.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ClientError::Validation(crate::validation::describe(&errors))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_SESSION_FILE: &str = ".psa_session.json";
const DEFAULT_GOOGLE_REDIRECT_URI: &str = "http://localhost:3000/google/callback";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, without a trailing slash
    pub backend_url: String,
    /// Where the session (credentials + profile fields) is persisted
    pub session_file: PathBuf,
    /// Google OAuth client ID (public); Google login is disabled without it
    pub google_client_id: Option<String>,
    /// Redirect URI registered with Google for the OAuth callback
    pub google_redirect_uri: String,
    /// Per-request timeout; `None` waits indefinitely
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let backend_url =
            env::var("PSA_BACKEND_URL").map_err(|_| ConfigError::Missing("PSA_BACKEND_URL"))?;

        let request_timeout = match env::var("PSA_HTTP_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid("PSA_HTTP_TIMEOUT_SECS", raw.clone()))?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self {
            backend_url: normalize_base_url(&backend_url),
            session_file: env::var("PSA_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_FILE)),
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            google_redirect_uri: env::var("GOOGLE_REDIRECT_URI")
                .unwrap_or_else(|_| DEFAULT_GOOGLE_REDIRECT_URI.to_string()),
            request_timeout,
        })
    }

    /// Config pointing at `backend_url`, for tests.
    pub fn test_default(backend_url: &str) -> Self {
        Self {
            backend_url: normalize_base_url(backend_url),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            google_client_id: Some("test-client-id.apps.googleusercontent.com".to_string()),
            google_redirect_uri: DEFAULT_GOOGLE_REDIRECT_URI.to_string(),
            request_timeout: None,
        }
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated request gateway.
//!
//! Every call that needs the user's credentials goes through [`Gateway::execute`]:
//! - attaches the session's access token as a bearer credential
//! - on 401, refreshes the access token once and retries once
//! - on a dead refresh token, clears the session and reports
//!   [`ClientError::SessionExpired`]; navigation is left to the caller

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::error::{ApiErrorBody, ClientError, Result};
use crate::models::auth::{RefreshRequest, RefreshResponse};
use crate::session::SessionStore;

/// Endpoint that mints a new access token from a refresh token.
pub const REFRESH_PATH: &str = "/api/auth/refresh_token/";

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// Description of one backend call, replayable for the post-refresh retry.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the backend base URL, starting with `/`
    pub path: String,
    pub body: RequestBody,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| ClientError::Encode(e.to_string()))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Attach a form-encoded body.
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = RequestBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| ClientError::Decode(format!("{} (body: {})", e, truncate(&self.body))))
    }
}

/// Three-way view of a gateway result for callers that drive navigation.
#[derive(Debug)]
pub enum Outcome<T> {
    Ok(T),
    /// Session is gone; send the user to login.
    AuthExpired,
    Failed(ClientError),
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Ok(value),
            Err(ClientError::SessionExpired(_)) => Outcome::AuthExpired,
            Err(err) => Outcome::Failed(err),
        }
    }
}

/// HTTP gateway bound to one backend and one session.
pub struct Gateway {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    /// Serializes refreshes so concurrent 401s mint one new token.
    refresh_lock: Mutex<()>,
}

impl Gateway {
    /// Create a gateway for the configured backend.
    pub fn new(config: &Config, session: Arc<SessionStore>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self::with_client(http, &config.backend_url, session))
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, session: Arc<SessionStore>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Issue an authenticated request with at most one refresh-and-retry.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let sent_token = self.session.access_token();

        let original = match self.send(request, sent_token.as_deref()).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        if !original.is_unauthorized() || self.session.refresh_token().is_none() {
            return Err(original);
        }

        let guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while this one was in flight.
        let current = self.session.access_token();
        if current.is_some() && current != sent_token {
            drop(guard);
            tracing::debug!(path = %request.path, "Access token already refreshed, retrying");
            return self.send(request, current.as_deref()).await;
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            return Err(original);
        };

        tracing::info!(path = %request.path, "Access token rejected, refreshing");

        let refreshed = match self.refresh(&refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(refresh_err) if refresh_err.is_token_invalid() => {
                tracing::warn!("Refresh token is invalid, clearing session");
                if let Err(e) = self.session.clear() {
                    tracing::error!(error = %e, "Failed to clear session");
                }
                return Err(ClientError::SessionExpired(Box::new(refresh_err)));
            }
            Err(refresh_err) => {
                tracing::warn!(error = %refresh_err, "Token refresh failed");
                return Err(refresh_err);
            }
        };

        let Some(RefreshResponse {
            access: Some(access),
            refresh: rotated,
        }) = refreshed
        else {
            tracing::warn!("Refresh response carried no access token");
            return Err(original);
        };

        self.session.update_access(&access, rotated.as_deref())?;
        drop(guard);

        tracing::info!(path = %request.path, "Token refreshed, retrying request");
        self.send(request, Some(&access)).await
    }

    /// Authenticated request with a JSON response.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        self.execute(request).await?.json()
    }

    /// Request without the session's credentials (login, OTP, registration).
    pub async fn send_public(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.send(request, None).await
    }

    /// Request authorized by an explicit token instead of the session.
    pub async fn send_with_token(&self, request: &ApiRequest, token: &str) -> Result<ApiResponse> {
        self.send(request, Some(token)).await
    }

    /// POST the refresh credential.
    ///
    /// `Ok(None)` for a success other than 200 or a body that is not a
    /// refresh response; errors only for non-2xx statuses and transport.
    async fn refresh(&self, refresh_token: &str) -> Result<Option<RefreshResponse>> {
        let request = ApiRequest::post(REFRESH_PATH).json(&RefreshRequest {
            refresh: refresh_token,
        })?;
        let response = self.send(&request, None).await?;

        if response.status != StatusCode::OK {
            tracing::debug!(status = response.status.as_u16(), "Unexpected refresh status");
            return Ok(None);
        }
        match response.json::<RefreshResponse>() {
            Ok(refreshed) => Ok(Some(refreshed)),
            Err(e) => {
                tracing::debug!(error = %e, "Unreadable refresh response");
                Ok(None)
            }
        }
    }

    async fn send(&self, request: &ApiRequest, access_token: Option<&str>) -> Result<ApiResponse> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());

        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(fields) => builder.form(fields),
        };

        let response = builder.send().await?;
        check_response(response).await
    }
}

/// Check response status and return an error if not successful.
async fn check_response(response: reqwest::Response) -> Result<ApiResponse> {
    let status = response.status();

    if status.is_success() {
        let body = response.text().await?;
        return Ok(ApiResponse { status, body });
    }

    let body = response.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), body = %truncate(&body), "Backend returned error");

    Err(ClientError::Api {
        status: status.as_u16(),
        body: ApiErrorBody::parse(body),
    })
}

fn truncate(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication request and response bodies.

use serde::{Deserialize, Serialize};

/// Login request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username_or_email: &'a str,
    pub password: &'a str,
}

/// Google OAuth code exchange body.
#[derive(Debug, Serialize)]
pub struct GoogleLoginRequest<'a> {
    pub code: &'a str,
}

/// OTP request body.
#[derive(Debug, Serialize)]
pub struct OtpRequest<'a> {
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<&'a str>,
}

/// JSON OTP verification body (password reset flow).
#[derive(Debug, Serialize)]
pub struct VerifyOtpRequest<'a> {
    pub email: &'a str,
    pub otp: &'a str,
    pub option: &'a str,
}

/// Change password body (old password is sent as `password`).
#[derive(Debug, Serialize)]
pub struct ChangePasswordRequest<'a> {
    pub password: &'a str,
    pub new_password: &'a str,
}

/// Refresh request body.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Refresh response. `access` missing means the refresh did not take.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    #[serde(default)]
    pub access: Option<String>,
    /// Present when the backend rotates refresh credentials.
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Envelope used by the auth endpoints: `{status, message, data}`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthEnvelope<T> {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// Credentials handed out at login, registration or OAuth callback.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// User fields returned with a login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Short-lived credential returned by a verified password-reset OTP.
///
/// Only authorizes the reset call; never stored in the session.
#[derive(Clone, Deserialize)]
pub struct ResetGrant {
    pub access: String,
}

impl std::fmt::Debug for ResetGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetGrant").finish_non_exhaustive()
    }
}

/// `data` of a reset-password OTP verification.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetOtpData {
    #[serde(default)]
    pub access: Option<String>,
}

/// Body of the reset call.
#[derive(Debug, Serialize)]
pub struct ResetPasswordRequest<'a> {
    pub new_password: &'a str,
}

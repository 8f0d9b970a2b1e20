// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication flows: login, Google OAuth, OTP registration, password
//! change and reset, session checks.

use std::sync::Arc;
use validator::{Validate, ValidateEmail};

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::gateway::{ApiRequest, ApiResponse, Gateway};
use crate::models::auth::{
    AuthEnvelope, AuthTokens, ChangePasswordRequest, GoogleLoginRequest, LoginRequest, OtpRequest,
    ResetGrant, ResetOtpData, ResetPasswordRequest, VerifyOtpRequest,
};
use crate::session::SessionProfile;
use crate::validation::{
    check_otp, require_non_blank, ChangePasswordForm, RegistrationForm, ResetPasswordForm,
};

/// `option` value that switches the OTP endpoints to the reset flow.
const RESET_PASSWORD_OPTION: &str = "reset_password";

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Result of probing the stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No credentials stored.
    Anonymous,
    Authenticated,
    /// Credentials stored but rejected by the backend.
    Expired,
}

/// Registration waiting for its OTP.
#[derive(Clone)]
pub struct PendingRegistration {
    form: RegistrationForm,
}

impl PendingRegistration {
    pub fn email(&self) -> &str {
        &self.form.email
    }
}

impl std::fmt::Debug for PendingRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRegistration")
            .field("username", &self.form.username)
            .field("email", &self.form.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct AuthService {
    gateway: Arc<Gateway>,
    google_client_id: Option<String>,
    google_redirect_uri: String,
}

impl AuthService {
    pub fn new(gateway: Arc<Gateway>, config: &Config) -> Self {
        Self {
            gateway,
            google_client_id: config.google_client_id.clone(),
            google_redirect_uri: config.google_redirect_uri.clone(),
        }
    }

    // ─── Login ───────────────────────────────────────────────────────────────

    /// Log in with username or email; replaces any stored session.
    pub async fn login(&self, username_or_email: &str, password: &str) -> Result<SessionProfile> {
        let username_or_email = require_non_blank(username_or_email, "Email")?;
        if password.is_empty() {
            return Err(ClientError::Validation("Password is required".to_string()));
        }

        // Stale credentials must not survive a failed login attempt.
        self.gateway.session().clear()?;

        let request = ApiRequest::post("/api/auth/login/").json(&LoginRequest {
            username_or_email,
            password,
        })?;
        let response = self.gateway.send_public(&request).await?;

        self.finish_login(&response, "Login failed. Please try again.")
    }

    /// URL of Google's consent screen; the callback receives `code`.
    pub fn google_authorize_url(&self) -> Result<String> {
        let client_id = self.google_client_id.as_deref().ok_or_else(|| {
            ClientError::Validation("Google login is not configured (GOOGLE_CLIENT_ID)".to_string())
        })?;

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            GOOGLE_AUTHORIZE_URL,
            urlencoding::encode(client_id),
            urlencoding::encode(&self.google_redirect_uri),
            urlencoding::encode("email profile"),
        ))
    }

    /// Exchange a Google authorization code for a session.
    pub async fn login_google(&self, code: &str) -> Result<SessionProfile> {
        let code = require_non_blank(code, "Authorization code")?;
        let request =
            ApiRequest::post("/api/auth/login_google/").json(&GoogleLoginRequest { code })?;
        let response = self.gateway.send_public(&request).await?;

        self.finish_login(&response, "Google login failed.")
    }

    fn finish_login(&self, response: &ApiResponse, fallback: &str) -> Result<SessionProfile> {
        let envelope: AuthEnvelope<AuthTokens> = response.json()?;

        if envelope.status.is_some_and(|s| s != 200) {
            return Err(ClientError::Rejected(
                envelope.message.unwrap_or_else(|| fallback.to_string()),
            ));
        }
        let tokens = envelope
            .data
            .ok_or_else(|| ClientError::Rejected(fallback.to_string()))?;

        self.gateway.session().store_login(&tokens)?;
        let profile = self.gateway.session().profile();

        tracing::info!(username = ?profile.username, "Logged in");
        Ok(profile)
    }

    // ─── Registration ────────────────────────────────────────────────────────

    /// Validate the form and mail an OTP to its address.
    pub async fn start_registration(&self, form: RegistrationForm) -> Result<PendingRegistration> {
        form.validate()?;

        let request = ApiRequest::post("/api/auth/otp/").json(&OtpRequest {
            email: &form.email,
            option: None,
        })?;
        self.gateway.send_public(&request).await?;

        tracing::info!(username = %form.username, "Registration OTP sent");
        Ok(PendingRegistration { form })
    }

    /// Verify the OTP, then create the account. The user logs in afterwards.
    pub async fn complete_registration(&self, pending: &PendingRegistration, otp: &str) -> Result<()> {
        let otp = check_otp(otp)?;
        let form = &pending.form;

        let verify = ApiRequest::post("/api/auth/verify_otp/")
            .form([("email", form.email.as_str()), ("otp", otp.as_str())]);
        self.gateway.send_public(&verify).await?;

        let register = ApiRequest::post("/api/auth/register/").form([
            ("username", form.username.as_str()),
            ("email", form.email.as_str()),
            ("password", form.password.as_str()),
            ("first_name", form.first_name.as_str()),
            ("last_name", form.last_name.as_str()),
        ]);
        self.gateway.send_public(&register).await?;

        tracing::info!(username = %form.username, "Registration complete");
        Ok(())
    }

    // ─── Passwords ───────────────────────────────────────────────────────────

    /// Change the logged-in user's password.
    pub async fn change_password(&self, form: ChangePasswordForm) -> Result<()> {
        form.validate()?;
        if self.gateway.session().credentials().is_none() {
            return Err(ClientError::NotAuthenticated);
        }

        let request = ApiRequest::post("/api/auth/change_password/").json(&ChangePasswordRequest {
            password: &form.old_password,
            new_password: &form.new_password,
        })?;
        self.gateway.execute(&request).await?;

        tracing::info!("Password changed");
        Ok(())
    }

    /// Mail a password-reset OTP.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if !email.validate_email() {
            return Err(ClientError::Validation("Enter a valid email address.".to_string()));
        }

        let request = ApiRequest::post("/api/auth/otp/").json(&OtpRequest {
            email,
            option: Some(RESET_PASSWORD_OPTION),
        })?;
        self.gateway.send_public(&request).await?;
        Ok(())
    }

    /// Trade a reset OTP for a one-off reset grant.
    pub async fn verify_reset_otp(&self, email: &str, otp: &str) -> Result<ResetGrant> {
        let otp = check_otp(otp)?;
        let request = ApiRequest::post("/api/auth/verify_otp/").json(&VerifyOtpRequest {
            email: email.trim(),
            otp: &otp,
            option: RESET_PASSWORD_OPTION,
        })?;
        let response = self.gateway.send_public(&request).await?;

        let envelope: AuthEnvelope<ResetOtpData> = response.json()?;
        let Some(access) = envelope.data.and_then(|d| d.access) else {
            return Err(ClientError::Rejected(
                envelope.message.unwrap_or_else(|| "Invalid OTP.".to_string()),
            ));
        };

        Ok(ResetGrant { access })
    }

    /// Set a new password using a reset grant.
    pub async fn reset_password(&self, grant: &ResetGrant, form: ResetPasswordForm) -> Result<()> {
        form.validate()?;

        let request = ApiRequest::post("/api/auth/reset_password/").json(&ResetPasswordRequest {
            new_password: &form.new_password,
        })?;
        self.gateway.send_with_token(&request, &grant.access).await?;

        tracing::info!("Password reset");
        Ok(())
    }

    // ─── Session ─────────────────────────────────────────────────────────────

    /// Check the stored credentials against the backend (refreshing if needed).
    pub async fn check_session(&self) -> Result<SessionState> {
        if self.gateway.session().credentials().is_none() {
            return Ok(SessionState::Anonymous);
        }

        let request = ApiRequest::post("/api/auth/is_auth/").json(&serde_json::json!({}))?;
        match self.gateway.execute(&request).await {
            Ok(_) => Ok(SessionState::Authenticated),
            Err(e) if e.is_session_expired() || e.is_unauthorized() => Ok(SessionState::Expired),
            Err(e) => Err(e),
        }
    }

    pub fn logout(&self) -> Result<()> {
        self.gateway.session().clear()?;
        tracing::info!("Logged out");
        Ok(())
    }
}

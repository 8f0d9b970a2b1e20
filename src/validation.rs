// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Form validation run before anything is sent to the backend.

use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{ClientError, Result};

pub const OTP_LEN: usize = 6;

/// New-account form.
#[derive(Debug, Clone, Validate)]
#[validate(schema(function = "username_differs_from_email"))]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long."))]
    pub password: String,
    #[validate(must_match(
        other = "password",
        message = "Password and Confirm Password do not match."
    ))]
    pub confirm_password: String,
}

/// Change password form for a logged-in user.
#[derive(Debug, Clone, Validate)]
pub struct ChangePasswordForm {
    #[validate(custom(function = "old_password_present"))]
    pub old_password: String,
    #[validate(length(min = 8, message = "New password must be at least 8 characters"))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

/// New password chosen after a verified reset OTP.
#[derive(Debug, Clone, Validate)]
pub struct ResetPasswordForm {
    #[validate(length(min = 8, message = "Password must be at least 8 characters long."))]
    pub new_password: String,
    #[validate(must_match(other = "new_password", message = "Passwords don't match!"))]
    pub confirm_password: String,
}

/// Letters, digits and `@ . + - _` only.
fn validate_username(username: &str) -> std::result::Result<(), ValidationError> {
    let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
    if username.is_empty() || !username.chars().all(allowed) {
        return Err(ValidationError::new("username_chars").with_message(Cow::Borrowed(
            "Username may contain only letters, numbers, and @/./+/-/_ characters.",
        )));
    }
    Ok(())
}

fn username_differs_from_email(form: &RegistrationForm) -> std::result::Result<(), ValidationError> {
    let local_part = form.email.split('@').next().unwrap_or_default();
    if form.username == local_part {
        return Err(
            ValidationError::new("username_is_email").with_message(Cow::Borrowed(
                "Username cannot be the same as the part of your email before the @ sign.",
            )),
        );
    }
    Ok(())
}

fn old_password_present(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("Old password is required")));
    }
    Ok(())
}

/// Reject empty or whitespace-only input.
pub fn require_non_blank<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(format!("{} is required", what)));
    }
    Ok(trimmed)
}

/// Reject blank message content, returning it untouched.
///
/// Leading indentation and trailing newlines are part of markdown and
/// code, so only the emptiness check looks at the trimmed text.
pub fn require_content<'a>(value: &'a str, what: &str) -> Result<&'a str> {
    require_non_blank(value, what)?;
    Ok(value)
}

/// Normalize an OTP: exactly six ASCII digits, surrounding whitespace ignored.
pub fn check_otp(otp: &str) -> Result<String> {
    let otp = otp.trim();
    if otp.len() != OTP_LEN || !otp.chars().all(|c| c.is_ascii_digit()) {
        return Err(ClientError::Validation(
            "Please enter the 6-digit OTP.".to_string(),
        ));
    }
    Ok(otp.to_string())
}

/// Flatten validator errors into one notification line, fields in name order.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<(String, Vec<String>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let field = field.to_string();
            let messages = errs
                .iter()
                .map(|e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{} is invalid", field),
                })
                .collect();
            (field, messages)
        })
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(_, messages)| messages)
        .collect::<Vec<_>>()
        .join(" ")
}

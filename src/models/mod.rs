// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Wire and view models for the PSA backend.

pub mod account;
pub mod auth;
pub mod chat;
pub mod insights;

pub use account::{Platform, ProblemSolvingAccount, VerificationChallenge, VerificationStatus};
pub use auth::{AuthTokens, ResetGrant, UserProfile};
pub use chat::{Chat, ChatMessage, ConversationMessage, MessageContent, Role};
pub use insights::{ContestProgress, OjInsights};

use serde::Deserialize;

/// List endpoints answer either with a bare array or with `{"data": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListPayload<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(default = "Vec::new")]
        data: Vec<T>,
    },
}

impl<T> ListPayload<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListPayload::Bare(items) | ListPayload::Wrapped { data: items } => items,
        }
    }
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

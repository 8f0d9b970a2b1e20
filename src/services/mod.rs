// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - one service per backend area, all sharing a [`Gateway`].
//!
//! [`Gateway`]: crate::gateway::Gateway

pub mod accounts;
pub mod auth;
pub mod chat;
pub mod chat_list;
pub mod conversation;
pub mod insights;

pub use accounts::AccountService;
pub use auth::{AuthService, PendingRegistration, SessionState};
pub use chat::ChatService;
pub use chat_list::{categorize_chats, Bucket, ChatBuckets};
pub use conversation::{Conversation, PendingTurn};
pub use insights::InsightsService;

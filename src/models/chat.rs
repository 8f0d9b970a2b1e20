// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chat summary as listed by the history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    #[serde(alias = "chat_id")]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    /// When the chat was last opened; chats without one are never bucketed
    #[serde(default)]
    pub last_open: Option<DateTime<Utc>>,
}

/// Message as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub markdown_content: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatMessagesResponse {
    #[serde(default)]
    pub data: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewChatResponse {
    #[serde(default)]
    pub chat_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TitleRequest<'a> {
    pub title: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PromptRequest<'a> {
    pub prompt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptResponse {
    pub response: String,
}

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Role of the message at `index` in server history, which strictly
    /// alternates starting with the user.
    pub fn for_history_index(index: usize) -> Self {
        if index % 2 == 0 {
            Role::User
        } else {
            Role::Assistant
        }
    }
}

/// Body of a message in an open conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text(String),
    /// Placeholder for an in-flight reply, tagged with its turn id.
    Pending(u64),
}

/// Message with an explicit author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ConversationMessage {
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.content, MessageContent::Pending(_))
    }

    /// Text of the message, `None` while pending.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(text) => Some(text),
            MessageContent::Pending(_) => None,
        }
    }
}

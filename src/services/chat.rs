// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat endpoints.

use chrono::{DateTime, TimeZone};
use futures_util::future::try_join_all;
use std::sync::Arc;

use crate::error::Result;
use crate::gateway::{ApiRequest, Gateway};
use crate::models::chat::{
    ChatMessagesResponse, NewChatResponse, PromptRequest, PromptResponse, TitleRequest,
};
use crate::models::{Chat, ListPayload, MessageResponse};
use crate::services::chat_list::{categorize_chats, ChatBuckets};
use crate::services::conversation::Conversation;
use crate::validation::{require_content, require_non_blank};

/// Title given to chats created without one.
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Chat operations for the logged-in user.
#[derive(Clone)]
pub struct ChatService {
    gateway: Arc<Gateway>,
}

impl ChatService {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// List all chats.
    pub async fn history(&self) -> Result<Vec<Chat>> {
        let payload: ListPayload<Chat> = self
            .gateway
            .execute_json(&ApiRequest::get("/api/chat/history/"))
            .await?;
        Ok(payload.into_vec())
    }

    /// Fetch the history and group it relative to `now`.
    pub async fn categorized<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<ChatBuckets> {
        let chats = self.history().await?;
        Ok(categorize_chats(&chats, now))
    }

    /// Create a chat; returns its id when the backend reports one.
    pub async fn create(&self, title: Option<&str>) -> Result<Option<i64>> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CHAT_TITLE);

        let request = ApiRequest::post("/api/chat/create/").json(&TitleRequest { title })?;
        let created: NewChatResponse = self.gateway.execute_json(&request).await?;

        tracing::info!(chat_id = ?created.chat_id, "Chat created");
        Ok(created.chat_id)
    }

    /// Load a chat's messages.
    pub async fn open(&self, chat_id: i64) -> Result<Conversation> {
        let response: ChatMessagesResponse = self
            .gateway
            .execute_json(&ApiRequest::get(chat_path(chat_id)))
            .await?;
        Ok(Conversation::from_history(chat_id, response.data))
    }

    pub async fn rename(&self, chat_id: i64, title: &str) -> Result<()> {
        let title = require_non_blank(title, "Title")?;
        let request = ApiRequest::put(chat_path(chat_id)).json(&TitleRequest { title })?;
        self.gateway.execute(&request).await?;
        Ok(())
    }

    /// Delete one chat; returns the backend's confirmation text.
    pub async fn delete(&self, chat_id: i64) -> Result<String> {
        let response = self
            .gateway
            .execute(&ApiRequest::delete(chat_path(chat_id)))
            .await?;
        tracing::info!(chat_id, "Chat deleted");
        Ok(ack_message(&response.body, "Chat deleted successfully."))
    }

    /// Delete every chat of the user.
    pub async fn delete_all(&self) -> Result<String> {
        let response = self
            .gateway
            .execute(&ApiRequest::delete("/api/chat/delete_all/"))
            .await?;
        tracing::info!("All chats deleted");
        Ok(ack_message(&response.body, "All chats deleted successfully."))
    }

    /// Delete the given chats concurrently; fails if any delete fails.
    pub async fn delete_many(&self, chat_ids: &[i64]) -> Result<()> {
        if chat_ids.is_empty() {
            return Ok(());
        }
        try_join_all(chat_ids.iter().map(|&id| self.delete(id))).await?;
        Ok(())
    }

    /// Send a prompt and return the assistant's reply.
    pub async fn send_prompt(&self, chat_id: i64, prompt: &str) -> Result<String> {
        let prompt = require_content(prompt, "Message")?;
        let request = ApiRequest::post(format!("/api/chat/send_prompt/{}/", chat_id))
            .json(&PromptRequest { prompt })?;
        let reply: PromptResponse = self.gateway.execute_json(&request).await?;
        Ok(reply.response)
    }
}

fn chat_path(chat_id: i64) -> String {
    format!("/api/chat/chat/{}/", chat_id)
}

/// `message` from an acknowledgement body, or `fallback`.
fn ack_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<MessageResponse>(body)
        .ok()
        .and_then(|ack| ack.message)
        .unwrap_or_else(|| fallback.to_string())
}

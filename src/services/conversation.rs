// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Open chat with optimistic message sending.
//!
//! A send appends the user's message and an assistant placeholder right
//! away, then swaps the placeholder for the reply (or drops it on failure).

use crate::error::Result;
use crate::models::chat::{ChatMessage, ConversationMessage, MessageContent, Role};
use crate::services::chat::ChatService;
use crate::validation::require_content;

/// Handle for a reply that has not arrived yet.
#[derive(Debug)]
#[must_use = "a pending turn must be completed or its placeholder stays forever"]
pub struct PendingTurn {
    id: u64,
    prompt: String,
}

impl PendingTurn {
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Messages of one chat, each tagged with its author.
#[derive(Debug, Clone)]
pub struct Conversation {
    chat_id: i64,
    messages: Vec<ConversationMessage>,
    next_turn: u64,
}

impl Conversation {
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id,
            messages: Vec::new(),
            next_turn: 0,
        }
    }

    /// Build from server history, which alternates user and assistant.
    pub fn from_history(chat_id: i64, history: Vec<ChatMessage>) -> Self {
        let messages = history
            .into_iter()
            .enumerate()
            .map(|(idx, msg)| ConversationMessage::text(Role::for_history_index(idx), msg.markdown_content))
            .collect();
        Self {
            chat_id,
            messages,
            next_turn: 0,
        }
    }

    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn has_pending(&self) -> bool {
        self.messages.iter().any(ConversationMessage::is_pending)
    }

    /// Append the user's message and a reply placeholder.
    pub fn begin_send(&mut self, prompt: &str) -> Result<PendingTurn> {
        let prompt = require_content(prompt, "Message")?;

        let id = self.next_turn;
        self.next_turn += 1;

        self.messages.push(ConversationMessage::text(Role::User, prompt));
        self.messages.push(ConversationMessage {
            role: Role::Assistant,
            content: MessageContent::Pending(id),
        });

        Ok(PendingTurn {
            id,
            prompt: prompt.to_string(),
        })
    }

    /// Resolve a turn's placeholder with the backend's reply.
    ///
    /// On error the placeholder is removed (the user's message stays) and
    /// the error is handed back.
    pub fn complete(&mut self, turn: PendingTurn, reply: Result<String>) -> Result<()> {
        let slot = self
            .messages
            .iter()
            .position(|m| m.content == MessageContent::Pending(turn.id));

        match (reply, slot) {
            (Ok(text), Some(idx)) => {
                self.messages[idx].content = MessageContent::Text(text);
                Ok(())
            }
            (Ok(text), None) => {
                tracing::warn!(chat_id = self.chat_id, turn = turn.id, "Placeholder missing, appending reply");
                self.messages.push(ConversationMessage::text(Role::Assistant, text));
                Ok(())
            }
            (Err(err), slot) => {
                if let Some(idx) = slot {
                    self.messages.remove(idx);
                }
                Err(err)
            }
        }
    }

    /// Send a prompt and wait for the reply.
    pub async fn send(&mut self, chats: &ChatService, prompt: &str) -> Result<()> {
        let turn = self.begin_send(prompt)?;
        let reply = chats.send_prompt(self.chat_id, turn.prompt()).await;
        self.complete(turn, reply)
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Groups the chat history into sidebar buckets.

use chrono::{DateTime, TimeZone};
use std::cmp::Reverse;

use crate::models::Chat;
use crate::time_utils::calendar_days_between;

/// Oldest calendar-day difference still listed.
const PREVIOUS_DAYS_LIMIT: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Today,
    Yesterday,
    Previous30Days,
}

impl Bucket {
    pub fn label(self) -> &'static str {
        match self {
            Bucket::Today => "Today",
            Bucket::Yesterday => "Yesterday",
            Bucket::Previous30Days => "Previous 30 days",
        }
    }
}

/// Chats per bucket, each sorted oldest first with ties by descending id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatBuckets {
    pub today: Vec<Chat>,
    pub yesterday: Vec<Chat>,
    pub previous_30_days: Vec<Chat>,
}

impl ChatBuckets {
    /// Non-empty buckets in display order.
    pub fn sections(&self) -> Vec<(Bucket, &[Chat])> {
        [
            (Bucket::Today, self.today.as_slice()),
            (Bucket::Yesterday, self.yesterday.as_slice()),
            (Bucket::Previous30Days, self.previous_30_days.as_slice()),
        ]
        .into_iter()
        .filter(|(_, chats)| !chats.is_empty())
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.yesterday.is_empty() && self.previous_30_days.is_empty()
    }
}

/// Bucket for a chat last opened at `last_open`, if any.
pub fn bucket_for<Tz: TimeZone>(last_open: DateTime<chrono::Utc>, now: &DateTime<Tz>) -> Option<Bucket> {
    match calendar_days_between(last_open, now) {
        0 => Some(Bucket::Today),
        1 => Some(Bucket::Yesterday),
        2..=PREVIOUS_DAYS_LIMIT => Some(Bucket::Previous30Days),
        _ => None,
    }
}

/// Partition `chats` into buckets relative to `now`.
///
/// Chats without `last_open`, older than 30 days or dated in the future
/// are left out.
pub fn categorize_chats<Tz: TimeZone>(chats: &[Chat], now: &DateTime<Tz>) -> ChatBuckets {
    let mut buckets = ChatBuckets::default();

    for chat in chats {
        let Some(last_open) = chat.last_open else {
            continue;
        };
        match bucket_for(last_open, now) {
            Some(Bucket::Today) => buckets.today.push(chat.clone()),
            Some(Bucket::Yesterday) => buckets.yesterday.push(chat.clone()),
            Some(Bucket::Previous30Days) => buckets.previous_30_days.push(chat.clone()),
            None => {}
        }
    }

    for bucket in [
        &mut buckets.today,
        &mut buckets.yesterday,
        &mut buckets.previous_30_days,
    ] {
        bucket.sort_by_key(|chat| (chat.last_open, Reverse(chat.id)));
    }

    buckets
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Whole calendar days from `then` to `now`, both read in `now`'s time zone.
///
/// Negative when `then` lies on a later date than `now`.
pub fn calendar_days_between<Tz: TimeZone>(then: DateTime<Utc>, now: &DateTime<Tz>) -> i64 {
    let tz = now.timezone();
    let then_date = then.with_timezone(&tz).date_naive();
    let now_date = now.date_naive();
    (now_date - then_date).num_days()
}

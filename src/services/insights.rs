// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Online-judge insights.

use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::gateway::{ApiRequest, Gateway};
use crate::models::OjInsights;

#[derive(Deserialize)]
#[serde(untagged)]
enum InsightsPayload {
    Wrapped { data: OjInsights },
    Bare(OjInsights),
}

#[derive(Clone)]
pub struct InsightsService {
    gateway: Arc<Gateway>,
}

impl InsightsService {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    /// Codeforces statistics for the linked handle.
    pub async fn codeforces(&self) -> Result<OjInsights> {
        let payload: InsightsPayload = self
            .gateway
            .execute_json(&ApiRequest::get("/api/profile/oj_insights/cf/"))
            .await?;
        Ok(match payload {
            InsightsPayload::Wrapped { data } => data,
            InsightsPayload::Bare(insights) => insights,
        })
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Online-judge insights aggregated by the backend.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Codeforces solve statistics for the logged-in user.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OjInsights {
    #[serde(default)]
    pub handle: Option<String>,
    /// Solved problems per rating level ("800", "1200", ...)
    #[serde(default)]
    pub solved_by_level: BTreeMap<String, u32>,
    /// Solved problems per tag ("dp", "greedy", ...)
    #[serde(default)]
    pub solved_by_tag: BTreeMap<String, u32>,
    /// Per-contest-series progress
    #[serde(default)]
    pub contests: Vec<ContestProgress>,
}

/// Solved counts per problem index for one contest series.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContestProgress {
    pub name: String,
    #[serde(default)]
    pub solved_by_problem: BTreeMap<String, u32>,
}

impl OjInsights {
    /// Total solved problems, counted once per problem via its level.
    pub fn total_solved(&self) -> u32 {
        self.solved_by_level.values().sum()
    }

    /// The `n` most solved tags, ties ordered by name.
    pub fn top_tags(&self, n: usize) -> Vec<(&str, u32)> {
        let mut tags: Vec<(&str, u32)> = self
            .solved_by_tag
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|(tag, &count)| (tag.as_str(), count))
            .collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tags.truncate(n);
        tags
    }
}

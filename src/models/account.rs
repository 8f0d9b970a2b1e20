// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Problem-solving platform accounts (Codeforces / AtCoder handles).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Online judge a handle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "codeforces", alias = "cf", alias = "Codeforces")]
    Codeforces,
    #[serde(rename = "atcoder", alias = "AtCoder")]
    AtCoder,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Codeforces => "codeforces",
            Platform::AtCoder => "atcoder",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Codeforces => f.write_str("Codeforces"),
            Platform::AtCoder => f.write_str("AtCoder"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "codeforces" | "cf" => Ok(Platform::Codeforces),
            "atcoder" | "ac" => Ok(Platform::AtCoder),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

/// Ownership verification state of a handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    #[default]
    #[serde(rename = "unverified", alias = "Unverified", alias = "pending")]
    Unverified,
    #[serde(
        rename = "verified",
        alias = "Verified",
        alias = "approved",
        alias = "Approved"
    )]
    Verified,
}

/// Handle registered on the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemSolvingAccount {
    pub id: i64,
    pub platform: Platform,
    pub handle: String,
    #[serde(default)]
    pub status: VerificationStatus,
}

impl ProblemSolvingAccount {
    pub fn is_verified(&self) -> bool {
        self.status == VerificationStatus::Verified
    }
}

#[derive(Debug, Serialize)]
pub struct AddHandleRequest<'a> {
    pub platform: Platform,
    pub handle: &'a str,
}

/// First step of handle verification.
///
/// The user must submit a solution that fails to compile to
/// `problem_url` from the claimed account, then confirm.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerificationChallenge {
    #[serde(alias = "problem_link", alias = "link")]
    pub problem_url: String,
    #[serde(default)]
    pub message: Option<String>,
}

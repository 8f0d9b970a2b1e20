// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Problem-solving account handles and their verification.
//!
//! Verification is a challenge-response run by the backend:
//! 1. `start_verification` returns a problem link
//! 2. the user submits a compilation error to it from the claimed account
//! 3. `confirm_verification` asks the backend to check the submission

use std::sync::Arc;

use crate::error::Result;
use crate::gateway::{ApiRequest, Gateway};
use crate::models::account::AddHandleRequest;
use crate::models::{ListPayload, Platform, ProblemSolvingAccount, VerificationChallenge};
use crate::session::SessionKey;
use crate::validation::require_non_blank;

#[derive(Clone)]
pub struct AccountService {
    gateway: Arc<Gateway>,
}

impl AccountService {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<ProblemSolvingAccount>> {
        let payload: ListPayload<ProblemSolvingAccount> = self
            .gateway
            .execute_json(&ApiRequest::get("/api/user/problem_solving_accounts/"))
            .await?;
        Ok(payload.into_vec())
    }

    /// Register a handle and mirror it into the session profile.
    pub async fn add_handle(&self, platform: Platform, handle: &str) -> Result<ProblemSolvingAccount> {
        let handle = require_non_blank(handle, "Handle")?;
        let request =
            ApiRequest::post("/api/user/add_handle/").json(&AddHandleRequest { platform, handle })?;
        let account: ProblemSolvingAccount = self.gateway.execute_json(&request).await?;

        self.gateway
            .session()
            .set(SessionKey::handle_for(account.platform), account.handle.clone())?;

        tracing::info!(
            account_id = account.id,
            platform = %account.platform,
            "Handle added"
        );
        Ok(account)
    }

    /// Fetch the problem the user must submit a compilation error to.
    pub async fn start_verification(&self, account_id: i64) -> Result<VerificationChallenge> {
        self.gateway
            .execute_json(&ApiRequest::get(verify_path(account_id)))
            .await
    }

    /// Ask the backend to check the submission; returns the updated account.
    pub async fn confirm_verification(&self, account_id: i64) -> Result<ProblemSolvingAccount> {
        let account: ProblemSolvingAccount = self
            .gateway
            .execute_json(&ApiRequest::post(verify_path(account_id)))
            .await?;
        tracing::info!(account_id, verified = account.is_verified(), "Verification checked");
        Ok(account)
    }

    /// Delete a handle; clears the session mirror if it pointed at it.
    pub async fn remove(&self, account: &ProblemSolvingAccount) -> Result<()> {
        self.gateway
            .execute(&ApiRequest::delete(format!(
                "/api/user/problem_solving_account/{}/",
                account.id
            )))
            .await?;

        let session = self.gateway.session();
        let key = SessionKey::handle_for(account.platform);
        if session.get(key).as_deref() == Some(account.handle.as_str()) {
            session.remove(key)?;
        }

        tracing::info!(account_id = account.id, "Handle removed");
        Ok(())
    }
}

fn verify_path(account_id: i64) -> String {
    format!("/api/user/verify_handle/{}/", account_id)
}

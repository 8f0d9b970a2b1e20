// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! PSA client: talks to the Problem Solving Assistant backend.
//!
//! This crate provides the authenticated request gateway, the session
//! store, and services for auth, chats, problem-solving accounts and
//! online-judge insights.

pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod services;
pub mod session;
pub mod time_utils;
pub mod validation;

use std::sync::Arc;

use config::Config;
use error::Result;
use gateway::Gateway;
use services::{AccountService, AuthService, ChatService, InsightsService};
use session::SessionStore;

/// Shared client state.
pub struct PsaClient {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub gateway: Arc<Gateway>,
    pub auth: AuthService,
    pub chats: ChatService,
    pub accounts: AccountService,
    pub insights: InsightsService,
}

impl PsaClient {
    /// Build a client over an existing session.
    pub fn new(config: Config, session: Arc<SessionStore>) -> Result<Self> {
        let gateway = Arc::new(Gateway::new(&config, session.clone())?);
        Ok(Self::with_gateway(config, gateway))
    }

    /// Build a client whose session lives in `config.session_file`.
    pub fn from_config(config: Config) -> Result<Self> {
        let session = Arc::new(SessionStore::open(&config.session_file)?);
        Self::new(config, session)
    }

    /// Build a client around a prepared gateway.
    pub fn with_gateway(config: Config, gateway: Arc<Gateway>) -> Self {
        Self {
            session: gateway.session().clone(),
            auth: AuthService::new(gateway.clone(), &config),
            chats: ChatService::new(gateway.clone()),
            accounts: AccountService::new(gateway.clone()),
            insights: InsightsService::new(gateway.clone()),
            gateway,
            config,
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client session: credentials and denormalized profile fields.
//!
//! Every read and write of persisted client state goes through
//! [`SessionStore`]. The store is shared (`Arc`) between the gateway and
//! the services; mutations are written through to an optional JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dashmap::DashMap;

use crate::error::{ClientError, Result};
use crate::models::auth::{AuthTokens, UserProfile};
use crate::models::account::Platform;

/// Fixed storage keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    AccessToken,
    RefreshToken,
    Username,
    Email,
    FirstName,
    LastName,
    CodeforcesHandle,
    AtCoderHandle,
}

impl SessionKey {
    pub const ALL: [SessionKey; 8] = [
        SessionKey::AccessToken,
        SessionKey::RefreshToken,
        SessionKey::Username,
        SessionKey::Email,
        SessionKey::FirstName,
        SessionKey::LastName,
        SessionKey::CodeforcesHandle,
        SessionKey::AtCoderHandle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKey::AccessToken => "access_token",
            SessionKey::RefreshToken => "refresh_token",
            SessionKey::Username => "username",
            SessionKey::Email => "email",
            SessionKey::FirstName => "first_name",
            SessionKey::LastName => "last_name",
            SessionKey::CodeforcesHandle => "cf_handle",
            SessionKey::AtCoderHandle => "atcoder_handle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Key holding the mirrored handle for a platform.
    pub fn handle_for(platform: Platform) -> Self {
        match platform {
            Platform::Codeforces => SessionKey::CodeforcesHandle,
            Platform::AtCoder => SessionKey::AtCoderHandle,
        }
    }
}

/// Access + refresh credential pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialPair {
    pub access: String,
    pub refresh: String,
}

/// Profile fields cached alongside the credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionProfile {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub codeforces_handle: Option<String>,
    pub atcoder_handle: Option<String>,
}

/// Session state shared by the gateway and services.
pub struct SessionStore {
    values: DashMap<SessionKey, String>,
    path: Option<PathBuf>,
    /// Serializes file writes so snapshots land in order.
    write_lock: Mutex<()>,
}

impl SessionStore {
    /// Session kept in memory only.
    pub fn in_memory() -> Self {
        Self {
            values: DashMap::new(),
            path: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Open a file-backed session, loading existing values if the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = DashMap::new();

        if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| ClientError::Storage(format!("{}: {}", path.display(), e)))?;
            let stored: BTreeMap<String, String> = serde_json::from_str(&raw)
                .map_err(|e| ClientError::Storage(format!("{}: {}", path.display(), e)))?;
            for (name, value) in stored {
                match SessionKey::from_name(&name) {
                    Some(key) => {
                        values.insert(key, value);
                    }
                    None => tracing::debug!(key = %name, "Ignoring unknown session key"),
                }
            }
            tracing::debug!(path = %path.display(), entries = values.len(), "Session loaded");
        }

        Ok(Self {
            values,
            path: Some(path),
            write_lock: Mutex::new(()),
        })
    }

    pub fn get(&self, key: SessionKey) -> Option<String> {
        self.values.get(&key).map(|v| v.value().clone())
    }

    pub fn set(&self, key: SessionKey, value: impl Into<String>) -> Result<()> {
        self.values.insert(key, value.into());
        self.persist()
    }

    pub fn remove(&self, key: SessionKey) -> Result<()> {
        self.values.remove(&key);
        self.persist()
    }

    /// Drop every stored value (logout or dead refresh credential).
    pub fn clear(&self) -> Result<()> {
        self.values.clear();
        self.persist()
    }

    pub fn access_token(&self) -> Option<String> {
        self.get(SessionKey::AccessToken)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.get(SessionKey::RefreshToken)
    }

    /// Both credentials, if the session holds a complete pair.
    pub fn credentials(&self) -> Option<CredentialPair> {
        Some(CredentialPair {
            access: self.access_token()?,
            refresh: self.refresh_token()?,
        })
    }

    /// Rewrite the access credential after a refresh.
    ///
    /// A rotated refresh credential replaces the stored one.
    pub fn update_access(&self, access: &str, rotated_refresh: Option<&str>) -> Result<()> {
        self.values.insert(SessionKey::AccessToken, access.to_string());
        if let Some(refresh) = rotated_refresh {
            self.values
                .insert(SessionKey::RefreshToken, refresh.to_string());
        }
        self.persist()
    }

    /// Replace the session with a fresh login.
    pub fn store_login(&self, tokens: &AuthTokens) -> Result<()> {
        self.values.clear();
        self.values
            .insert(SessionKey::AccessToken, tokens.access.clone());
        self.values
            .insert(SessionKey::RefreshToken, tokens.refresh.clone());
        if let Some(user) = &tokens.user {
            self.store_user_fields(user);
        }
        self.persist()
    }

    fn store_user_fields(&self, user: &UserProfile) {
        let fields = [
            (SessionKey::Username, &user.username),
            (SessionKey::Email, &user.email),
            (SessionKey::FirstName, &user.first_name),
            (SessionKey::LastName, &user.last_name),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                self.values.insert(key, value.clone());
            }
        }
    }

    pub fn profile(&self) -> SessionProfile {
        SessionProfile {
            username: self.get(SessionKey::Username),
            email: self.get(SessionKey::Email),
            first_name: self.get(SessionKey::FirstName),
            last_name: self.get(SessionKey::LastName),
            codeforces_handle: self.get(SessionKey::CodeforcesHandle),
            atcoder_handle: self.get(SessionKey::AtCoderHandle),
        }
    }

    /// Write the current snapshot to disk (no-op for in-memory sessions).
    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ClientError::Storage("session write lock poisoned".to_string()))?;

        let snapshot: BTreeMap<&'static str, String> = self
            .values
            .iter()
            .map(|entry| (entry.key().as_str(), entry.value().clone()))
            .collect();

        let json = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| ClientError::Storage(e.to_string()))?;

        // Write to a sibling file and rename so a crash never leaves half a session.
        let tmp = path.with_extension("json.tmp");
        write_private(&tmp, json.as_bytes())
            .and_then(|_| std::fs::rename(&tmp, path))
            .map_err(|e| ClientError::Storage(format!("{}: {}", path.display(), e)))
    }
}

/// Write `contents` to a fresh file readable only by its owner.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    // Mode applies only on creation, so a leftover file must not be reused.
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

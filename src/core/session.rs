// src/core/session.rs
//! Bearer-token session shared by every API call

use anyhow::Result;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info, warn};

use crate::core::FsOps;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub credits: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

/// Read the `exp` claim of a JWT without verifying it. The server is the
/// authority on validity; this only lets the client refresh ahead of time.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    DateTime::from_timestamp(data.claims.exp?, 0)
}

impl Session {
    pub fn new(access_token: String, refresh_token: Option<String>) -> Self {
        Self {
            access_token,
            refresh_token,
            user: None,
        }
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = Some(user);
        self
    }

    /// True when the access token carries an `exp` that falls inside `window`
    pub fn expires_within(&self, window: chrono::Duration) -> bool {
        token_expiry(&self.access_token)
            .map(|exp| exp - Utc::now() <= window)
            .unwrap_or(false)
    }
}

/// Holds the current session, optionally mirrored to a JSON file
#[derive(Debug, Default)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    pub fn in_memory(session: Option<Session>) -> Self {
        Self {
            current: RwLock::new(session),
            path: None,
        }
    }

    /// Open a file-backed store, reading any session already saved there
    pub async fn open(path: &Path) -> Result<Self> {
        let session = if FsOps::file_exists(path).await {
            let content = FsOps::read_file_safe(path).await?;
            match serde_json::from_str::<Session>(&content) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                    None
                }
            }
        } else {
            None
        };

        debug!(
            "Opened session store at {} (signed in: {})",
            path.display(),
            session.is_some()
        );

        Ok(Self {
            current: RwLock::new(session),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.current().map(|s| s.access_token)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.current().and_then(|s| s.refresh_token)
    }

    pub fn is_signed_in(&self) -> bool {
        self.current().is_some()
    }

    pub async fn set(&self, session: Session) -> Result<()> {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session);
        self.persist().await
    }

    /// Replace tokens after a refresh; the refresh token is kept when the server omits it
    pub async fn update_tokens(&self, access_token: String, refresh_token: Option<String>) -> Result<()> {
        {
            let mut guard = self
                .current
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            match guard.as_mut() {
                Some(session) => {
                    session.access_token = access_token;
                    if refresh_token.is_some() {
                        session.refresh_token = refresh_token;
                    }
                }
                None => *guard = Some(Session::new(access_token, refresh_token)),
            }
        }
        self.persist().await
    }

    pub async fn set_user(&self, user: UserProfile) -> Result<()> {
        {
            let mut guard = self
                .current
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(session) = guard.as_mut() {
                session.user = Some(user);
            }
        }
        self.persist().await
    }

    /// Discard the session in memory and on disk
    pub async fn clear(&self) -> Result<()> {
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;

        if let Some(path) = &self.path {
            FsOps::remove_file(path).await?;
            info!("Session discarded");
        }
        Ok(())
    }

    async fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        match self.current() {
            Some(session) => {
                let content = serde_json::to_string_pretty(&session)?;
                FsOps::write_file_safe(path, &content).await
            }
            None => FsOps::remove_file(path).await,
        }
    }
}

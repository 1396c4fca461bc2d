// src/auth.rs
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::{ApiClient, Session, UserProfile};
use crate::notify::Notifier;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ForgotPasswordRequest<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct ResetPasswordRequest<'a> {
    token: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<UserProfile>,
}

const MIN_PASSWORD_LEN: usize = 8;

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if !email.contains('@') || email.trim().len() < 3 {
        anyhow::bail!("Enter a valid email address");
    }
    if password.len() < MIN_PASSWORD_LEN {
        anyhow::bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
    }
    Ok(())
}

pub struct AuthService {
    client: Arc<ApiClient>,
    notifier: Arc<Notifier>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>, notifier: Arc<Notifier>) -> Self {
        Self { client, notifier }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let result = self.login_inner(email.trim(), password).await;
        let session = self.notifier.report("Sign in failed", result)?;
        self.notifier.success("Signed in");
        Ok(session)
    }

    async fn login_inner(&self, email: &str, password: &str) -> Result<Session> {
        validate_credentials(email, password)?;
        let response: AuthResponse = self
            .client
            .post_public("/auth/login", &LoginRequest { email, password })
            .await?;
        self.establish(response).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Session> {
        let result = self.register_inner(name.trim(), email.trim(), password).await;
        let session = self.notifier.report("Sign up failed", result)?;
        self.notifier.success("Account created");
        Ok(session)
    }

    async fn register_inner(&self, name: &str, email: &str, password: &str) -> Result<Session> {
        if name.is_empty() {
            anyhow::bail!("Name is required");
        }
        validate_credentials(email, password)?;
        let response: AuthResponse = self
            .client
            .post_public(
                "/auth/register",
                &RegisterRequest {
                    name,
                    email,
                    password,
                },
            )
            .await?;
        self.establish(response).await
    }

    async fn establish(&self, response: AuthResponse) -> Result<Session> {
        let mut session = Session::new(response.access_token, response.refresh_token);
        session.user = response.user;
        self.client
            .session()
            .set(session.clone())
            .await
            .context("Failed to save session")?;
        info!(
            "Signed in as {}",
            session
                .user
                .as_ref()
                .map(|u| u.email.as_str())
                .unwrap_or("unknown user")
        );
        Ok(session)
    }

    /// Tell the server, then drop the local session no matter what it said
    pub async fn logout(&self) -> Result<()> {
        if self.client.session().is_signed_in() {
            if let Err(e) = self.client.post_empty::<serde_json::Value>("/auth/logout").await {
                warn!("Server logout failed, clearing local session anyway: {:#}", e);
            }
        }
        let result = self.client.session().clear().await;
        self.notifier.report("Failed to sign out", result)?;
        self.notifier.success("Signed out");
        Ok(())
    }

    /// Current user, refreshed from the server and cached in the session
    pub async fn me(&self) -> Result<UserProfile> {
        let result: Result<UserProfile> = self.client.get("/auth/me").await;
        let user = self.notifier.report("Failed to load profile", result)?;
        if let Err(e) = self.client.session().set_user(user.clone()).await {
            warn!("Failed to cache profile: {}", e);
        }
        Ok(user)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let email = email.trim();
        let result: Result<serde_json::Value> = self
            .client
            .post_public("/auth/forgot-password", &ForgotPasswordRequest { email })
            .await;
        self.notifier.report("Failed to request password reset", result)?;
        self.notifier
            .info(format!("If {} has an account, a reset link is on its way", email));
        Ok(())
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<()> {
        let result = self.reset_inner(token, password).await;
        self.notifier.report("Failed to reset password", result)?;
        self.notifier.success("Password updated, sign in with your new password");
        Ok(())
    }

    async fn reset_inner(&self, token: &str, password: &str) -> Result<()> {
        if password.len() < MIN_PASSWORD_LEN {
            anyhow::bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
        }
        let _: serde_json::Value = self
            .client
            .post_public("/auth/reset-password", &ResetPasswordRequest { token, password })
            .await?;
        Ok(())
    }

    /// Refresh ahead of expiry when the access token runs out within `window`
    pub async fn ensure_fresh(&self, window: chrono::Duration) -> Result<bool> {
        let Some(session) = self.client.session().current() else {
            return Ok(false);
        };
        if !session.expires_within(window) {
            return Ok(false);
        }
        info!("Access token expiring soon, refreshing");
        self.client.refresh().await?;
        Ok(true)
    }
}

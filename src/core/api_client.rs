// src/core/api_client.rs
//! Authenticated REST client - attaches the bearer token and refreshes once on 401

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, trace, warn};

use crate::config::ClientConfig;
use crate::core::errors::ApiError;
use crate::core::{FsOps, SessionStore};
use crate::routes::Route;

pub const REFRESH_ENDPOINT: &str = "/auth/refresh";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<R>(&self, endpoint: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.send(Method::GET, endpoint, None).await?;
        Self::decode(response)
            .await
            .with_context(|| format!("GET {} failed", endpoint))
    }

    pub async fn post_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(payload).context("Failed to serialize request body")?;
        let response = self.send(Method::POST, endpoint, Some(&body)).await?;
        Self::decode(response)
            .await
            .with_context(|| format!("POST {} failed", endpoint))
    }

    pub async fn post_empty<R>(&self, endpoint: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let response = self.send(Method::POST, endpoint, None).await?;
        Self::decode(response)
            .await
            .with_context(|| format!("POST {} failed", endpoint))
    }

    /// POST without the session's bearer token and without refresh, for the
    /// sign-in endpoints where a 401 means bad credentials
    pub async fn post_public<T, R>(&self, endpoint: &str, payload: &T) -> Result<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        trace!("-> {}", url);
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(ApiError::from)?;
        Self::decode(response)
            .await
            .with_context(|| format!("POST {} failed", endpoint))
    }

    /// Refresh the access token now instead of waiting for a 401
    pub async fn refresh(&self) -> Result<()> {
        let token = self.session.access_token();
        if token.is_none() {
            return Err(ApiError::Unauthorized.into());
        }
        self.refresh_session(token.as_deref()).await?;
        Ok(())
    }

    pub async fn patch_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(payload).context("Failed to serialize request body")?;
        let response = self.send(Method::PATCH, endpoint, Some(&body)).await?;
        Self::decode(response)
            .await
            .with_context(|| format!("PATCH {} failed", endpoint))
    }

    pub async fn put_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(payload).context("Failed to serialize request body")?;
        let response = self.send(Method::PUT, endpoint, Some(&body)).await?;
        Self::decode(response)
            .await
            .with_context(|| format!("PUT {} failed", endpoint))
    }

    pub async fn delete(&self, endpoint: &str) -> Result<()> {
        let response = self.send(Method::DELETE, endpoint, None).await?;
        Self::check(response)
            .await
            .map(|_| ())
            .with_context(|| format!("DELETE {} failed", endpoint))
    }

    /// Multipart upload of a PDF or DOCX file
    pub async fn upload_file<R>(&self, endpoint: &str, field: &str, file_path: &Path) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", file_path.display()))?
            .to_string();
        let content_type = get_content_type(&file_name)?;
        let file_content = FsOps::read_bytes(file_path).await?;

        debug!("Uploading {} ({} bytes) to {}", file_name, file_content.len(), endpoint);

        let response = self
            .send_with_refresh(endpoint, |client, url| {
                let part = Part::bytes(file_content.clone())
                    .file_name(file_name.clone())
                    .mime_str(content_type)?;
                Ok(client.post(url).multipart(Form::new().part(field.to_string(), part)))
            })
            .await?;

        Self::decode(response)
            .await
            .with_context(|| format!("Upload to {} failed", endpoint))
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, ApiError> {
        self.send_with_refresh(endpoint, |client, url| {
            let request = client.request(method.clone(), url);
            Ok(match body {
                Some(body) => request.json(body),
                None => request,
            })
        })
        .await
    }

    /// Send a request built by `build`. A 401 on an authenticated request
    /// triggers one token refresh and one replay of the request.
    async fn send_with_refresh<F>(&self, endpoint: &str, build: F) -> Result<Response, ApiError>
    where
        F: Fn(&reqwest::Client, &str) -> Result<RequestBuilder, ApiError>,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        let sent_token = self.session.access_token();

        trace!("-> {}", url);
        let response = self
            .authorize(build(&self.client, &url)?, sent_token.as_deref())
            .send()
            .await?;
        trace!("<- {} {}", response.status(), url);

        if response.status() != StatusCode::UNAUTHORIZED || sent_token.is_none() {
            return Ok(response);
        }

        warn!("{} returned 401, refreshing session", endpoint);
        self.refresh_session(sent_token.as_deref()).await?;

        let retry_token = self.session.access_token();
        let retried = self
            .authorize(build(&self.client, &url)?, retry_token.as_deref())
            .send()
            .await?;

        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!("{} still unauthorized after refresh", endpoint);
            return Err(self.expire_session().await);
        }

        Ok(retried)
    }

    fn authorize(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Exchange the refresh token for a new access token. Concurrent 401s
    /// share one refresh: if the token already changed, nothing is sent.
    async fn refresh_session(&self, stale_token: Option<&str>) -> Result<(), ApiError> {
        let _guard = self.refresh_lock.lock().await;

        if self.session.access_token().as_deref() != stale_token {
            debug!("Session already refreshed by a concurrent request");
            return Ok(());
        }

        let Some(refresh_token) = self.session.refresh_token() else {
            return Err(self.expire_session().await);
        };

        let url = format!("{}{}", self.base_url, REFRESH_ENDPOINT);
        let result = self
            .client
            .post(&url)
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await;

        let response = match result {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!("Token refresh rejected with status {}", response.status());
                return Err(self.expire_session().await);
            }
            Err(e) => {
                error!("Token refresh request failed: {}", e);
                return Err(self.expire_session().await);
            }
        };

        let refreshed: RefreshResponse = match response.json().await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                error!("Token refresh returned an unreadable body: {}", e);
                return Err(self.expire_session().await);
            }
        };

        if let Err(e) = self
            .session
            .update_tokens(refreshed.access_token, refreshed.refresh_token)
            .await
        {
            warn!("Failed to persist refreshed session: {}", e);
        }
        debug!("Session refreshed");
        Ok(())
    }

    async fn expire_session(&self) -> ApiError {
        if let Err(e) = self.session.clear().await {
            warn!("Failed to discard session: {}", e);
        }
        ApiError::SessionExpired {
            redirect: Route::SignIn,
        }
    }

    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!("API error response {}: {}", status, body);
        Err(ApiError::Status { status, body })
    }

    async fn decode<R>(response: Response) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let response = Self::check(response).await?;
        let text = response.text().await?;
        let text = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(text).map_err(|e| ApiError::Decode(format!("{}: {}", e, text)))
    }
}

/// Content type for resume uploads
pub fn get_content_type(file_name: &str) -> Result<&'static str> {
    let lower_name = file_name.to_lowercase();
    if lower_name.ends_with(".pdf") {
        Ok("application/pdf")
    } else if lower_name.ends_with(".docx") {
        Ok("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
    } else {
        anyhow::bail!("Unsupported file format: {}", file_name)
    }
}

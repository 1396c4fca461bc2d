// src/core/errors.rs
//! Typed failures for callers that need to branch on what went wrong

use reqwest::StatusCode;
use thiserror::Error;

use crate::routes::Route;

const INSUFFICIENT_CREDITS: &str = "insufficient credits";
const MONTHLY_LIMIT: &str = "monthly limit reached";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not signed in")]
    Unauthorized,

    #[error("Session expired, please sign in again")]
    SessionExpired { redirect: Route },

    #[error("HTTP {status} error: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Unauthorized | ApiError::SessionExpired { .. } => {
                Some(StatusCode::UNAUTHORIZED)
            }
            ApiError::Transport(e) => e.status(),
            ApiError::Decode(_) => None,
        }
    }

    /// Where the user should be sent because of this error, if anywhere
    pub fn redirect(&self) -> Option<Route> {
        match self {
            ApiError::SessionExpired { redirect } => Some(redirect.clone()),
            ApiError::Unauthorized => Some(Route::SignIn),
            ApiError::Status { status, body } => classify_failure(Some(*status), body),
            _ => None,
        }
    }

    /// Short message extracted from a JSON error body, falling back to the raw text
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { body, .. } => extract_message(body).unwrap_or_else(|| {
                if body.trim().is_empty() {
                    self.to_string()
                } else {
                    body.clone()
                }
            }),
            other => other.to_string(),
        }
    }
}

/// Map an error body to the page that resolves it. Quota errors are
/// signalled either by status or by message text, so both are checked.
pub fn classify_failure(status: Option<StatusCode>, body: &str) -> Option<Route> {
    let lower = body.to_lowercase();

    if lower.contains(INSUFFICIENT_CREDITS) || status == Some(StatusCode::PAYMENT_REQUIRED) {
        return Some(Route::Credits);
    }
    if lower.contains(MONTHLY_LIMIT) || status == Some(StatusCode::TOO_MANY_REQUESTS) {
        return Some(Route::Pricing);
    }
    if status == Some(StatusCode::UNAUTHORIZED) {
        return Some(Route::SignIn);
    }
    None
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error", "detail"]
        .iter()
        .find_map(|key| match value.get(*key) {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Object(inner)) => inner
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            _ => None,
        })
}

/// Find the typed failure inside an `anyhow` chain
pub fn api_error_of(err: &anyhow::Error) -> Option<&ApiError> {
    err.chain().find_map(|cause| cause.downcast_ref::<ApiError>())
}

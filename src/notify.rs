// src/notify.rs
//! Toast notifications surfaced to the user after each operation

use std::sync::Mutex;
use tracing::{error, info};

use crate::core::api_error_of;
use crate::routes::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
    pub redirect: Option<Route>,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
            redirect: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
            redirect: None,
        }
    }

    /// Error toast for a failed operation. API failures contribute their
    /// server message and any redirect (sign-in, credits, pricing).
    pub fn from_error(action: &str, err: &anyhow::Error) -> Self {
        let (detail, redirect) = match api_error_of(err) {
            Some(api_err) => (api_err.user_message(), api_err.redirect()),
            None => (format!("{:#}", err), None),
        };

        Self {
            level: ToastLevel::Error,
            message: format!("{}: {}", action, detail),
            redirect,
        }
    }
}

#[derive(Debug, Default)]
pub struct Notifier {
    queue: Mutex<Vec<Toast>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Error => error!("{}", toast.message),
            _ => info!("{}", toast.message),
        }
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(toast);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Toast::success(message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Toast::info(message));
    }

    pub fn error(&self, action: &str, err: &anyhow::Error) {
        self.push(Toast::from_error(action, err));
    }

    /// Pass `result` through, raising an error toast when it failed
    pub fn report<T>(&self, action: &str, result: anyhow::Result<T>) -> anyhow::Result<T> {
        if let Err(e) = &result {
            self.error(action, e);
        }
        result
    }

    /// Take every pending toast, oldest first
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(
            &mut *self
                .queue
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    pub fn last(&self) -> Option<Toast> {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .last()
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ApiError;
    use reqwest::StatusCode;

    #[test]
    fn test_drain_keeps_order_and_empties() {
        let notifier = Notifier::new();
        notifier.success("Saved");
        notifier.info("Generating");

        let toasts = notifier.drain();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].message, "Saved");
        assert_eq!(toasts[1].level, ToastLevel::Info);
        assert!(notifier.drain().is_empty());
    }

    #[test]
    fn test_error_toast_carries_redirect() {
        let err = anyhow::Error::new(ApiError::Status {
            status: StatusCode::FORBIDDEN,
            body: r#"{"message":"Monthly limit reached"}"#.to_string(),
        })
        .context("POST /resumes/generate failed");

        let toast = Toast::from_error("Failed to generate resume", &err);
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, "Failed to generate resume: Monthly limit reached");
        assert_eq!(toast.redirect, Some(Route::Pricing));
    }

    #[test]
    fn test_plain_error_toast() {
        let err = anyhow::anyhow!("disk full");
        let toast = Toast::from_error("Export failed", &err);
        assert_eq!(toast.message, "Export failed: disk full");
        assert_eq!(toast.redirect, None);
    }
}

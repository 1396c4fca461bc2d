// src/chat/tailoring.rs
//! One-shot writing helpers. They return text and never touch the store.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::ApiClient;
use crate::notify::Notifier;
use crate::types::resume::{Experience, ResumeData};

#[derive(Debug, Deserialize)]
struct TextResponse {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryRequest<'a> {
    resume_data: &'a ResumeData,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BulletRequest<'a> {
    bullet: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    company: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TailorRequest<'a> {
    resume_data: &'a ResumeData,
    job_description: &'a str,
}

pub struct WritingAssistant {
    client: Arc<ApiClient>,
    notifier: Arc<Notifier>,
}

impl WritingAssistant {
    pub fn new(client: Arc<ApiClient>, notifier: Arc<Notifier>) -> Self {
        Self { client, notifier }
    }

    pub async fn generate_summary(
        &self,
        data: &ResumeData,
        job_description: Option<&str>,
    ) -> Result<String> {
        info!("Requesting professional summary");
        let request = SummaryRequest {
            resume_data: data,
            job_description: job_description.filter(|jd| !jd.trim().is_empty()),
        };
        let result = self.text("/ai/generate-summary", &request).await;
        self.notifier.report("Failed to generate summary", result)
    }

    /// Rewrite one experience highlight
    pub async fn improve_bullet(&self, bullet: &str, role: Option<&Experience>) -> Result<String> {
        let result = if bullet.trim().is_empty() {
            Err(anyhow::anyhow!("Nothing to improve: the bullet is empty"))
        } else {
            let request = BulletRequest {
                bullet,
                position: role.and_then(|r| r.position.as_deref()),
                company: role.and_then(|r| r.company.as_deref()),
            };
            self.text("/ai/improve-bullet", &request).await
        };
        self.notifier.report("Failed to improve bullet", result)
    }

    /// Suggestions for aligning the resume with a job posting
    pub async fn tailor_to_job(&self, data: &ResumeData, job_description: &str) -> Result<String> {
        let result = if job_description.trim().is_empty() {
            Err(anyhow::anyhow!("A job description is required"))
        } else {
            info!("Requesting tailoring suggestions");
            let request = TailorRequest {
                resume_data: data,
                job_description,
            };
            self.text("/ai/tailor", &request).await
        };
        self.notifier.report("Failed to tailor resume", result)
    }

    async fn text<T: Serialize>(&self, endpoint: &str, request: &T) -> Result<String> {
        let response: TextResponse = self.client.post_json(endpoint, request).await?;
        Ok(response.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ToastLevel;
    use crate::routes::Route;
    use crate::test_support::{signed_in_client, spawn_server};
    use crate::types::resume::ResumeMetaData;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_helpers_return_text() {
        let router = Router::new()
            .route(
                "/ai/improve-bullet",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({"text": format!(" Led {} at {} ", body["bullet"].as_str().unwrap(), body["company"].as_str().unwrap())}))
                }),
            )
            .route(
                "/ai/tailor",
                post(|Json(body): Json<Value>| async move {
                    assert!(body["resumeData"]["personalInfo"].is_object());
                    Json(json!({"text": "Mention Kubernetes first."}))
                }),
            );
        let base = spawn_server(router).await;
        let assistant = WritingAssistant::new(signed_in_client(&base), Arc::new(Notifier::new()));
        let demo = ResumeMetaData::demo();
        let role = demo.resume_data.experience.as_ref().unwrap()[0].clone();

        let bullet = assistant.improve_bullet("migrations", Some(&role)).await.unwrap();
        assert_eq!(bullet, "Led migrations at Helvetic Cloud");

        let tips = assistant
            .tailor_to_job(&demo.resume_data, "Platform engineer, Kubernetes")
            .await
            .unwrap();
        assert_eq!(tips, "Mention Kubernetes first.");
    }

    #[tokio::test]
    async fn test_blank_inputs_are_rejected_locally() {
        let notifier = Arc::new(Notifier::new());
        let assistant = WritingAssistant::new(signed_in_client("http://127.0.0.1:9"), notifier.clone());
        let data = ResumeData::default();
        assert!(assistant.improve_bullet("  ", None).await.is_err());
        assert!(assistant.tailor_to_job(&data, "").await.is_err());

        let toasts = notifier.drain();
        assert_eq!(toasts.len(), 2);
        assert_eq!(
            toasts[1].message,
            "Failed to tailor resume: A job description is required"
        );
    }

    #[tokio::test]
    async fn test_generate_summary_sends_job_description() {
        let router = Router::new().route(
            "/ai/generate-summary",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["jobDescription"], "Rust backend role");
                assert!(body["resumeData"]["experience"].is_array());
                Json(json!({"text": "\nBackend engineer with a decade of Rust.\n"}))
            }),
        );
        let base = spawn_server(router).await;
        let assistant = WritingAssistant::new(signed_in_client(&base), Arc::new(Notifier::new()));
        let demo = ResumeMetaData::demo();

        let summary = assistant
            .generate_summary(&demo.resume_data, Some("Rust backend role"))
            .await
            .unwrap();
        assert_eq!(summary, "Backend engineer with a decade of Rust.");
    }

    #[tokio::test]
    async fn test_out_of_credits_raises_toast_with_redirect() {
        let router = Router::new().route(
            "/ai/generate-summary",
            post(|| async {
                (
                    StatusCode::PAYMENT_REQUIRED,
                    Json(json!({"message": "Insufficient credits"})),
                )
            }),
        );
        let base = spawn_server(router).await;
        let notifier = Arc::new(Notifier::new());
        let assistant = WritingAssistant::new(signed_in_client(&base), notifier.clone());

        assert!(assistant
            .generate_summary(&ResumeData::default(), None)
            .await
            .is_err());
        let toast = notifier.last().unwrap();
        assert_eq!(toast.level, ToastLevel::Error);
        assert_eq!(toast.message, "Failed to generate summary: Insufficient credits");
        assert_eq!(toast.redirect, Some(Route::Credits));
    }
}

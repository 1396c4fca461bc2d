// src/documents/resumes.rs
//! Saved resumes, imports and AI generation
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PollConfig;
use crate::core::ApiClient;
use crate::notify::Notifier;
use crate::types::documents::{GenerationStatus, GenerationTicket, ResumeDraft, ResumeRecord};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationRequest<'a> {
    job_description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_resume_id: Option<&'a str>,
}

pub struct ResumeService {
    client: Arc<ApiClient>,
    notifier: Arc<Notifier>,
    poll: PollConfig,
}

impl ResumeService {
    pub fn new(client: Arc<ApiClient>, notifier: Arc<Notifier>, poll: PollConfig) -> Self {
        Self {
            client,
            notifier,
            poll,
        }
    }

    pub async fn list(&self) -> Result<Vec<ResumeRecord>> {
        let result = self.client.get("/resumes").await;
        self.notifier.report("Failed to load resumes", result)
    }

    pub async fn get(&self, id: &str) -> Result<ResumeRecord> {
        let result = self.client.get(&format!("/resumes/{}", id)).await;
        self.notifier.report("Failed to load resume", result)
    }

    pub async fn create(&self, draft: &ResumeDraft) -> Result<ResumeRecord> {
        let result: Result<ResumeRecord> = self.client.post_json("/resumes", draft).await;
        let record = self.notifier.report("Failed to create resume", result)?;
        info!("Created resume {}", record.id);
        self.notifier.success("Resume created");
        Ok(record)
    }

    pub async fn update(&self, id: &str, draft: &ResumeDraft) -> Result<ResumeRecord> {
        let result = self
            .client
            .put_json(&format!("/resumes/{}", id), draft)
            .await;
        let record = self.notifier.report("Failed to save resume", result)?;
        self.notifier.success("Resume saved");
        Ok(record)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = self.client.delete(&format!("/resumes/{}", id)).await;
        self.notifier.report("Failed to delete resume", result)?;
        info!("Deleted resume {}", id);
        self.notifier.success("Resume deleted");
        Ok(())
    }

    pub async fn duplicate(&self, id: &str) -> Result<ResumeRecord> {
        let result: Result<ResumeRecord> = self
            .client
            .post_empty(&format!("/resumes/{}/duplicate", id))
            .await;
        let record = self.notifier.report("Failed to duplicate resume", result)?;
        self.notifier.success(format!("Duplicated as '{}'", record.title));
        Ok(record)
    }

    /// Upload an existing PDF or DOCX resume to be parsed server-side
    pub async fn import_file(&self, path: &Path) -> Result<ResumeRecord> {
        info!("Importing resume from {}", path.display());
        let result = self.client.upload_file("/resumes/import", "file", path).await;
        let record = self.notifier.report("Failed to import resume", result)?;
        self.notifier.success("Resume imported");
        Ok(record)
    }

    pub async fn start_generation(
        &self,
        job_description: &str,
        base_resume_id: Option<&str>,
    ) -> Result<GenerationTicket> {
        let request = GenerationRequest {
            job_description,
            base_resume_id,
        };
        let result = self.client.post_json("/resumes/generate", &request).await;
        let ticket: GenerationTicket = self.notifier.report("Failed to start generation", result)?;
        info!("Generation {} started", ticket.generation_id);
        self.notifier.info("Generating your resume");
        Ok(ticket)
    }

    /// Poll a generation at the configured interval until it finishes or the
    /// attempt cap is reached. Returns the id of the generated resume.
    pub async fn wait_for_generation(&self, generation_id: &str) -> Result<String> {
        let result = self.poll_generation(generation_id).await;
        let resume_id = self.notifier.report("Resume generation failed", result)?;
        self.notifier.success("Resume generated");
        Ok(resume_id)
    }

    async fn poll_generation(&self, generation_id: &str) -> Result<String> {
        let endpoint = format!("/resumes/generation/{}", generation_id);
        let max_attempts = self.poll.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            let status: GenerationStatus = self
                .client
                .get(&endpoint)
                .await
                .with_context(|| format!("Failed to poll generation {}", generation_id))?;
            debug!("Generation {} attempt {}: {:?}", generation_id, attempt, status);

            match status {
                GenerationStatus::Completed { resume_id } => return Ok(resume_id),
                GenerationStatus::Failed { error } => {
                    let reason = if error.is_empty() {
                        "unknown error".to_string()
                    } else {
                        error
                    };
                    anyhow::bail!("Generation {} failed: {}", generation_id, reason);
                }
                GenerationStatus::Pending | GenerationStatus::Processing => {}
            }

            if attempt < max_attempts {
                tokio::time::sleep(self.poll.interval()).await;
            }
        }

        warn!(
            "Generation {} still running after {} attempts",
            generation_id, max_attempts
        );
        anyhow::bail!(
            "Generation {} did not finish after {} attempts",
            generation_id,
            max_attempts
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ToastLevel;
    use crate::test_support::{signed_in_client, spawn_server};
    use axum::{
        extract::Path as UrlPath,
        http::StatusCode,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_poll(max_attempts: u32) -> PollConfig {
        PollConfig {
            interval_ms: 5,
            max_attempts,
        }
    }

    fn record(id: &str, title: &str) -> serde_json::Value {
        json!({"id": id, "title": title, "data": {}, "settings": {}})
    }

    #[tokio::test]
    async fn test_generation_polls_until_completed() {
        let polls = Arc::new(AtomicU32::new(0));
        let counter = polls.clone();
        let router = Router::new()
            .route(
                "/resumes/generate",
                post(|Json(body): Json<serde_json::Value>| async move {
                    assert_eq!(body["jobDescription"], "Rust backend");
                    Json(json!({"generationId": "g1"}))
                }),
            )
            .route(
                "/resumes/generation/:id",
                get(move |UrlPath(id): UrlPath<String>| {
                    let counter = counter.clone();
                    async move {
                        assert_eq!(id, "g1");
                        match counter.fetch_add(1, Ordering::SeqCst) {
                            0 => Json(json!({"status": "pending"})),
                            1 => Json(json!({"status": "processing"})),
                            _ => Json(json!({"status": "completed", "resumeId": "r42"})),
                        }
                    }
                }),
            );
        let base = spawn_server(router).await;
        let notifier = Arc::new(Notifier::new());
        let service = ResumeService::new(signed_in_client(&base), notifier.clone(), fast_poll(5));

        let ticket = service.start_generation("Rust backend", None).await.unwrap();
        let resume_id = service.wait_for_generation(&ticket.generation_id).await.unwrap();

        assert_eq!(resume_id, "r42");
        assert_eq!(polls.load(Ordering::SeqCst), 3);
        assert_eq!(notifier.last().unwrap().level, ToastLevel::Success);
    }

    #[tokio::test]
    async fn test_generation_gives_up_after_cap() {
        let polls = Arc::new(AtomicU32::new(0));
        let counter = polls.clone();
        let router = Router::new().route(
            "/resumes/generation/:id",
            get(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"status": "processing"}))
                }
            }),
        );
        let base = spawn_server(router).await;
        let notifier = Arc::new(Notifier::new());
        let service = ResumeService::new(signed_in_client(&base), notifier.clone(), fast_poll(3));

        let err = service.wait_for_generation("g9").await.unwrap_err();
        assert!(err.to_string().contains("did not finish after 3 attempts"));
        assert_eq!(polls.load(Ordering::SeqCst), 3);
        assert_eq!(notifier.last().unwrap().level, ToastLevel::Error);
    }

    #[tokio::test]
    async fn test_failed_generation_reports_reason() {
        let router = Router::new().route(
            "/resumes/generation/:id",
            get(|| async { Json(json!({"status": "failed", "error": "Job description too short"})) }),
        );
        let base = spawn_server(router).await;
        let notifier = Arc::new(Notifier::new());
        let service = ResumeService::new(signed_in_client(&base), notifier.clone(), fast_poll(5));

        assert!(service.wait_for_generation("g2").await.is_err());
        assert!(notifier
            .last()
            .unwrap()
            .message
            .contains("Job description too short"));
    }

    #[tokio::test]
    async fn test_crud_round() {
        let router = Router::new()
            .route(
                "/resumes",
                get(|| async { Json(json!([record("r1", "Backend"), record("r2", "Data")])) }),
            )
            .route(
                "/resumes/:id",
                get(|UrlPath(id): UrlPath<String>| async move { Json(record(&id, "Backend")) })
                    .delete(|| async { StatusCode::NO_CONTENT }),
            )
            .route(
                "/resumes/:id/duplicate",
                post(|| async { Json(record("r3", "Backend (copy)")) }),
            );
        let base = spawn_server(router).await;
        let notifier = Arc::new(Notifier::new());
        let service =
            ResumeService::new(signed_in_client(&base), notifier.clone(), PollConfig::default());

        let all = service.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(service.get("r1").await.unwrap().title, "Backend");
        assert_eq!(service.duplicate("r1").await.unwrap().id, "r3");
        service.delete("r1").await.unwrap();

        let messages: Vec<String> = notifier.drain().into_iter().map(|t| t.message).collect();
        assert_eq!(messages, vec!["Duplicated as 'Backend (copy)'", "Resume deleted"]);
    }

    #[tokio::test]
    async fn test_missing_resume_raises_error_toast() {
        let router = Router::new().route(
            "/resumes/:id",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({"message": "Resume not found"}))) }),
        );
        let base = spawn_server(router).await;
        let notifier = Arc::new(Notifier::new());
        let service =
            ResumeService::new(signed_in_client(&base), notifier.clone(), PollConfig::default());

        assert!(service.get("missing").await.is_err());
        assert_eq!(
            notifier.last().unwrap().message,
            "Failed to load resume: Resume not found"
        );
    }
}

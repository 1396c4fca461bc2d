// src/documents/cover_letters.rs
//! Cover letter CRUD and AI generation
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::core::ApiClient;
use crate::notify::Notifier;
use crate::types::documents::{CoverLetter, CoverLetterDraft, CoverLetterRequest};

pub const TONES: [&str; 4] = ["professional", "enthusiastic", "formal", "friendly"];

pub struct CoverLetterService {
    client: Arc<ApiClient>,
    notifier: Arc<Notifier>,
}

impl CoverLetterService {
    pub fn new(client: Arc<ApiClient>, notifier: Arc<Notifier>) -> Self {
        Self { client, notifier }
    }

    pub async fn list(&self) -> Result<Vec<CoverLetter>> {
        let result = self.client.get("/cover-letters").await;
        self.notifier.report("Failed to load cover letters", result)
    }

    pub async fn get(&self, id: &str) -> Result<CoverLetter> {
        let result = self.client.get(&format!("/cover-letters/{}", id)).await;
        self.notifier.report("Failed to load cover letter", result)
    }

    pub async fn create(&self, draft: &CoverLetterDraft) -> Result<CoverLetter> {
        let result = self.client.post_json("/cover-letters", draft).await;
        let letter = self.notifier.report("Failed to create cover letter", result)?;
        self.notifier.success("Cover letter created");
        Ok(letter)
    }

    pub async fn update(&self, id: &str, draft: &CoverLetterDraft) -> Result<CoverLetter> {
        let result = self
            .client
            .put_json(&format!("/cover-letters/{}", id), draft)
            .await;
        let letter = self.notifier.report("Failed to save cover letter", result)?;
        self.notifier.success("Cover letter saved");
        Ok(letter)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let result = self.client.delete(&format!("/cover-letters/{}", id)).await;
        self.notifier.report("Failed to delete cover letter", result)?;
        self.notifier.success("Cover letter deleted");
        Ok(())
    }

    /// Ask the assistant to write a letter for `resume_id` against a job posting.
    /// Unknown tones are sent as "professional".
    pub async fn generate(
        &self,
        resume_id: &str,
        job_description: &str,
        tone: Option<&str>,
    ) -> Result<CoverLetter> {
        let tone = tone.map(|requested| {
            let t = requested.trim().to_ascii_lowercase();
            if TONES.contains(&t.as_str()) {
                t
            } else {
                self.notifier.info(format!(
                    "Unknown tone '{}', using {} (available: {})",
                    requested.trim(),
                    TONES[0],
                    TONES.join(", ")
                ));
                TONES[0].to_string()
            }
        });
        let request = CoverLetterRequest {
            resume_id: resume_id.to_string(),
            job_description: job_description.to_string(),
            tone,
        };

        info!("Generating cover letter from resume {}", resume_id);
        let result: Result<CoverLetter> =
            self.client.post_json("/cover-letters/generate", &request).await;
        let letter = self.notifier.report("Failed to generate cover letter", result)?;
        self.notifier.success("Cover letter generated");
        Ok(letter)
    }
}

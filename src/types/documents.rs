// src/types/documents.rs
//! Wire types for saved resumes, generation jobs and cover letters
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::resume::{ResumeData, ResumeMetaData, ResumeSettings};

/// A saved resume as the API returns it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub data: ResumeData,
    #[serde(default)]
    pub settings: ResumeSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ResumeRecord {
    /// Editor state for this record. The settings title wins over a blank record title.
    pub fn into_meta(self) -> ResumeMetaData {
        let mut settings = self.settings;
        if settings.resume_title.trim().is_empty() && !self.title.trim().is_empty() {
            settings.resume_title = self.title;
        }
        ResumeMetaData::new(self.data, settings)
    }
}

/// Body for create/update
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDraft {
    pub title: String,
    pub data: ResumeData,
    pub settings: ResumeSettings,
}

impl From<&ResumeMetaData> for ResumeDraft {
    fn from(meta: &ResumeMetaData) -> Self {
        Self {
            title: meta.resume_settings.resume_title.clone(),
            data: meta.resume_data.clone(),
            settings: meta.resume_settings.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationTicket {
    pub generation_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum GenerationStatus {
    Pending,
    Processing,
    #[serde(rename_all = "camelCase")]
    Completed { resume_id: String },
    Failed {
        #[serde(default)]
        error: String,
    },
}

impl GenerationStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetter {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterDraft {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoverLetterRequest {
    pub resume_id: String,
    pub job_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

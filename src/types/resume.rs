// src/types/resume.rs
//! Resume document, render settings and editor metadata

use serde::{Deserialize, Serialize};
use std::fmt;

// ===== Resume document =====

/// The resume body. Every field is optional and list entries carry no ids:
/// they are addressed by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<PersonalInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<Education>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<Experience>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<Skill>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<Certification>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<Reference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_sections: Option<Vec<CustomSection>>,
}

impl ResumeData {
    /// True when no top-level field is present
    pub fn is_empty(&self) -> bool {
        *self == ResumeData::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub gpa: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub company: Option<String>,
    pub position: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>, // None with current = true means ongoing
    pub current: Option<bool>,
    pub description: Option<String>,
    pub highlights: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub name: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub url: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Skill {
    pub name: Option<String>,
    pub level: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Certification {
    pub name: Option<String>,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Reference {
    pub name: Option<String>,
    pub position: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomSection {
    pub title: String,
    pub content: Option<String>,
    pub items: Option<Vec<String>>,
}

// ===== Settings =====

/// Renderable section keys. Anything unrecognised is a custom section
/// looked up by title.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKey {
    Summary,
    Experience,
    Education,
    Projects,
    Skills,
    Certifications,
    References,
    Interests,
    Custom(String),
}

impl SectionKey {
    pub fn parse(key: &str) -> Self {
        match key.to_lowercase().as_str() {
            "summary" | "profile" => SectionKey::Summary,
            "experience" | "work" => SectionKey::Experience,
            "education" => SectionKey::Education,
            "projects" => SectionKey::Projects,
            "skills" => SectionKey::Skills,
            "certifications" => SectionKey::Certifications,
            "references" => SectionKey::References,
            "interests" => SectionKey::Interests,
            _ => SectionKey::Custom(key.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SectionKey::Summary => "summary",
            SectionKey::Experience => "experience",
            SectionKey::Education => "education",
            SectionKey::Projects => "projects",
            SectionKey::Skills => "skills",
            SectionKey::Certifications => "certifications",
            SectionKey::References => "references",
            SectionKey::Interests => "interests",
            SectionKey::Custom(title) => title,
        }
    }

    pub fn heading(&self) -> &str {
        match self {
            SectionKey::Summary => "Summary",
            SectionKey::Experience => "Experience",
            SectionKey::Education => "Education",
            SectionKey::Projects => "Projects",
            SectionKey::Skills => "Skills",
            SectionKey::Certifications => "Certifications",
            SectionKey::References => "References",
            SectionKey::Interests => "Interests",
            SectionKey::Custom(title) => title,
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    pub key: String,
    pub order: i32,
    pub visible: bool,
}

impl SectionDescriptor {
    pub fn new(key: &str, order: i32, visible: bool) -> Self {
        Self {
            key: key.to_string(),
            order,
            visible,
        }
    }

    pub fn section_key(&self) -> SectionKey {
        SectionKey::parse(&self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeSettings {
    pub font_size: f32,
    pub font_family: String,
    pub line_height: f32,
    pub template: String,
    pub resume_title: String,
    pub sections: Vec<SectionDescriptor>,
}

impl Default for ResumeSettings {
    fn default() -> Self {
        Self {
            font_size: 14.0,
            font_family: "Inter".to_string(),
            line_height: 1.5,
            template: "classic".to_string(),
            resume_title: "Untitled Resume".to_string(),
            sections: default_sections(),
        }
    }
}

/// Partial settings; every present field replaces the current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<SectionDescriptor>>,
}

impl ResumeSettingsPatch {
    pub fn is_empty(&self) -> bool {
        *self == ResumeSettingsPatch::default()
    }
}

pub fn default_sections() -> Vec<SectionDescriptor> {
    [
        "summary",
        "experience",
        "education",
        "projects",
        "skills",
        "certifications",
        "references",
        "interests",
    ]
    .iter()
    .enumerate()
    .map(|(i, key)| SectionDescriptor::new(key, i as i32, *key != "references"))
    .collect()
}

// ===== Editor metadata =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeMetaData {
    pub resume_data: ResumeData,
    pub resume_settings: ResumeSettings,
    pub downloading: bool,
    pub editing_mode: bool,
}

impl ResumeMetaData {
    pub fn new(resume_data: ResumeData, resume_settings: ResumeSettings) -> Self {
        Self {
            resume_data,
            resume_settings,
            downloading: false,
            editing_mode: false,
        }
    }

    /// The sample document an editor starts from before a resume is loaded
    pub fn demo() -> Self {
        let resume_data = ResumeData {
            personal_info: Some(PersonalInfo {
                name: Some("Alex Morgan".to_string()),
                title: Some("Senior Software Engineer".to_string()),
                email: Some("alex.morgan@example.com".to_string()),
                phone: Some("+1 555 0100".to_string()),
                location: Some("Zurich, Switzerland".to_string()),
                website: Some("https://alexmorgan.dev".to_string()),
                linkedin: Some("linkedin.com/in/alexmorgan".to_string()),
                github: Some("github.com/alexmorgan".to_string()),
                summary: Some(
                    "Engineer with eight years of experience building reliable backend \
                     services and developer tooling."
                        .to_string(),
                ),
            }),
            education: Some(vec![Education {
                institution: Some("ETH Zurich".to_string()),
                degree: Some("MSc".to_string()),
                field: Some("Computer Science".to_string()),
                location: Some("Zurich".to_string()),
                start_date: Some("2012".to_string()),
                end_date: Some("2016".to_string()),
                ..Default::default()
            }]),
            experience: Some(vec![
                Experience {
                    company: Some("Helvetic Cloud".to_string()),
                    position: Some("Senior Software Engineer".to_string()),
                    location: Some("Zurich".to_string()),
                    start_date: Some("2020-03".to_string()),
                    end_date: None,
                    current: Some(true),
                    description: Some("Platform team for the payments API.".to_string()),
                    highlights: Some(vec![
                        "Cut p99 latency of the ledger service by 40%".to_string(),
                        "Led migration of 30 services to a shared deploy pipeline".to_string(),
                    ]),
                },
                Experience {
                    company: Some("Datapoint".to_string()),
                    position: Some("Software Engineer".to_string()),
                    location: Some("Geneva".to_string()),
                    start_date: Some("2016-09".to_string()),
                    end_date: Some("2020-02".to_string()),
                    current: Some(false),
                    description: None,
                    highlights: Some(vec!["Built the ingestion pipeline for sensor data".to_string()]),
                },
            ]),
            projects: Some(vec![Project {
                name: Some("typst-cv".to_string()),
                description: Some("Open-source CV templates.".to_string()),
                technologies: Some(vec!["Typst".to_string(), "Rust".to_string()]),
                url: Some("https://github.com/alexmorgan/typst-cv".to_string()),
                ..Default::default()
            }]),
            skills: Some(
                ["Rust", "Go", "PostgreSQL", "Kubernetes"]
                    .iter()
                    .map(|s| Skill {
                        name: Some(s.to_string()),
                        level: None,
                        category: Some("Technical".to_string()),
                    })
                    .collect(),
            ),
            certifications: Some(vec![Certification {
                name: Some("CKA".to_string()),
                issuer: Some("CNCF".to_string()),
                date: Some("2022".to_string()),
                url: None,
            }]),
            references: Some(Vec::new()),
            interests: Some(vec!["Climbing".to_string(), "Chess".to_string()]),
            custom_sections: Some(Vec::new()),
        };

        Self::new(resume_data, ResumeSettings::default())
    }
}

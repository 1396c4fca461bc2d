// src/store/reducer.rs
//! Resume state container: a dispatch table of shallow-merge actions

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::resume::{ResumeData, ResumeMetaData, ResumeSettingsPatch};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ResumeAction {
    #[serde(rename = "RESUME_DATA")]
    ResumeData(ResumeData),
    #[serde(rename = "RESUME_SETTINGS")]
    ResumeSettings(ResumeSettingsPatch),
    #[serde(rename = "RESUME_DOWNLOADING")]
    Downloading(bool),
    #[serde(rename = "RESUME_EDITING_MODE")]
    EditingMode(bool),
}

impl ResumeAction {
    pub fn name(&self) -> &'static str {
        match self {
            ResumeAction::ResumeData(_) => "RESUME_DATA",
            ResumeAction::ResumeSettings(_) => "RESUME_SETTINGS",
            ResumeAction::Downloading(_) => "RESUME_DOWNLOADING",
            ResumeAction::EditingMode(_) => "RESUME_EDITING_MODE",
        }
    }
}

macro_rules! merge_present {
    ($target:expr; $($field:ident),+ $(,)?) => {
        $(
            if let Some(value) = $field {
                $target.$field = Some(value);
            }
        )+
    };
}

/// Apply `action` to `state`. Present fields replace the current ones
/// wholesale; nothing is validated and the last write wins.
pub fn reduce(state: &mut ResumeMetaData, action: ResumeAction) {
    trace!("reduce {}", action.name());

    match action {
        ResumeAction::ResumeData(patch) => merge_resume_data(&mut state.resume_data, patch),
        ResumeAction::ResumeSettings(patch) => {
            let ResumeSettingsPatch {
                font_size,
                font_family,
                line_height,
                template,
                resume_title,
                sections,
            } = patch;
            let settings = &mut state.resume_settings;

            if let Some(v) = font_size {
                settings.font_size = v;
            }
            if let Some(v) = font_family {
                settings.font_family = v;
            }
            if let Some(v) = line_height {
                settings.line_height = v;
            }
            if let Some(v) = template {
                settings.template = v;
            }
            if let Some(v) = resume_title {
                settings.resume_title = v;
            }
            if let Some(v) = sections {
                settings.sections = v;
            }
        }
        ResumeAction::Downloading(flag) => state.downloading = flag,
        ResumeAction::EditingMode(flag) => state.editing_mode = flag,
    }
}

fn merge_resume_data(target: &mut ResumeData, patch: ResumeData) {
    let ResumeData {
        personal_info,
        education,
        experience,
        projects,
        skills,
        certifications,
        references,
        interests,
        custom_sections,
    } = patch;

    merge_present!(target;
        personal_info,
        education,
        experience,
        projects,
        skills,
        certifications,
        references,
        interests,
        custom_sections,
    );
}

/// Owns one `ResumeMetaData` and counts applied actions
#[derive(Debug, Clone, Default)]
pub struct ResumeStore {
    state: ResumeMetaData,
    revision: u64,
}

impl ResumeStore {
    pub fn new(state: ResumeMetaData) -> Self {
        Self { state, revision: 0 }
    }

    pub fn demo() -> Self {
        Self::new(ResumeMetaData::demo())
    }

    pub fn state(&self) -> &ResumeMetaData {
        &self.state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn dispatch(&mut self, action: ResumeAction) {
        reduce(&mut self.state, action);
        self.revision += 1;
    }

    pub fn dispatch_all<I>(&mut self, actions: I)
    where
        I: IntoIterator<Item = ResumeAction>,
    {
        for action in actions {
            self.dispatch(action);
        }
    }

    /// Replace the whole document, e.g. after loading a saved resume
    pub fn replace(&mut self, state: ResumeMetaData) {
        self.state = state;
        self.revision += 1;
    }

    pub fn into_inner(self) -> ResumeMetaData {
        self.state
    }
}

// src/types/mod.rs
pub mod documents;
pub mod resume;

pub use documents::{
    CoverLetter, CoverLetterDraft, CoverLetterRequest, GenerationStatus, GenerationTicket,
    ResumeDraft, ResumeRecord,
};
pub use resume::{ResumeData, ResumeMetaData, ResumeSettings, ResumeSettingsPatch, SectionKey};

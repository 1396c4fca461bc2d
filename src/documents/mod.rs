// src/documents/mod.rs
pub mod cover_letters;
pub mod resumes;

pub use cover_letters::CoverLetterService;
pub use resumes::ResumeService;

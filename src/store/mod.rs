// src/store/mod.rs
pub mod editors;
pub mod reducer;

pub use editors::{ListEdit, PersonalField, SectionList};
pub use reducer::{reduce, ResumeAction, ResumeStore};

// src/chat/mod.rs
pub mod assistant;
pub mod patch;
pub mod tailoring;

pub use assistant::{ChatMessage, ChatOutcome, ChatResponse, ChatRole, ChatSession};
pub use patch::{strip_nulls, updates_to_actions};
pub use tailoring::WritingAssistant;

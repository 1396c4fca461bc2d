//! Client for the cvenom resume builder: resumes, cover letters, the AI
//! assistant, job tracking and billing, driven from the `cvenom` CLI.

pub mod auth;
pub mod billing;
pub mod chat;
pub mod cli;
pub mod config;
pub mod core;
pub mod documents;
pub mod jobs;
pub mod notify;
pub mod routes;
pub mod store;
pub mod templates;
pub mod types;

#[cfg(test)]
mod test_support;

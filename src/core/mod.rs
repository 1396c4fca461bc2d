// src/core/mod.rs
//! Core services shared by every feature module

pub mod api_client;
pub mod errors;
pub mod fs_ops;
pub mod session;

pub use api_client::ApiClient;
pub use errors::{api_error_of, classify_failure, ApiError};
pub use fs_ops::FsOps;
pub use session::{token_expiry, Session, SessionStore, UserProfile};

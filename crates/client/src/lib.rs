//! Vehicle API client.
//!
//! Blocking reqwest client (no Tokio runtime required).
//! Covers login, the active-vehicle fetch and label color lookups.
//!
//! No retries. No token refresh.

mod auth;
mod client;
mod config;

pub use auth::{request_token, LoginCredentials};
pub use client::{ApiClient, ClientError};
pub use config::ApiConfig;

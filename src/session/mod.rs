// session/mod.rs - login sessions keyed by an opaque token
//
// The middleware only depends on the `SessionStore` trait, so a persistent
// backend can replace `MemorySessionStore` without touching request handling.

use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;

pub use memory::MemorySessionStore;

/// Random bytes behind every session token (32 base64url characters)
const TOKEN_BYTES: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to generate session token: {0}")]
    TokenGeneration(String),

    #[error("session backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a session for `user_id` under a fresh unguessable token.
    async fn create(&self, user_id: &str) -> Result<Session, SessionError>;

    /// Remove the session, returning it if it existed.
    async fn destroy(&self, token: &str) -> Result<Option<Session>, SessionError>;

    async fn get(&self, token: &str) -> Result<Option<Session>, SessionError>;
}

pub fn generate_token() -> Result<String, SessionError> {
    let mut buf = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| SessionError::TokenGeneration(e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_url_safe_and_distinct() {
        let a = generate_token().unwrap();
        let b = generate_token().unwrap();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn session_serializes_camel_case() {
        let session = Session {
            token: "t".into(),
            user_id: "u".into(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["userId"], "u");
    }
}

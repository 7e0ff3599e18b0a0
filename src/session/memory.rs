use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{generate_token, Session, SessionError, SessionStore};

/// Attempts before giving up on finding an unused token
const MAX_TOKEN_ATTEMPTS: usize = 3;

/// Process-local session store. Sessions live until destroyed; there is no
/// expiry.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: &str) -> Result<Session, SessionError> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = generate_token()?;
            if let Entry::Vacant(slot) = self.sessions.entry(token.clone()) {
                let session = Session {
                    token,
                    user_id: user_id.to_string(),
                    created_at: Utc::now(),
                };
                slot.insert(session.clone());
                tracing::debug!("Session created for user {}", user_id);
                return Ok(session);
            }
        }
        Err(SessionError::TokenGeneration("no unused token found".to_string()))
    }

    async fn destroy(&self, token: &str) -> Result<Option<Session>, SessionError> {
        Ok(self.sessions.remove(token).map(|(_, session)| session))
    }

    async fn get(&self, token: &str) -> Result<Option<Session>, SessionError> {
        Ok(self.sessions.get(token).map(|entry| entry.value().clone()))
    }
}

//! In-Memory Session Store Adapter
//!
//! Keeps one `IntakeSession` per sender. Sessions are lost on restart.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{SenderId, Timestamp};
use crate::domain::intake::IntakeSession;
use crate::ports::{SessionStore, SessionStoreError};

/// In-memory storage for per-sender sessions
#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SenderId, IntakeSession>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Clear all sessions (useful for tests)
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, sender: &SenderId) -> Result<Option<IntakeSession>, SessionStoreError> {
        Ok(self.sessions.read().await.get(sender).cloned())
    }

    async fn put(&self, sender: &SenderId, session: IntakeSession) -> Result<(), SessionStoreError> {
        self.sessions.write().await.insert(sender.clone(), session);
        Ok(())
    }

    async fn delete(&self, sender: &SenderId) -> Result<Option<IntakeSession>, SessionStoreError> {
        Ok(self.sessions.write().await.remove(sender))
    }

    async fn purge_idle(&self, cutoff: Timestamp) -> Result<usize, SessionStoreError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.last_active().is_before(&cutoff));
        Ok(before - sessions.len())
    }

    async fn len(&self) -> Result<usize, SessionStoreError> {
        Ok(self.sessions.read().await.len())
    }
}

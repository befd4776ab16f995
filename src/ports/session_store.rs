//! Session Store Port - Interface for per-sender conversation state.
//!
//! The store is the single owner of sessions. Only the dialogue controller
//! mutates them, always while holding that sender's lock.

use async_trait::async_trait;

use crate::domain::foundation::{SenderId, Timestamp};
use crate::domain::intake::IntakeSession;

/// Errors that can occur during session store operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session store unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize session: {0}")]
    SerializationFailed(String),
}

/// Port for keeping in-progress intake sessions between messages
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load the session for a sender, if one exists
    async fn get(&self, sender: &SenderId) -> Result<Option<IntakeSession>, SessionStoreError>;

    /// Insert or replace the session for a sender
    async fn put(&self, sender: &SenderId, session: IntakeSession) -> Result<(), SessionStoreError>;

    /// Remove and return the session for a sender
    ///
    /// Removing a missing session is not an error.
    async fn delete(&self, sender: &SenderId) -> Result<Option<IntakeSession>, SessionStoreError>;

    /// Drop every session last active before `cutoff`
    ///
    /// # Returns
    /// The number of sessions removed
    async fn purge_idle(&self, cutoff: Timestamp) -> Result<usize, SessionStoreError>;

    /// Number of sessions currently held
    async fn len(&self) -> Result<usize, SessionStoreError>;
}

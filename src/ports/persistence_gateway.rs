//! Persistence Gateway Port - Durable storage for completed intakes.

use async_trait::async_trait;

use crate::domain::intake::CompletedRecord;

/// Errors from appending a record
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Storage request failed: {0}")]
    Transport(String),

    #[error("Storage rejected record with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Storage not configured: {0}")]
    NotConfigured(String),
}

/// Port for appending one completed record as one row
///
/// Columns follow the canonical field order. Called at most once per
/// confirmed session.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    async fn append(&self, record: &CompletedRecord) -> Result<(), PersistenceError>;
}

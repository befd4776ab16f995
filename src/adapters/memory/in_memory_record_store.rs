//! Record store that keeps completed records in memory.
//!
//! Stands in for Google Sheets when no spreadsheet is configured.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::intake::CompletedRecord;
use crate::ports::{PersistenceError, PersistenceGateway};

#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<RwLock<Vec<CompletedRecord>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record appended so far, oldest first.
    pub async fn records(&self) -> Vec<CompletedRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryRecordStore {
    async fn append(&self, record: &CompletedRecord) -> Result<(), PersistenceError> {
        tracing::info!(reference_id = %record.reference_id, "Stored record in memory");
        self.records.write().await.push(record.clone());
        Ok(())
    }
}

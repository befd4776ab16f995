//! Field Classifier Port - Optional free-text field extraction.
//!
//! Consulted only when pattern extraction leaves fields missing. Output is
//! best-effort: the controller merges it fill-if-empty and treats any error
//! as "nothing found".

use async_trait::async_trait;

use crate::domain::intake::{ExtractionError, FieldDelta, FieldRecord};

/// Port for classifying free text into intake fields
#[async_trait]
pub trait FieldClassifier: Send + Sync {
    /// Find values for fields `known` is missing
    ///
    /// # Arguments
    /// * `text` - The raw inbound message
    /// * `known` - Fields already collected, for context
    async fn classify(&self, text: &str, known: &FieldRecord) -> Result<FieldDelta, ExtractionError>;

    /// Provider name for logs
    fn provider_name(&self) -> &'static str;
}

//! Intake domain module.
//!
//! Collects a fixed set of fields from a multi-turn chat, one message at a
//! time, and walks each conversation through collection and confirmation.

pub mod commands;
pub mod extraction;
pub mod replies;

mod fields;
mod record;
mod session;
mod state;

pub use commands::{is_greeting, is_reset_command, Confirmation};
pub use extraction::{
    parse_classifier_response, ExtractionError, ExtractionPass, FieldMatcher, PatternExtractor,
};
pub use fields::FieldName;
pub use record::{CompletedRecord, FieldDelta, FieldRecord};
pub use session::{IntakeSession, SessionError};
pub use state::IntakeState;

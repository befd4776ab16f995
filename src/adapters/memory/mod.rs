//! In-memory adapters.
//!
//! Session storage for the running service, plus a record store and a
//! notifier used when Sheets or WhatsApp are not wired in (local runs, tests).

mod in_memory_record_store;
mod in_memory_session_store;
mod recording_notifier;

pub use in_memory_record_store::InMemoryRecordStore;
pub use in_memory_session_store::InMemorySessionStore;
pub use recording_notifier::{RecordingNotifier, SentMessage};

//! Intake handlers.
//!
//! ## Commands
//! - Handling one inbound chat message (the dialogue controller)
//!
//! ## Background
//! - Sweeping sessions idle beyond the retention window

mod handle_inbound_message;
mod sender_locks;
mod sweep_idle_sessions;

pub use handle_inbound_message::{
    HandleInboundMessageCommand, HandleInboundMessageHandler, IntakeError, IntakeOutcome,
};
pub use sender_locks::{SenderGuard, SenderLocks};
pub use sweep_idle_sessions::SessionSweeper;

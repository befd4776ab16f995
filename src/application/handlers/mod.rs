//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod intake;

pub use intake::{
    HandleInboundMessageCommand, HandleInboundMessageHandler, IntakeError, IntakeOutcome,
    SenderLocks, SessionSweeper,
};

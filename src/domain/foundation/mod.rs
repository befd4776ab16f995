//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that the intake
//! domain is built from.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::SenderId;
pub use state_machine::{StateMachine, TransitionError};
pub use timestamp::Timestamp;

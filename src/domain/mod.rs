//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (timestamps, IDs, errors, state machine trait)
//! - `intake` - Field record, dialogue session, commands, replies and field extraction

pub mod foundation;
pub mod intake;

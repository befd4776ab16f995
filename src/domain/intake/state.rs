//! Dialogue state machine.
//!
//! Defines the lifecycle states of an intake conversation and valid transitions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// The lifecycle state of an intake conversation.
///
/// Only `Collecting` and `AwaitingConfirmation` are ever stored. `New` exists
/// for the instant a session is created; `Finalized` and `Discarded` describe
/// the moment it is removed from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntakeState {
    /// First contact, nothing collected yet.
    New,

    /// Gathering required fields across messages.
    #[default]
    Collecting,

    /// Every field is known; waiting for an explicit yes/no.
    AwaitingConfirmation,

    /// User confirmed and the record was persisted.
    Finalized,

    /// User declined the collected record.
    Discarded,
}

impl IntakeState {
    /// Returns true for states a stored session may be in.
    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Collecting | Self::AwaitingConfirmation)
    }

    /// Returns true if the next message is read as a yes/no reply.
    pub fn expects_confirmation(&self) -> bool {
        matches!(self, Self::AwaitingConfirmation)
    }
}

impl StateMachine for IntakeState {
    fn valid_transitions(&self) -> &'static [Self] {
        use IntakeState::*;
        match self {
            New => &[Collecting],
            Collecting => &[AwaitingConfirmation],
            AwaitingConfirmation => &[Finalized, Discarded],
            Finalized => &[],
            Discarded => &[],
        }
    }
}

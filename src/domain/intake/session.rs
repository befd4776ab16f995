//! Intake session - one in-progress conversation with one sender.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::foundation::{StateMachine, Timestamp, TransitionError};

use super::{CompletedRecord, FieldDelta, FieldName, FieldRecord, IntakeState};

/// Errors raised when a session is driven out of order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("record is incomplete, missing: {missing:?}")]
    Incomplete { missing: Vec<FieldName> },

    #[error("session is not collecting fields (state: {0:?})")]
    NotCollecting(IntakeState),

    #[error("submission already in progress")]
    SubmissionInProgress,
}

/// Conversation state tracked between messages from one sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeSession {
    fields: FieldRecord,
    state: IntakeState,
    created_at: Timestamp,
    last_active: Timestamp,
    /// Platform display name. Informational only, never merged into `name`.
    contact_name: Option<String>,
    /// Set while the confirmed record is being persisted.
    #[serde(default)]
    submitting: bool,
}

impl IntakeSession {
    /// Starts a fresh session in `Collecting` with an empty record.
    pub fn start(now: Timestamp) -> Self {
        Self {
            fields: FieldRecord::new(),
            state: IntakeState::Collecting,
            created_at: now,
            last_active: now,
            contact_name: None,
            submitting: false,
        }
    }

    pub fn with_contact_name(mut self, contact_name: Option<String>) -> Self {
        self.contact_name = contact_name.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn fields(&self) -> &FieldRecord {
        &self.fields
    }

    pub fn state(&self) -> IntakeState {
        self.state
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_active(&self) -> Timestamp {
        self.last_active
    }

    pub fn contact_name(&self) -> Option<&str> {
        self.contact_name.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.state.expects_confirmation()
    }

    /// True when the session has been idle strictly longer than `timeout`.
    pub fn is_expired(&self, now: Timestamp, timeout: Duration) -> bool {
        now.elapsed_since(&self.last_active) > timeout
    }

    /// Records activity without changing any field.
    pub fn touch(&mut self, now: Timestamp) {
        if self.last_active.is_before(&now) {
            self.last_active = now;
        }
    }

    /// Folds extracted values into the record (fill-if-empty).
    ///
    /// Only valid while collecting; the record is frozen once confirmation
    /// has been requested.
    pub fn apply(&mut self, delta: &FieldDelta, now: Timestamp) -> Result<Vec<FieldName>, SessionError> {
        if self.state != IntakeState::Collecting {
            return Err(SessionError::NotCollecting(self.state));
        }
        let filled = self.fields.merge(delta);
        self.touch(now);
        Ok(filled)
    }

    /// Moves to `AwaitingConfirmation` once the record is complete.
    pub fn request_confirmation(&mut self) -> Result<(), SessionError> {
        let missing = self.fields.missing();
        if !missing.is_empty() {
            return Err(SessionError::Incomplete { missing });
        }
        self.state = self.state.transition_to(IntakeState::AwaitingConfirmation)?;
        Ok(())
    }

    /// Returns the record to persist after an affirmative reply.
    pub fn finalize(&self) -> Result<CompletedRecord, SessionError> {
        self.state.transition_to(IntakeState::Finalized)?;
        self.fields.to_completed().ok_or_else(|| SessionError::Incomplete {
            missing: self.fields.missing(),
        })
    }

    /// Marks the session as being persisted and returns the record.
    ///
    /// The session stays stored while the write is in flight, so a second
    /// confirmation is refused and a reset still removes it.
    pub fn begin_submission(&mut self) -> Result<CompletedRecord, SessionError> {
        if self.submitting {
            return Err(SessionError::SubmissionInProgress);
        }
        let record = self.finalize()?;
        self.submitting = true;
        Ok(record)
    }

    /// Clears the in-flight marker after a failed write so the user can retry.
    pub fn abort_submission(&mut self, now: Timestamp) {
        self.submitting = false;
        self.touch(now);
    }

    /// True when `other` is this same conversation with a submission in flight.
    pub fn is_same_submission(&self, other: &IntakeSession) -> bool {
        self.submitting && other.submitting && self.created_at == other.created_at
    }

    /// Validates that the session may be discarded.
    pub fn discard(&self) -> Result<IntakeState, SessionError> {
        Ok(self.state.transition_to(IntakeState::Discarded)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_delta() -> FieldDelta {
        FieldDelta::from_pairs([
            (FieldName::Name, "Priya Sharma"),
            (FieldName::Phone, "9876543210"),
            (FieldName::DateOfIssue, "10-10-2024"),
            (FieldName::ReferenceId, "ABC12345"),
            (FieldName::IssueDescription, "refund not received"),
        ])
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn starts_collecting_with_empty_record() {
            let session = IntakeSession::start(Timestamp::now());
            assert_eq!(session.state(), IntakeState::Collecting);
            assert_eq!(session.fields().missing().len(), 5);
            assert_eq!(session.created_at(), session.last_active());
        }

        #[test]
        fn blank_contact_name_is_dropped() {
            let session = IntakeSession::start(Timestamp::now()).with_contact_name(Some("  ".into()));
            assert_eq!(session.contact_name(), None);
        }

        #[test]
        fn apply_refreshes_last_active() {
            let start = Timestamp::now();
            let mut session = IntakeSession::start(start);
            let later = start.plus(Duration::from_secs(30));

            session.apply(&FieldDelta::new(), later).unwrap();
            assert_eq!(session.last_active(), later);
        }

        #[test]
        fn complete_record_can_request_confirmation() {
            let now = Timestamp::now();
            let mut session = IntakeSession::start(now);
            session.apply(&complete_delta(), now).unwrap();

            session.request_confirmation().unwrap();
            assert!(session.is_awaiting_confirmation());
        }

        #[test]
        fn incomplete_record_cannot_request_confirmation() {
            let mut session = IntakeSession::start(Timestamp::now());
            let err = session.request_confirmation().unwrap_err();
            assert!(matches!(err, SessionError::Incomplete { missing } if missing.len() == 5));
        }

        #[test]
        fn record_is_frozen_while_awaiting_confirmation() {
            let now = Timestamp::now();
            let mut session = IntakeSession::start(now);
            session.apply(&complete_delta(), now).unwrap();
            session.request_confirmation().unwrap();

            let err = session
                .apply(&FieldDelta::from_pairs([(FieldName::Name, "Someone Else")]), now)
                .unwrap_err();
            assert_eq!(err, SessionError::NotCollecting(IntakeState::AwaitingConfirmation));
        }

        #[test]
        fn finalize_requires_confirmation_state() {
            let now = Timestamp::now();
            let mut session = IntakeSession::start(now);
            session.apply(&complete_delta(), now).unwrap();

            assert!(matches!(
                session.finalize(),
                Err(SessionError::InvalidTransition(_))
            ));

            session.request_confirmation().unwrap();
            let record = session.finalize().unwrap();
            assert_eq!(record.name, "Priya Sharma");
        }
    }

    mod submission {
        use super::*;

        fn confirmed(now: Timestamp) -> IntakeSession {
            let mut session = IntakeSession::start(now);
            session.apply(&complete_delta(), now).unwrap();
            session.request_confirmation().unwrap();
            session
        }

        #[test]
        fn begin_marks_session_and_keeps_state() {
            let mut session = confirmed(Timestamp::now());
            let record = session.begin_submission().unwrap();

            assert_eq!(record.reference_id, "ABC12345");
            assert!(session.is_submitting());
            assert!(session.is_awaiting_confirmation());
        }

        #[test]
        fn second_begin_is_refused() {
            let mut session = confirmed(Timestamp::now());
            session.begin_submission().unwrap();
            assert_eq!(session.begin_submission().unwrap_err(), SessionError::SubmissionInProgress);
        }

        #[test]
        fn collecting_session_cannot_begin() {
            let mut session = IntakeSession::start(Timestamp::now());
            assert!(session.begin_submission().is_err());
            assert!(!session.is_submitting());
        }

        #[test]
        fn abort_allows_a_retry() {
            let now = Timestamp::now();
            let mut session = confirmed(now);
            session.begin_submission().unwrap();

            let later = now.plus(Duration::from_secs(5));
            session.abort_submission(later);
            assert!(!session.is_submitting());
            assert_eq!(session.last_active(), later);
            assert!(session.begin_submission().is_ok());
        }

        #[test]
        fn same_submission_requires_same_conversation() {
            let now = Timestamp::now();
            let mut claimed = confirmed(now);
            claimed.begin_submission().unwrap();

            let mut newer = confirmed(now.plus(Duration::from_secs(1)));
            newer.begin_submission().unwrap();

            assert!(claimed.is_same_submission(&claimed.clone()));
            assert!(!claimed.is_same_submission(&newer));
            assert!(!claimed.is_same_submission(&confirmed(now)));
        }
    }

    mod expiry {
        use super::*;

        const TIMEOUT: Duration = Duration::from_secs(300);

        #[test]
        fn idle_exactly_timeout_is_not_expired() {
            let start = Timestamp::now();
            let session = IntakeSession::start(start);
            assert!(!session.is_expired(start.plus(TIMEOUT), TIMEOUT));
        }

        #[test]
        fn idle_past_timeout_is_expired() {
            let start = Timestamp::now();
            let session = IntakeSession::start(start);
            assert!(session.is_expired(start.plus(TIMEOUT + Duration::from_secs(1)), TIMEOUT));
        }

        #[test]
        fn touch_never_moves_backwards() {
            let start = Timestamp::now();
            let mut session = IntakeSession::start(start);
            session.touch(start.minus(Duration::from_secs(60)));
            assert_eq!(session.last_active(), start);
        }
    }
}

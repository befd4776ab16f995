//! HandleInboundMessageHandler - The dialogue controller.
//!
//! Every inbound text message runs through the same fixed order: reset
//! command, idle timeout, session creation, confirmation reply, field
//! collection. Store reads and writes happen under the sender's lock;
//! network calls (classifier, persistence, notification) never do.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{SenderId, Timestamp};
use crate::domain::intake::{
    is_greeting, is_reset_command, replies, CompletedRecord, Confirmation, FieldDelta, FieldName,
    FieldRecord, IntakeSession, PatternExtractor, SessionError,
};
use crate::ports::{
    FieldClassifier, NotificationGateway, PersistenceGateway, SessionStore, SessionStoreError,
};

use super::SenderLocks;

/// Command to process one inbound text message.
#[derive(Debug, Clone)]
pub struct HandleInboundMessageCommand {
    pub sender: SenderId,
    pub text: String,
    /// Platform profile name, if the payload carried one.
    pub contact_name: Option<String>,
    pub received_at: Timestamp,
}

impl HandleInboundMessageCommand {
    pub fn new(sender: SenderId, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            contact_name: None,
            received_at: Timestamp::now(),
        }
    }

    pub fn with_contact_name(mut self, contact_name: Option<String>) -> Self {
        self.contact_name = contact_name;
        self
    }

    pub fn received_at(mut self, at: Timestamp) -> Self {
        self.received_at = at;
        self
    }
}

/// What the controller did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// Reset command; any session was dropped.
    ResetAcknowledged,
    /// Session had been idle too long; dropped without reading the message.
    SessionExpired,
    /// First contact was a bare greeting.
    Welcomed,
    /// Fields are still missing; the user was asked for them.
    FieldsRequested {
        captured: Vec<FieldName>,
        missing: Vec<FieldName>,
    },
    /// Record complete; summary sent with a yes/no question.
    ConfirmationRequested,
    /// Reply to the confirmation question was neither yes nor no.
    ConfirmationReprompted,
    /// User confirmed and the record was persisted.
    Submitted,
    /// User confirmed but persisting failed; session kept for a retry.
    SubmissionFailed,
    /// A confirmed record is still being persisted; the message was not read.
    SubmissionPending,
    /// User declined; session dropped.
    Discarded,
    /// Session changed while the classifier ran; its result was dropped.
    Superseded,
}

/// Errors from the dialogue controller.
///
/// The transport logs these and still acknowledges the message.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Session store error: {0}")]
    Store(#[from] SessionStoreError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Outcome plus the reply to send once the lock is released.
struct Turn {
    outcome: IntakeOutcome,
    reply: Option<String>,
}

impl Turn {
    fn reply(outcome: IntakeOutcome, text: String) -> Self {
        Self {
            outcome,
            reply: Some(text),
        }
    }

    fn silent(outcome: IntakeOutcome) -> Self {
        Self { outcome, reply: None }
    }
}

/// Work left after the sender's lock is released.
enum Pending {
    Done(Turn),
    Persist {
        claimed: IntakeSession,
        record: CompletedRecord,
    },
    Classify {
        captured: Vec<FieldName>,
        known: FieldRecord,
        created_at: Timestamp,
    },
}

/// Handler for inbound chat messages.
pub struct HandleInboundMessageHandler {
    sessions: Arc<dyn SessionStore>,
    notifier: Arc<dyn NotificationGateway>,
    records: Arc<dyn PersistenceGateway>,
    classifier: Option<Arc<dyn FieldClassifier>>,
    extractor: PatternExtractor,
    locks: SenderLocks,
    session_timeout: Duration,
}

impl HandleInboundMessageHandler {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        notifier: Arc<dyn NotificationGateway>,
        records: Arc<dyn PersistenceGateway>,
        session_timeout: Duration,
    ) -> Self {
        Self {
            sessions,
            notifier,
            records,
            classifier: None,
            extractor: PatternExtractor::default(),
            locks: SenderLocks::new(),
            session_timeout,
        }
    }

    /// Enables the free-text classifier fallback.
    pub fn with_classifier(mut self, classifier: Arc<dyn FieldClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn with_extractor(mut self, extractor: PatternExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub async fn handle(&self, cmd: HandleInboundMessageCommand) -> Result<IntakeOutcome, IntakeError> {
        let pending = {
            let _guard = self.locks.acquire(&cmd.sender).await;
            self.advance(&cmd).await?
        };

        let Turn { outcome, reply } = match pending {
            Pending::Done(turn) => turn,
            Pending::Persist { claimed, record } => self.persist(&cmd, claimed, record).await?,
            Pending::Classify {
                captured,
                known,
                created_at,
            } => self.classify(&cmd, captured, known, created_at).await?,
        };

        if let Some(text) = reply {
            self.notify(&cmd.sender, &text).await;
        }

        tracing::debug!(sender = %cmd.sender, outcome = ?outcome, "Inbound message handled");
        Ok(outcome)
    }

    /// Steps 1-5, run under the sender's lock.
    async fn advance(&self, cmd: &HandleInboundMessageCommand) -> Result<Pending, IntakeError> {
        let now = cmd.received_at;

        // 1. Reset beats everything, including expiry
        if is_reset_command(&cmd.text) {
            self.sessions.delete(&cmd.sender).await?;
            tracing::info!(sender = %cmd.sender, "Session reset by user");
            return Ok(Pending::Done(Turn::reply(
                IntakeOutcome::ResetAcknowledged,
                replies::reset_acknowledged(),
            )));
        }

        // 2. Expired sessions are dropped and the message is not processed
        let existing = self.sessions.get(&cmd.sender).await?;
        if let Some(session) = &existing {
            if session.is_expired(now, self.session_timeout) {
                self.sessions.delete(&cmd.sender).await?;
                tracing::info!(sender = %cmd.sender, "Session expired");
                return Ok(Pending::Done(Turn::reply(
                    IntakeOutcome::SessionExpired,
                    replies::session_expired(),
                )));
            }
        }

        // 3. First contact
        let mut session = match existing {
            Some(session) => session,
            None => {
                let session = IntakeSession::start(now).with_contact_name(cmd.contact_name.clone());
                tracing::info!(sender = %cmd.sender, "Session started");
                if is_greeting(&cmd.text) {
                    self.sessions.put(&cmd.sender, session).await?;
                    return Ok(Pending::Done(Turn::reply(IntakeOutcome::Welcomed, replies::welcome())));
                }
                session
            }
        };

        // 4. Confirmation reply
        if session.is_submitting() {
            return Ok(Pending::Done(Turn::reply(
                IntakeOutcome::SubmissionPending,
                replies::submission_in_progress(),
            )));
        }
        if session.is_awaiting_confirmation() {
            return self.on_confirmation_reply(cmd, session).await;
        }

        // 5. Collect fields
        let delta = self.extractor.extract(&cmd.text, session.fields());
        let captured = session.apply(&delta, now)?;

        if session.fields().is_complete() || self.classifier.is_none() {
            let turn = self.conclude_turn(&cmd.sender, session, captured).await?;
            return Ok(Pending::Done(turn));
        }

        let known = session.fields().clone();
        let created_at = session.created_at();
        self.sessions.put(&cmd.sender, session).await?;
        Ok(Pending::Classify {
            captured,
            known,
            created_at,
        })
    }

    async fn on_confirmation_reply(
        &self,
        cmd: &HandleInboundMessageCommand,
        mut session: IntakeSession,
    ) -> Result<Pending, IntakeError> {
        match Confirmation::parse(&cmd.text) {
            Some(Confirmation::Affirm) => {
                let record = session.begin_submission()?;
                session.touch(cmd.received_at);
                self.sessions.put(&cmd.sender, session.clone()).await?;
                Ok(Pending::Persist {
                    claimed: session,
                    record,
                })
            }
            Some(Confirmation::Decline) => {
                session.discard()?;
                self.sessions.delete(&cmd.sender).await?;
                tracing::info!(sender = %cmd.sender, "Intake discarded by user");
                Ok(Pending::Done(Turn::reply(IntakeOutcome::Discarded, replies::discarded())))
            }
            None => {
                session.touch(cmd.received_at);
                self.sessions.put(&cmd.sender, session).await?;
                Ok(Pending::Done(Turn::reply(
                    IntakeOutcome::ConfirmationReprompted,
                    replies::confirmation_reprompt(),
                )))
            }
        }
    }

    /// Stores the session and picks the reply for a collecting turn.
    async fn conclude_turn(
        &self,
        sender: &SenderId,
        mut session: IntakeSession,
        captured: Vec<FieldName>,
    ) -> Result<Turn, IntakeError> {
        match session.fields().to_completed() {
            Some(record) => {
                session.request_confirmation()?;
                self.sessions.put(sender, session).await?;
                tracing::info!(sender = %sender, "All fields collected, awaiting confirmation");
                Ok(Turn::reply(
                    IntakeOutcome::ConfirmationRequested,
                    replies::confirmation_summary(&record),
                ))
            }
            None => {
                let missing = session.fields().missing();
                self.sessions.put(sender, session).await?;
                let reply = replies::missing_fields_prompt(&captured, &missing);
                Ok(Turn::reply(IntakeOutcome::FieldsRequested { captured, missing }, reply))
            }
        }
    }

    async fn persist(
        &self,
        cmd: &HandleInboundMessageCommand,
        claimed: IntakeSession,
        record: CompletedRecord,
    ) -> Result<Turn, IntakeError> {
        let result = self.records.append(&record).await;

        let _guard = self.locks.acquire(&cmd.sender).await;
        // Only the claimed session is settled; a reset or newer one is left alone.
        let current = self
            .sessions
            .get(&cmd.sender)
            .await?
            .filter(|session| session.is_same_submission(&claimed));

        match result {
            Ok(()) => {
                if current.is_some() {
                    self.sessions.delete(&cmd.sender).await?;
                }
                tracing::info!(sender = %cmd.sender, "Intake record persisted");
                Ok(Turn::reply(IntakeOutcome::Submitted, replies::submitted()))
            }
            Err(e) => {
                tracing::error!(sender = %cmd.sender, error = %e, "Failed to persist intake record");
                if let Some(mut session) = current {
                    session.abort_submission(Timestamp::now().max(cmd.received_at));
                    self.sessions.put(&cmd.sender, session).await?;
                }
                Ok(Turn::reply(IntakeOutcome::SubmissionFailed, replies::submission_failed()))
            }
        }
    }

    async fn classify(
        &self,
        cmd: &HandleInboundMessageCommand,
        mut captured: Vec<FieldName>,
        known: FieldRecord,
        created_at: Timestamp,
    ) -> Result<Turn, IntakeError> {
        let delta = match &self.classifier {
            Some(classifier) => match classifier.classify(&cmd.text, &known).await {
                Ok(delta) => delta,
                Err(e) => {
                    tracing::warn!(
                        provider = classifier.provider_name(),
                        error = %e,
                        "Field classifier failed, continuing with pattern results"
                    );
                    FieldDelta::new()
                }
            },
            None => FieldDelta::new(),
        };

        let _guard = self.locks.acquire(&cmd.sender).await;
        let current = self.sessions.get(&cmd.sender).await?;
        let mut session = match current {
            Some(session) if session.created_at() == created_at && !session.is_awaiting_confirmation() => session,
            _ => {
                tracing::debug!(sender = %cmd.sender, "Session changed during classification, dropping result");
                return Ok(Turn::silent(IntakeOutcome::Superseded));
            }
        };

        for field in session.apply(&delta, cmd.received_at)? {
            if !captured.contains(&field) {
                captured.push(field);
            }
        }
        captured.sort();

        self.conclude_turn(&cmd.sender, session, captured).await
    }

    async fn notify(&self, to: &SenderId, text: &str) {
        if let Err(e) = self.notifier.send_text(to, text).await {
            tracing::warn!(sender = %to, error = %e, "Failed to deliver reply");
        }
    }
}

//! Ticket-id acquisition at the door.
//!
//! A [`ScanSession`] drives one organizer's scanner through
//! `Idle -> Scanning -> Decoded -> Verifying -> Finished`. Camera frames arrive
//! as a lazy stream of decode attempts produced by whatever QR decoder the
//! client uses; frames that fail to decode are skipped silently. The first
//! decoded id stops capture and is submitted to the validator exactly once.
//! [`ScanSession::scan`] does both steps; [`ScanSession::capture`] and
//! [`ScanSession::submit`] let a client show the decoded id in between.
//! Manual entry skips the camera and goes straight from `Idle` to `Verifying`.

use futures::{Stream, StreamExt};
use thiserror::Error;
use tracing::{debug, trace};

use crate::models::Admission;
use crate::services::{TicketError, TicketValidator};

/// A camera frame that did not contain a readable code.
#[derive(Debug, Error)]
#[error("frame not decoded: {0}")]
pub struct DecodeError(pub String);

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot {action} while the scanner is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("ticket id is empty")]
    EmptyTicketId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Scanning,
    Decoded(String),
    Verifying(String),
    Finished,
}

impl ScanState {
    fn name(&self) -> &'static str {
        match self {
            ScanState::Idle => "idle",
            ScanState::Scanning => "scanning",
            ScanState::Decoded(_) => "decoded",
            ScanState::Verifying(_) => "verifying",
            ScanState::Finished => "finished",
        }
    }

    /// The id being handled, once one has been read.
    pub fn ticket_id(&self) -> Option<&str> {
        match self {
            ScanState::Decoded(id) | ScanState::Verifying(id) => Some(id.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ScanOutcome {
    Admitted(Admission),
    Rejected { ticket_id: String, error: TicketError },
}

impl ScanOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, ScanOutcome::Admitted(_))
    }
}

pub struct ScanSession<V> {
    validator: V,
    organizer_id: String,
    state: ScanState,
    outcome: Option<ScanOutcome>,
}

impl<V: TicketValidator> ScanSession<V> {
    pub fn new(validator: V, organizer_id: impl Into<String>) -> Self {
        Self {
            validator,
            organizer_id: organizer_id.into(),
            state: ScanState::Idle,
            outcome: None,
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Result of the last verification, cleared by `reset` and `stop`.
    pub fn outcome(&self) -> Option<&ScanOutcome> {
        self.outcome.as_ref()
    }

    /// Arms the camera.
    pub fn start(&mut self) -> Result<(), ScanError> {
        self.require(ScanState::Idle, "start scanning")?;
        self.state = ScanState::Scanning;
        Ok(())
    }

    /// Consumes frames until one decodes, then verifies it.
    ///
    /// Returns `None` when the stream ends without a readable code, which puts
    /// the session back to `Idle`. Dropping the returned future cancels capture
    /// and leaves the session `Scanning`.
    pub async fn scan<S>(&mut self, frames: S) -> Result<Option<&ScanOutcome>, ScanError>
    where
        S: Stream<Item = Result<String, DecodeError>>,
    {
        if self.capture(frames).await?.is_none() {
            return Ok(None);
        }
        self.submit().await.map(Some)
    }

    /// Consumes frames until one decodes and stops in `Decoded` with its id.
    ///
    /// The stream is dropped as soon as a code is read. A stream that ends
    /// without one puts the session back to `Idle` and yields `None`.
    pub async fn capture<S>(&mut self, frames: S) -> Result<Option<&str>, ScanError>
    where
        S: Stream<Item = Result<String, DecodeError>>,
    {
        self.require(ScanState::Scanning, "scan")?;

        let decoded = {
            futures::pin_mut!(frames);
            let mut decoded = None;
            while let Some(frame) = frames.next().await {
                match frame {
                    Ok(text) if !text.trim().is_empty() => {
                        decoded = Some(text.trim().to_string());
                        break;
                    }
                    Ok(_) => {}
                    Err(err) => trace!(error = %err, "Skipping frame"),
                }
            }
            decoded
        };

        let Some(ticket_id) = decoded else {
            debug!("Frame stream ended without a decode");
            self.state = ScanState::Idle;
            return Ok(None);
        };

        self.state = ScanState::Decoded(ticket_id);
        Ok(self.state.ticket_id())
    }

    /// Verifies the id held in `Decoded`. A decoded id is submitted once.
    pub async fn submit(&mut self) -> Result<&ScanOutcome, ScanError> {
        let ScanState::Decoded(ticket_id) = &self.state else {
            return Err(ScanError::InvalidTransition {
                action: "submit a decoded ticket",
                state: self.state.name(),
            });
        };
        let ticket_id = ticket_id.clone();
        Ok(self.verify(ticket_id).await)
    }

    /// Verifies an id typed in by the organizer.
    pub async fn submit_manual(&mut self, text: &str) -> Result<&ScanOutcome, ScanError> {
        self.require(ScanState::Idle, "submit a ticket id")?;
        let ticket_id = text.trim();
        if ticket_id.is_empty() {
            return Err(ScanError::EmptyTicketId);
        }
        Ok(self.verify(ticket_id.to_string()).await)
    }

    /// Clears the last result and re-arms the camera.
    pub fn reset(&mut self) -> Result<(), ScanError> {
        self.require(ScanState::Finished, "reset")?;
        self.outcome = None;
        self.state = ScanState::Scanning;
        Ok(())
    }

    /// Closes the camera from any state.
    pub fn stop(&mut self) {
        self.outcome = None;
        self.state = ScanState::Idle;
    }

    async fn verify(&mut self, ticket_id: String) -> &ScanOutcome {
        self.state = ScanState::Verifying(ticket_id.clone());
        let outcome = match self.validator.validate(&ticket_id, &self.organizer_id).await {
            Ok(admission) => ScanOutcome::Admitted(admission),
            Err(error) => ScanOutcome::Rejected { ticket_id, error },
        };
        self.state = ScanState::Finished;
        self.outcome.insert(outcome)
    }

    fn require(&self, state: ScanState, action: &'static str) -> Result<(), ScanError> {
        if std::mem::discriminant(&self.state) == std::mem::discriminant(&state) {
            Ok(())
        } else {
            Err(ScanError::InvalidTransition {
                action,
                state: self.state.name(),
            })
        }
    }
}

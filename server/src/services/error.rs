use thiserror::Error;

use crate::store::StoreError;

/// Failure kinds surfaced by the booking, validation and event services.
///
/// Business-rule failures carry the message shown to the attendee or to the
/// organizer at the door, so each case stays distinguishable in the UI.
#[derive(Debug, Error)]
pub enum TicketError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("Event has already expired.")]
    Expired,

    #[error("Sold out.")]
    SoldOut,

    #[error("Ticket has already been used.")]
    AlreadyUsed,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("The request raced with another update; please try again.")]
    Conflict,

    #[error("Ticketing is temporarily unavailable.")]
    Transient(#[source] StoreError),

    #[error("{0}")]
    Invalid(String),
}

impl TicketError {
    pub fn event_not_found() -> Self {
        TicketError::NotFound("Event not found.")
    }

    pub fn ticket_not_found() -> Self {
        TicketError::NotFound("Ticket ID not found.")
    }

    pub fn foreign_ticket() -> Self {
        TicketError::Forbidden("This ticket belongs to another organizer's event.")
    }

    pub fn not_event_owner() -> Self {
        TicketError::Forbidden("Only the event's organizer can manage it.")
    }

    /// Translates a store failure that was not handled by a retry loop.
    pub(crate) fn from_store(err: StoreError, not_found: fn() -> TicketError) -> Self {
        match err {
            StoreError::NotFound => not_found(),
            StoreError::Conflict => TicketError::Conflict,
            other => TicketError::Transient(other),
        }
    }
}

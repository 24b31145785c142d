use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::TicketError;
use crate::models::{Admission, Booking, BookingStatus};
use crate::store::{StoreError, TicketStore};

/// What to do when a ticket points at an event that no longer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnershipPolicy {
    /// Skip the ownership check, so any organizer may check the ticket in.
    #[default]
    Permissive,
    /// Reject the ticket as foreign.
    Strict,
}

/// Seam between the scanner and whatever checks tickets in.
#[async_trait]
pub trait TicketValidator: Send + Sync {
    async fn validate(&self, ticket_id: &str, organizer_id: &str) -> Result<Admission, TicketError>;
}

/// Checks tickets in at the door. A ticket goes from `valid` to `used` at most once.
#[derive(Clone)]
pub struct ValidationService {
    store: Arc<dyn TicketStore>,
    ownership: OwnershipPolicy,
    conflict_retries: u32,
}

impl ValidationService {
    pub fn new(store: Arc<dyn TicketStore>, ownership: OwnershipPolicy, conflict_retries: u32) -> Self {
        Self {
            store,
            ownership,
            conflict_retries,
        }
    }

    /// Marks the ticket used and returns who it belongs to.
    ///
    /// `ticket_id` is the raw QR payload or manually typed id. Fails with
    /// `NotFound` for unknown ids, `Forbidden` when the ticket's event belongs to
    /// another organizer, and `AlreadyUsed` when it was checked in before. The
    /// status flip is a compare-and-set, so of two simultaneous scans of the same
    /// ticket exactly one is admitted.
    pub async fn validate_ticket(
        &self,
        ticket_id: &str,
        organizer_id: &str,
    ) -> Result<Admission, TicketError> {
        let booking_id =
            Uuid::parse_str(ticket_id.trim()).map_err(|_| TicketError::ticket_not_found())?;

        let mut attempt = 0;
        loop {
            let booking = self
                .store
                .get_booking(booking_id)
                .await
                .map_err(|err| TicketError::from_store(err, TicketError::ticket_not_found))?;

            self.check_ownership(&booking, organizer_id).await?;

            if booking.status == BookingStatus::Used {
                return Err(TicketError::AlreadyUsed);
            }

            match self
                .store
                .set_booking_status(booking.id, BookingStatus::Valid, BookingStatus::Used)
                .await
            {
                Ok(()) => {
                    info!(
                        booking_id = %booking.id,
                        event_id = %booking.event_id,
                        organizer_id,
                        "Ticket checked in"
                    );
                    return Ok(Admission {
                        ticket_id: booking.id,
                        attendee_name: booking.attendee_name().to_string(),
                    });
                }
                Err(StoreError::Conflict) if attempt < self.conflict_retries => {
                    attempt += 1;
                    debug!(booking_id = %booking.id, attempt, "Status changed concurrently, re-reading");
                }
                Err(StoreError::Conflict) => {
                    warn!(booking_id = %booking.id, attempt, "Validation retries exhausted");
                    return Err(TicketError::Conflict);
                }
                Err(err) => return Err(TicketError::from_store(err, TicketError::ticket_not_found)),
            }
        }
    }

    async fn check_ownership(&self, booking: &Booking, organizer_id: &str) -> Result<(), TicketError> {
        match self.store.get_event(booking.event_id).await {
            Ok(event) if event.organizer_id == organizer_id => Ok(()),
            Ok(_) => Err(TicketError::foreign_ticket()),
            Err(StoreError::NotFound) => match self.ownership {
                OwnershipPolicy::Permissive => {
                    // Deleted events leave their bookings behind; those stay redeemable.
                    warn!(
                        booking_id = %booking.id,
                        event_id = %booking.event_id,
                        "Ticket references a missing event, skipping ownership check"
                    );
                    Ok(())
                }
                OwnershipPolicy::Strict => Err(TicketError::foreign_ticket()),
            },
            Err(err) => Err(TicketError::Transient(err)),
        }
    }
}

#[async_trait]
impl TicketValidator for ValidationService {
    async fn validate(&self, ticket_id: &str, organizer_id: &str) -> Result<Admission, TicketError> {
        self.validate_ticket(ticket_id, organizer_id).await
    }
}

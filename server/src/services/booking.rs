use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::TicketError;
use crate::clock::Clock;
use crate::models::{Booking, EventSnapshot, NewBooking};
use crate::store::{StoreError, TicketStore};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub event_id: Uuid,
    pub user_id: String,
    pub user_email: String,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Issues tickets without ever selling more seats than an event has.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn TicketStore>,
    clock: Arc<dyn Clock>,
    conflict_retries: u32,
}

impl BookingService {
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>, conflict_retries: u32) -> Self {
        Self {
            store,
            clock,
            conflict_retries,
        }
    }

    /// Books one seat for the requesting user.
    ///
    /// Checks run in order: the event must exist, must not be dated before
    /// today, and must have a free seat. The seat is taken and the booking
    /// written in one store transaction. When that transaction loses the last
    /// seat to a concurrent booking, the whole check sequence is re-run against
    /// a fresh read, at most `conflict_retries` more times.
    pub async fn book_ticket(&self, request: BookingRequest) -> Result<Booking, TicketError> {
        let mut attempt = 0;
        loop {
            let event = self
                .store
                .get_event(request.event_id)
                .await
                .map_err(|err| TicketError::from_store(err, TicketError::event_not_found))?;

            if event.has_expired(self.clock.today()) {
                return Err(TicketError::Expired);
            }
            if event.is_sold_out() {
                return Err(TicketError::SoldOut);
            }

            let record = NewBooking {
                event_id: event.id,
                snapshot: EventSnapshot::from(&event),
                user_id: request.user_id.clone(),
                user_email: request.user_email.clone(),
                user_name: request.user_name.clone(),
                booked_at: self.clock.now(),
            };

            match self.store.commit_booking(record).await {
                Ok(booking) => {
                    info!(
                        booking_id = %booking.id,
                        event_id = %event.id,
                        user_id = %booking.user_id,
                        "Ticket booked"
                    );
                    return Ok(booking);
                }
                Err(StoreError::Conflict) if attempt < self.conflict_retries => {
                    attempt += 1;
                    debug!(event_id = %event.id, attempt, "Seat taken concurrently, re-checking");
                }
                Err(StoreError::Conflict) => {
                    warn!(event_id = %event.id, attempt, "Booking retries exhausted");
                    return Err(TicketError::Conflict);
                }
                Err(err) => return Err(TicketError::from_store(err, TicketError::event_not_found)),
            }
        }
    }

    pub async fn list_bookings_by_user(&self, user_id: &str) -> Result<Vec<Booking>, TicketError> {
        self.store
            .list_bookings_by_user(user_id)
            .await
            .map_err(|err| TicketError::from_store(err, TicketError::ticket_not_found))
    }

    pub async fn list_bookings_by_event(&self, event_id: Uuid) -> Result<Vec<Booking>, TicketError> {
        self.store
            .list_bookings_by_event(event_id)
            .await
            .map_err(|err| TicketError::from_store(err, TicketError::event_not_found))
    }
}

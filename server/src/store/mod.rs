//! Vendor-neutral data access for events and bookings.
//!
//! The only mutable shared state is an event's `booked_tickets` counter and a
//! booking's `status`. Implementations change both exclusively through
//! conditional writes: [`TicketStore::commit_booking`] increments the counter
//! only while capacity remains, and [`TicketStore::set_booking_status`] flips a
//! status only from the expected prior value. A lost race is reported as
//! [`StoreError::Conflict`] and the caller decides whether to re-read and retry.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, Event, NewBooking};

#[cfg(test)]
pub(crate) mod contended;
pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("conditional write lost to a concurrent update")]
    Conflict,

    #[error("store unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Unavailable(Box::new(other)),
        }
    }
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn get_event(&self, id: Uuid) -> StoreResult<Event>;

    async fn insert_event(&self, event: &Event) -> StoreResult<()>;

    /// All events, soonest first.
    async fn list_events(&self) -> StoreResult<Vec<Event>>;

    async fn list_events_by_organizer(&self, organizer_id: &str) -> StoreResult<Vec<Event>>;

    async fn delete_event(&self, id: Uuid) -> StoreResult<()>;

    /// Takes one seat on `record.event_id` and writes the booking, as a single
    /// transaction.
    ///
    /// Fails with `Conflict` when the event has no capacity left at commit time
    /// and with `NotFound` when the event no longer exists. Neither effect is
    /// applied on failure.
    async fn commit_booking(&self, record: NewBooking) -> StoreResult<Booking>;

    async fn get_booking(&self, id: Uuid) -> StoreResult<Booking>;

    /// Compare-and-set on a booking's status.
    async fn set_booking_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        new: BookingStatus,
    ) -> StoreResult<()>;

    /// A user's tickets, most recent first.
    async fn list_bookings_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>>;

    /// An event's attendees in booking order.
    async fn list_bookings_by_event(&self, event_id: Uuid) -> StoreResult<Vec<Booking>>;
}

//! Test store that loses a configurable number of conditional writes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

use super::{InMemoryStore, StoreError, StoreResult, TicketStore};
use crate::models::{Booking, BookingStatus, Event, NewBooking};

/// Wraps an [`InMemoryStore`] and answers the first `conflicts` calls to
/// `commit_booking` and `set_booking_status` with `Conflict` before letting
/// writes through.
pub struct ContendedStore {
    pub inner: InMemoryStore,
    conflicts: AtomicU32,
    pub event_reads: AtomicU32,
    pub booking_reads: AtomicU32,
    pub commits: AtomicU32,
    pub status_writes: AtomicU32,
}

impl ContendedStore {
    pub fn new(conflicts: u32) -> Self {
        Self {
            inner: InMemoryStore::new(),
            conflicts: AtomicU32::new(conflicts),
            event_reads: AtomicU32::new(0),
            booking_reads: AtomicU32::new(0),
            commits: AtomicU32::new(0),
            status_writes: AtomicU32::new(0),
        }
    }

    pub fn always() -> Self {
        Self::new(u32::MAX)
    }

    fn lose_race(&self) -> bool {
        self.conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl TicketStore for ContendedStore {
    async fn get_event(&self, id: Uuid) -> StoreResult<Event> {
        self.event_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_event(id).await
    }

    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        self.inner.insert_event(event).await
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        self.inner.list_events().await
    }

    async fn list_events_by_organizer(&self, organizer_id: &str) -> StoreResult<Vec<Event>> {
        self.inner.list_events_by_organizer(organizer_id).await
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<()> {
        self.inner.delete_event(id).await
    }

    async fn commit_booking(&self, record: NewBooking) -> StoreResult<Booking> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        if self.lose_race() {
            return Err(StoreError::Conflict);
        }
        self.inner.commit_booking(record).await
    }

    async fn get_booking(&self, id: Uuid) -> StoreResult<Booking> {
        self.booking_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_booking(id).await
    }

    async fn set_booking_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        new: BookingStatus,
    ) -> StoreResult<()> {
        self.status_writes.fetch_add(1, Ordering::SeqCst);
        if self.lose_race() {
            return Err(StoreError::Conflict);
        }
        self.inner.set_booking_status(id, expected, new).await
    }

    async fn list_bookings_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        self.inner.list_bookings_by_user(user_id).await
    }

    async fn list_bookings_by_event(&self, event_id: Uuid) -> StoreResult<Vec<Booking>> {
        self.inner.list_bookings_by_event(event_id).await
    }
}

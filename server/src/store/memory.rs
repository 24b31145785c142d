use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, TicketStore};
use crate::models::{Booking, BookingStatus, Event, NewBooking};

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<Uuid, Event>,
    bookings: HashMap<Uuid, Booking>,
}

/// Process-local store. Every write holds the table lock for its whole
/// check-and-write, which gives the same atomicity a database transaction does.
#[derive(Debug)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
    // Lets tests simulate an outage.
    online: AtomicBool,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Tables::default()),
            online: AtomicBool::new(true),
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".into()))
        }
    }
}

fn increment_booked_tickets(tables: &mut Tables, event_id: Uuid, delta: u16) -> StoreResult<()> {
    let event = tables
        .events
        .get_mut(&event_id)
        .ok_or(StoreError::NotFound)?;
    let next = event.booked_tickets + i32::from(delta);
    if next > event.total_tickets {
        return Err(StoreError::Conflict);
    }
    event.booked_tickets = next;
    Ok(())
}

fn create_booking(tables: &mut Tables, record: NewBooking) -> Booking {
    let booking = record.into_booking(Uuid::new_v4());
    tables.bookings.insert(booking.id, booking.clone());
    booking
}

#[async_trait]
impl TicketStore for InMemoryStore {
    async fn get_event(&self, id: Uuid) -> StoreResult<Event> {
        self.ensure_online()?;
        let tables = self.inner.read().await;
        tables.events.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        self.ensure_online()?;
        let mut tables = self.inner.write().await;
        tables.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        self.ensure_online()?;
        let tables = self.inner.read().await;
        let mut events: Vec<Event> = tables.events.values().cloned().collect();
        events.sort_by_key(|event| (event.date, event.time, event.created_at));
        Ok(events)
    }

    async fn list_events_by_organizer(&self, organizer_id: &str) -> StoreResult<Vec<Event>> {
        let mut events = self.list_events().await?;
        events.retain(|event| event.organizer_id == organizer_id);
        Ok(events)
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<()> {
        self.ensure_online()?;
        let mut tables = self.inner.write().await;
        tables
            .events
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn commit_booking(&self, record: NewBooking) -> StoreResult<Booking> {
        self.ensure_online()?;
        let mut tables = self.inner.write().await;
        increment_booked_tickets(&mut tables, record.event_id, 1)?;
        Ok(create_booking(&mut tables, record))
    }

    async fn get_booking(&self, id: Uuid) -> StoreResult<Booking> {
        self.ensure_online()?;
        let tables = self.inner.read().await;
        tables.bookings.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn set_booking_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        new: BookingStatus,
    ) -> StoreResult<()> {
        self.ensure_online()?;
        let mut tables = self.inner.write().await;
        let booking = tables.bookings.get_mut(&id).ok_or(StoreError::NotFound)?;
        if booking.status != expected {
            return Err(StoreError::Conflict);
        }
        booking.status = new;
        Ok(())
    }

    async fn list_bookings_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        self.ensure_online()?;
        let tables = self.inner.read().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|booking| booking.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));
        Ok(bookings)
    }

    async fn list_bookings_by_event(&self, event_id: Uuid) -> StoreResult<Vec<Booking>> {
        self.ensure_online()?;
        let tables = self.inner.read().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|booking| booking.event_id == event_id)
            .cloned()
            .collect();
        bookings.sort_by_key(|booking| booking.booked_at);
        Ok(bookings)
    }
}

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::{StoreError, StoreResult, TicketStore};
use crate::models::{Booking, BookingStatus, Event, NewBooking};

const EVENT_COLUMNS: &str = "id, organizer_id, title, description, location, \"date\", \"time\", \
     price, image_url, total_tickets, booked_tickets, created_at";

const BOOKING_COLUMNS: &str = "id, event_id, event_title, event_date, event_time, \
     event_location, user_id, user_email, user_name, status, booked_at";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn event_exists(conn: &mut PgConnection, id: Uuid) -> StoreResult<bool> {
    let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
        .bind(id)
        .fetch_one(conn)
        .await?;
    Ok(exists)
}

/// Conditional increment; must run on the same connection as the booking insert.
pub async fn increment_booked_tickets(
    conn: &mut PgConnection,
    event_id: Uuid,
    delta: u16,
) -> StoreResult<()> {
    let result = sqlx::query(
        "UPDATE events SET booked_tickets = booked_tickets + $2 \
         WHERE id = $1 AND booked_tickets + $2 <= total_tickets",
    )
    .bind(event_id)
    .bind(i32::from(delta))
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }
    if event_exists(conn, event_id).await? {
        debug!(%event_id, "Capacity exhausted at commit");
        Err(StoreError::Conflict)
    } else {
        Err(StoreError::NotFound)
    }
}

pub async fn create_booking(conn: &mut PgConnection, record: NewBooking) -> StoreResult<Booking> {
    let booking = record.into_booking(Uuid::new_v4());
    sqlx::query(&format!(
        "INSERT INTO bookings ({BOOKING_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
    ))
    .bind(booking.id)
    .bind(booking.event_id)
    .bind(&booking.snapshot.event_title)
    .bind(booking.snapshot.event_date)
    .bind(booking.snapshot.event_time)
    .bind(&booking.snapshot.event_location)
    .bind(&booking.user_id)
    .bind(&booking.user_email)
    .bind(&booking.user_name)
    .bind(booking.status)
    .bind(booking.booked_at)
    .execute(conn)
    .await?;
    Ok(booking)
}

#[async_trait]
impl TicketStore for PgStore {
    async fn get_event(&self, id: Uuid) -> StoreResult<Event> {
        sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn insert_event(&self, event: &Event) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO events ({EVENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(event.id)
        .bind(&event.organizer_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location)
        .bind(event.date)
        .bind(event.time)
        .bind(event.price)
        .bind(&event.image_url)
        .bind(event.total_tickets)
        .bind(event.booked_tickets)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_events(&self) -> StoreResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY \"date\" ASC, \"time\" ASC, created_at ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn list_events_by_organizer(&self, organizer_id: &str) -> StoreResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE organizer_id = $1 \
             ORDER BY \"date\" ASC, \"time\" ASC, created_at ASC"
        ))
        .bind(organizer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn commit_booking(&self, record: NewBooking) -> StoreResult<Booking> {
        let mut tx = self.pool.begin().await?;
        increment_booked_tickets(&mut *tx, record.event_id, 1).await?;
        let booking = create_booking(&mut *tx, record).await?;
        tx.commit().await?;
        Ok(booking)
    }

    async fn get_booking(&self, id: Uuid) -> StoreResult<Booking> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)
    }

    async fn set_booking_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        new: BookingStatus,
    ) -> StoreResult<()> {
        let result = sqlx::query("UPDATE bookings SET status = $3 WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(expected)
            .bind(new)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 1 {
            return Ok(());
        }

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bookings WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        if exists {
            debug!(booking_id = %id, %expected, "Status changed underneath compare-and-set");
            Err(StoreError::Conflict)
        } else {
            Err(StoreError::NotFound)
        }
    }

    async fn list_bookings_by_user(&self, user_id: &str) -> StoreResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY booked_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }

    async fn list_bookings_by_event(&self, event_id: Uuid) -> StoreResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE event_id = $1 ORDER BY booked_at ASC"
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(bookings)
    }
}

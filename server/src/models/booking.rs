use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use super::event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
pub enum BookingStatus {
    Valid,
    Used,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Valid => write!(f, "valid"),
            BookingStatus::Used => write!(f, "used"),
        }
    }
}

/// Event details frozen onto the ticket when it is issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventSnapshot {
    pub event_title: String,
    pub event_date: NaiveDate,
    pub event_time: NaiveTime,
    pub event_location: String,
}

impl From<&Event> for EventSnapshot {
    fn from(event: &Event) -> Self {
        Self {
            event_title: event.title.clone(),
            event_date: event.date,
            event_time: event.time,
            event_location: event.location.clone(),
        }
    }
}

/// An issued ticket. `id` is also the QR payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub event_id: Uuid,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub snapshot: EventSnapshot,
    pub user_id: String,
    pub user_email: String,
    pub user_name: Option<String>,
    pub status: BookingStatus,
    pub booked_at: DateTime<Utc>,
}

impl Booking {
    pub fn qr_payload(&self) -> String {
        self.id.to_string()
    }

    /// Name shown to the organizer at check-in.
    pub fn attendee_name(&self) -> &str {
        self.user_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.user_email)
    }
}

/// Everything needed to write a booking row, minus the store-assigned id.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub event_id: Uuid,
    pub snapshot: EventSnapshot,
    pub user_id: String,
    pub user_email: String,
    pub user_name: Option<String>,
    pub booked_at: DateTime<Utc>,
}

impl NewBooking {
    pub fn into_booking(self, id: Uuid) -> Booking {
        Booking {
            id,
            event_id: self.event_id,
            snapshot: self.snapshot,
            user_id: self.user_id,
            user_email: self.user_email,
            user_name: self.user_name,
            status: BookingStatus::Valid,
            booked_at: self.booked_at,
        }
    }
}

/// Result of a successful check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    pub ticket_id: Uuid,
    pub attendee_name: String,
}

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Shown on event cards when the organizer did not upload an image.
pub const DEFAULT_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1492684223066-81342ee5ff30?auto=format&fit=crop&q=80&w=1000";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub organizer_id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub price: i64,
    pub image_url: Option<String>,
    pub total_tickets: i32,
    pub booked_tickets: i32,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn remaining_tickets(&self) -> i32 {
        (self.total_tickets - self.booked_tickets).max(0)
    }

    pub fn is_sold_out(&self) -> bool {
        self.booked_tickets >= self.total_tickets
    }

    /// Events dated today are still open; only strictly earlier dates have expired.
    pub fn has_expired(&self, today: NaiveDate) -> bool {
        self.date < today
    }
}

/// An event as listed to attendees, with the seats still on sale.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub remaining_tickets: i32,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        Self {
            remaining_tickets: event.remaining_tickets(),
            event,
        }
    }
}

/// Organizer-submitted fields for a new event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub location: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub price: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    pub total_tickets: i32,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn event(organizer_id: &str, date: NaiveDate, total_tickets: i32) -> Event {
        Event {
            id: Uuid::new_v4(),
            organizer_id: organizer_id.to_string(),
            title: "Rooftop Jazz".to_string(),
            description: Some("Live quartet".to_string()),
            location: "Quetta Arts Council".to_string(),
            date,
            time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
            price: 1500,
            image_url: None,
            total_tickets,
            booked_tickets: 0,
            created_at: Utc::now(),
        }
    }
}

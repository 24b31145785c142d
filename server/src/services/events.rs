use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::error::TicketError;
use crate::clock::Clock;
use crate::models::{Event, NewEvent, DEFAULT_IMAGE_URL};
use crate::store::TicketStore;

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn TicketStore>,
    clock: Arc<dyn Clock>,
}

impl EventService {
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn create_event(&self, organizer_id: &str, input: NewEvent) -> Result<Event, TicketError> {
        if organizer_id.trim().is_empty() {
            return Err(TicketError::Invalid("organizerId is required".to_string()));
        }
        if input.title.trim().is_empty() {
            return Err(TicketError::Invalid("Title is required".to_string()));
        }
        if input.location.trim().is_empty() {
            return Err(TicketError::Invalid("Location is required".to_string()));
        }
        if input.total_tickets <= 0 {
            return Err(TicketError::Invalid(
                "Total tickets must be a positive number".to_string(),
            ));
        }
        if input.price < 0 {
            return Err(TicketError::Invalid("Price cannot be negative".to_string()));
        }
        if input.date < self.clock.today() {
            return Err(TicketError::Invalid(
                "You cannot schedule an event in the past!".to_string(),
            ));
        }

        let image_url = input
            .image_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string());

        let event = Event {
            id: Uuid::new_v4(),
            organizer_id: organizer_id.to_string(),
            title: input.title.trim().to_string(),
            description: input.description,
            location: input.location.trim().to_string(),
            date: input.date,
            time: input.time,
            price: input.price,
            image_url: Some(image_url),
            total_tickets: input.total_tickets,
            booked_tickets: 0,
            created_at: self.clock.now(),
        };

        self.store
            .insert_event(&event)
            .await
            .map_err(|err| TicketError::from_store(err, TicketError::event_not_found))?;

        info!(event_id = %event.id, organizer_id, capacity = event.total_tickets, "Event created");
        Ok(event)
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Event, TicketError> {
        self.store
            .get_event(id)
            .await
            .map_err(|err| TicketError::from_store(err, TicketError::event_not_found))
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, TicketError> {
        self.store
            .list_events()
            .await
            .map_err(|err| TicketError::from_store(err, TicketError::event_not_found))
    }

    pub async fn list_events_by_organizer(&self, organizer_id: &str) -> Result<Vec<Event>, TicketError> {
        self.store
            .list_events_by_organizer(organizer_id)
            .await
            .map_err(|err| TicketError::from_store(err, TicketError::event_not_found))
    }

    /// Removes an event. Issued bookings are left in place.
    pub async fn delete_event(&self, id: Uuid, organizer_id: &str) -> Result<(), TicketError> {
        let event = self.get_event(id).await?;
        if event.organizer_id != organizer_id {
            return Err(TicketError::not_event_owner());
        }

        self.store
            .delete_event(id)
            .await
            .map_err(|err| TicketError::from_store(err, TicketError::event_not_found))?;

        info!(event_id = %id, organizer_id, "Event deleted");
        Ok(())
    }
}

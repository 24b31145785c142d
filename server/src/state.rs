use std::sync::Arc;

use crate::clock::Clock;
use crate::config::Config;
use crate::services::{BookingService, EventService, ValidationService};
use crate::store::TicketStore;

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub events: EventService,
    pub bookings: BookingService,
    pub validation: ValidationService,
}

impl AppState {
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>, config: &Config) -> Self {
        Self {
            events: EventService::new(Arc::clone(&store), Arc::clone(&clock)),
            bookings: BookingService::new(Arc::clone(&store), clock, config.conflict_retries),
            validation: ValidationService::new(
                store,
                config.ownership_policy,
                config.conflict_retries,
            ),
        }
    }
}

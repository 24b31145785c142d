pub mod booking;
pub mod error;
pub mod events;
pub mod validation;

pub use booking::{BookingRequest, BookingService};
pub use error::TicketError;
pub use events::EventService;
pub use validation::{OwnershipPolicy, TicketValidator, ValidationService};

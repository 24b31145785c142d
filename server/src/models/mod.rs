pub mod booking;
pub mod event;

pub use booking::{Admission, Booking, BookingStatus, EventSnapshot, NewBooking};
pub use event::{Event, EventView, NewEvent, DEFAULT_IMAGE_URL};

//! Event ticketing server: organizers publish events, attendees book seats,
//! and organizers check tickets in at the door.
//!
//! The booking and check-in paths guarantee that an event is never oversold
//! and that a ticket is admitted at most once, however many requests race.

pub mod clock;
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod scanner;
pub mod services;
pub mod state;
pub mod store;
pub mod utils;

//! Races against the last seats of an event and against a single ticket.
//!
//! Each test fires many concurrent requests on a multi-threaded runtime and
//! checks that capacity and single use hold regardless of interleaving.

use chrono::{NaiveDate, NaiveTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use uuid::Uuid;

use quetta_server::clock::FixedClock;
use quetta_server::models::{Booking, BookingStatus, Event};
use quetta_server::services::{
    BookingRequest, BookingService, OwnershipPolicy, TicketError, ValidationService,
};
use quetta_server::store::{InMemoryStore, TicketStore};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
}

fn event(total_tickets: i32, booked_tickets: i32) -> Event {
    Event {
        id: Uuid::new_v4(),
        organizer_id: "org-1".to_string(),
        title: "Spring Mushaira".to_string(),
        description: None,
        location: "Quetta Serena".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 2, 12).unwrap(),
        time: NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
        price: 500,
        image_url: None,
        total_tickets,
        booked_tickets,
        created_at: Utc::now(),
    }
}

fn booking_service(store: Arc<InMemoryStore>) -> BookingService {
    BookingService::new(store, Arc::new(FixedClock::on(today())), 3)
}

fn request(event_id: Uuid, n: usize) -> BookingRequest {
    BookingRequest {
        event_id,
        user_id: format!("user-{n}"),
        user_email: format!("user-{n}@example.com"),
        user_name: None,
    }
}

async fn book_concurrently(
    service: &BookingService,
    event_id: Uuid,
    attempts: usize,
) -> Vec<Result<Booking, TicketError>> {
    let handles: Vec<_> = (0..attempts)
        .map(|n| {
            let service = service.clone();
            tokio::spawn(async move { service.book_ticket(request(event_id, n)).await })
        })
        .collect();

    join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("booking task panicked"))
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_two_buyers_race_for_the_last_seat() {
    let store = Arc::new(InMemoryStore::new());
    let event = event(1, 0);
    store.insert_event(&event).await.unwrap();
    let service = booking_service(store.clone());

    let results = book_concurrently(&service, event.id, 2).await;

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].status, BookingStatus::Valid);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(TicketError::SoldOut)))
            .count(),
        1
    );
    assert_eq!(store.get_event(event.id).await.unwrap().booked_tickets, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_exactly_the_remaining_seats_are_sold() {
    let store = Arc::new(InMemoryStore::new());
    let event = event(10, 4);
    store.insert_event(&event).await.unwrap();
    let service = booking_service(store.clone());

    let results = book_concurrently(&service, event.id, 50).await;

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let sold_out = results
        .iter()
        .filter(|r| matches!(r, Err(TicketError::SoldOut)))
        .count();
    assert_eq!(successes, 6);
    assert_eq!(sold_out, 44);

    assert_eq!(store.get_event(event.id).await.unwrap().booked_tickets, 10);
    assert_eq!(store.list_bookings_by_event(event.id).await.unwrap().len(), 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_fewer_buyers_than_seats_all_succeed() {
    let store = Arc::new(InMemoryStore::new());
    let event = event(100, 0);
    store.insert_event(&event).await.unwrap();
    let service = booking_service(store.clone());

    let results = book_concurrently(&service, event.id, 30).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(store.get_event(event.id).await.unwrap().booked_tickets, 30);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_simultaneous_scans_admit_a_ticket_once() {
    let store = Arc::new(InMemoryStore::new());
    let event = event(5, 0);
    store.insert_event(&event).await.unwrap();
    let ticket = booking_service(store.clone())
        .book_ticket(request(event.id, 1))
        .await
        .unwrap();
    let validation = ValidationService::new(store.clone(), OwnershipPolicy::Permissive, 3);

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let validation = validation.clone();
            let ticket_id = ticket.id.to_string();
            tokio::spawn(async move { validation.validate_ticket(&ticket_id, "org-1").await })
        })
        .collect();
    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("validation task panicked"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(TicketError::AlreadyUsed)))
            .count(),
        19
    );
    assert_eq!(
        store.get_booking(ticket.id).await.unwrap().status,
        BookingStatus::Used
    );
}

#[tokio::test]
async fn test_counter_and_status_only_move_forward() {
    let store = Arc::new(InMemoryStore::new());
    let event = event(3, 0);
    store.insert_event(&event).await.unwrap();
    let bookings = booking_service(store.clone());
    let validation = ValidationService::new(store.clone(), OwnershipPolicy::Permissive, 3);

    let mut last_count = 0;
    let mut issued = Vec::new();
    for n in 0..6 {
        if let Ok(booking) = bookings.book_ticket(request(event.id, n)).await {
            issued.push(booking);
        }
        if let Some(ticket) = issued.first() {
            let _ = validation.validate_ticket(&ticket.id.to_string(), "org-1").await;
        }

        let count = store.get_event(event.id).await.unwrap().booked_tickets;
        assert!(count >= last_count);
        assert!(count <= event.total_tickets);
        last_count = count;
    }

    assert_eq!(issued.len(), 3);
    let first = store.get_booking(issued[0].id).await.unwrap();
    assert_eq!(first.status, BookingStatus::Used);
}

//! Door scanning wired to the real validation service.

use chrono::{NaiveDate, NaiveTime, Utc};
use futures::stream;
use std::sync::Arc;
use uuid::Uuid;

use quetta_server::clock::FixedClock;
use quetta_server::models::Event;
use quetta_server::scanner::{DecodeError, ScanOutcome, ScanSession, ScanState};
use quetta_server::services::{
    BookingRequest, BookingService, OwnershipPolicy, TicketError, ValidationService,
};
use quetta_server::store::{InMemoryStore, TicketStore};

async fn issued_ticket(store: Arc<InMemoryStore>) -> String {
    let event = Event {
        id: Uuid::new_v4(),
        organizer_id: "org-1".to_string(),
        title: "Gala".to_string(),
        description: None,
        location: "Jinnah Road".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 2, 12).unwrap(),
        time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        price: 0,
        image_url: None,
        total_tickets: 10,
        booked_tickets: 0,
        created_at: Utc::now(),
    };
    store.insert_event(&event).await.unwrap();

    let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()));
    BookingService::new(store, clock, 3)
        .book_ticket(BookingRequest {
            event_id: event.id,
            user_id: "user-1".to_string(),
            user_email: "ayesha@example.com".to_string(),
            user_name: Some("Ayesha".to_string()),
        })
        .await
        .unwrap()
        .qr_payload()
}

#[tokio::test]
async fn test_scan_admit_reset_and_rescan_same_code() {
    let store = Arc::new(InMemoryStore::new());
    let payload = issued_ticket(store.clone()).await;
    let validation = ValidationService::new(store, OwnershipPolicy::Permissive, 3);
    let mut session = ScanSession::new(validation, "org-1");

    session.start().unwrap();
    let frames = stream::iter(vec![
        Err(DecodeError("glare".to_string())),
        Ok(payload.clone()),
        Ok(payload.clone()),
    ]);
    match session.scan(frames).await.unwrap() {
        Some(ScanOutcome::Admitted(admission)) => assert_eq!(admission.attendee_name, "Ayesha"),
        other => panic!("expected admission, got {other:?}"),
    }

    session.reset().unwrap();
    let outcome = session
        .scan(stream::iter(vec![Ok(payload.clone())]))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        Some(ScanOutcome::Rejected {
            error: TicketError::AlreadyUsed,
            ..
        })
    ));
    assert_eq!(session.state(), &ScanState::Finished);
}

#[tokio::test]
async fn test_wrong_organizer_scan_is_rejected() {
    let store = Arc::new(InMemoryStore::new());
    let payload = issued_ticket(store.clone()).await;
    let validation = ValidationService::new(store, OwnershipPolicy::Permissive, 3);
    let mut session = ScanSession::new(validation, "org-2");

    let outcome = session.submit_manual(&payload).await.unwrap();

    assert!(matches!(
        outcome,
        ScanOutcome::Rejected {
            error: TicketError::Forbidden(_),
            ..
        }
    ));
}

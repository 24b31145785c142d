use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;
use uuid::Uuid;

use crate::services::BookingRequest;
use crate::state::AppState;
use crate::utils::{AppError, AppJson, AppPath, AppQuery};
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub organizer_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingFilter {
    pub user_id: Option<String>,
    pub event_id: Option<Uuid>,
}

pub async fn create_booking(
    State(state): State<AppState>,
    AppJson(request): AppJson<BookingRequest>,
) -> Result<Response, AppError> {
    if request.user_id.trim().is_empty() || request.user_email.trim().is_empty() {
        return Err(AppError::ValidationError(
            "userId and userEmail are required".to_string(),
        ));
    }

    let booking = state.bookings.book_ticket(request).await?;
    Ok(created(booking, "Ticket booked"))
}

pub async fn validate_booking(
    State(state): State<AppState>,
    AppPath(ticket_id): AppPath<String>,
    AppJson(request): AppJson<ValidateRequest>,
) -> Result<Response, AppError> {
    let admission = state
        .validation
        .validate_ticket(&ticket_id, &request.organizer_id)
        .await?;
    let message = format!("Welcome, {}!", admission.attendee_name);
    Ok(success(admission, message))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<BookingFilter>,
) -> Result<Response, AppError> {
    let bookings = match (filter.user_id, filter.event_id) {
        (Some(user_id), None) => state.bookings.list_bookings_by_user(&user_id).await?,
        (None, Some(event_id)) => state.bookings.list_bookings_by_event(event_id).await?,
        _ => {
            return Err(AppError::ValidationError(
                "Provide exactly one of userId or eventId".to_string(),
            ))
        }
    };
    Ok(success(bookings, "Bookings retrieved"))
}

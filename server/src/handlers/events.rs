use axum::extract::State;
use axum::response::Response;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{EventView, NewEvent};
use crate::state::AppState;
use crate::utils::{AppError, AppJson, AppPath, AppQuery};
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub organizer_id: String,
    #[serde(flatten)]
    pub event: NewEvent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    pub organizer_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub organizer_id: String,
}

pub async fn list_events(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<EventFilter>,
) -> Result<Response, AppError> {
    let events = match filter.organizer_id {
        Some(organizer_id) => state.events.list_events_by_organizer(&organizer_id).await?,
        None => state.events.list_events().await?,
    };
    let events: Vec<EventView> = events.into_iter().map(EventView::from).collect();
    Ok(success(events, "Events retrieved"))
}

pub async fn create_event(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateEventRequest>,
) -> Result<Response, AppError> {
    let event = state
        .events
        .create_event(&request.organizer_id, request.event)
        .await?;
    Ok(created(EventView::from(event), "Event created"))
}

pub async fn get_event(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Response, AppError> {
    let event = state.events.get_event(id).await?;
    Ok(success(EventView::from(event), "Event retrieved"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppQuery(owner): AppQuery<OwnerQuery>,
) -> Result<Response, AppError> {
    state.events.delete_event(id, &owner.organizer_id).await?;
    Ok(empty_success("Event deleted"))
}

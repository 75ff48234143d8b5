//! Event CRUD in the calendar widget's wire shape.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use booking_core::{Attributes, Event, EventDraft, DEFAULT_COLOR};
use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::state::AppState;

/// Event as the calendar widget reads it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    pub id: String,
    pub title: String,
    pub start: String,
    pub all_day: bool,
    pub background_color: String,
    pub border_color: String,
    pub extended_props: Attributes,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        let color = event.color.unwrap_or_else(|| DEFAULT_COLOR.to_string());
        Self {
            id: event.id,
            title: event.title,
            start: event.start,
            all_day: event.all_day,
            background_color: color.clone(),
            border_color: color,
            extended_props: event.attributes,
        }
    }
}

/// Create/update body sent by the booking form.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub extended_props: Option<Attributes>,
}

impl From<EventPayload> for EventDraft {
    fn from(payload: EventPayload) -> Self {
        Self {
            id: payload.id,
            title: payload.title,
            start: payload.start,
            all_day: payload.all_day,
            color: payload.background_color,
            attributes: payload.extended_props.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub participant: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// GET /events - All events by date, optionally for one participant
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<EventView>>, ApiError> {
    let participant = query
        .participant
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    let events = state.with_bookings(|bookings| Ok(bookings.list_bookings(participant)?))?;
    Ok(Json(events.into_iter().map(EventView::from).collect()))
}

/// GET /events/{id}
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventView>, ApiError> {
    let event = state.with_bookings(|bookings| Ok(bookings.get_booking(&id)?))?;
    event
        .map(|event| Json(event.into()))
        .ok_or_else(|| ApiError::NotFound(format!("event not found: {id}")))
}

/// POST /events - Create after the double-booking check
async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<EventPayload>,
) -> Result<(StatusCode, Json<WriteResponse>), ApiError> {
    let event = state.with_bookings(|bookings| Ok(bookings.create_booking(payload.into())?))?;
    Ok((
        StatusCode::CREATED,
        Json(WriteResponse {
            ok: true,
            id: Some(event.id),
        }),
    ))
}

/// PUT /events/{id} - Full replace, checked with its own id excluded
async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<EventPayload>,
) -> Result<Json<WriteResponse>, ApiError> {
    let event =
        state.with_bookings(|bookings| Ok(bookings.update_booking(&id, payload.into())?))?;
    Ok(Json(WriteResponse {
        ok: true,
        id: Some(event.id),
    }))
}

/// DELETE /events/{id}
async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WriteResponse>, ApiError> {
    state.with_bookings(|bookings| Ok(bookings.cancel_booking(&id)?))?;
    Ok(Json(WriteResponse { ok: true, id: None }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
}

// Event HTTP routes: browsing, RSVP admission and admin lifecycle

use crate::auth::middleware::{AuthState, AuthUser, FromRef};
use crate::services::EventService;
use crate::storage::StorageBackend;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use rsvp_core::{Event, EventError, EventWithAttendees};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use super::common::{parse_path_id, ApiError, ErrorResponse, ListResponse, MessageResponse};

/// Request to create an event. Every field is required.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[schema(example = "Rust Meetup")]
    pub name: Option<String>,
    /// RFC 3339 timestamp, `YYYY-MM-DDTHH:MM[:SS]` (UTC) or `YYYY-MM-DD`.
    #[schema(example = "2030-06-01T19:00:00Z")]
    pub date: Option<String>,
    #[schema(example = "Community Hall, Room 2")]
    pub location: Option<String>,
    /// Number of seats. Zero is allowed.
    #[schema(example = 25, minimum = 0)]
    pub capacity: Option<i64>,
    #[schema(example = "meetup")]
    pub event_type: Option<String>,
}

/// Request to update an event. Only provided fields will be updated;
/// RSVPs are never changed.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    pub date: Option<String>,
    pub location: Option<String>,
    /// New number of open seats.
    #[schema(minimum = 0)]
    pub capacity: Option<i64>,
    pub event_type: Option<String>,
}

/// RSVP request body
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RsvpRequest {
    #[schema(example = "01930000-0000-7000-8000-000000000001")]
    pub user_id: Option<String>,
}

/// Result of a successful RSVP
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RsvpResponse {
    #[schema(example = "RSVP successful!")]
    pub message: String,
    pub event: Event,
}

/// Query parameters for listing events
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListEventsQuery {
    /// Exact event type to filter by
    pub event_type: Option<String>,
}

/// App state for event routes
#[derive(Clone)]
pub struct EventsState {
    pub service: Arc<EventService>,
    pub auth: AuthState,
}

impl EventsState {
    pub fn new(db: Arc<StorageBackend>, auth: AuthState) -> Self {
        Self {
            service: Arc::new(EventService::new(db)),
            auth,
        }
    }
}

impl FromRef<EventsState> for AuthState {
    fn from_ref(input: &EventsState) -> Self {
        input.auth.clone()
    }
}

/// Create event routes
pub fn routes(state: EventsState) -> Router {
    Router::new()
        .route("/events", get(list_events))
        .route("/events/create", post(create_event))
        .route("/events/user/:user_id", get(list_user_rsvps))
        .route("/events/delete/:event_id", delete(delete_event))
        .route("/events/:event_id", get(get_event).patch(update_event))
        .route("/events/:event_id/rsvp", post(request_rsvp))
        .with_state(state)
}

/// POST /events/create - Create a new event (admin)
#[utoipa::path(
    post,
    path = "/events/create",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created successfully", body = Event),
        (status = 400, description = "Missing or invalid field", body = ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<EventsState>,
    auth: AuthUser,
    req: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let Json(req) = req?;
    let event = state.service.create(&auth.identity(), req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /events - List events, optionally filtered by type
#[utoipa::path(
    get,
    path = "/events",
    params(ListEventsQuery),
    responses(
        (status = 200, description = "List of events", body = ListResponse<Event>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<EventsState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<ListResponse<Event>>, ApiError> {
    let events = state.service.list(query.event_type.as_deref()).await?;
    Ok(Json(ListResponse::new(events)))
}

/// GET /events/{event_id} - Get event by ID
#[utoipa::path(
    get,
    path = "/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn get_event(
    State(state): State<EventsState>,
    Path(event_id): Path<String>,
) -> Result<Json<Event>, ApiError> {
    let event_id = parse_path_id(&event_id, "Event")?;
    Ok(Json(state.service.get(event_id).await?))
}

/// PATCH /events/{event_id} - Update event fields (admin)
#[utoipa::path(
    patch,
    path = "/events/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated successfully", body = Event),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn update_event(
    State(state): State<EventsState>,
    auth: AuthUser,
    Path(event_id): Path<String>,
    req: Result<Json<UpdateEventRequest>, JsonRejection>,
) -> Result<Json<Event>, ApiError> {
    let event_id = parse_path_id(&event_id, "Event")?;
    let Json(req) = req?;
    let event = state
        .service
        .update(&auth.identity(), event_id, req)
        .await?;
    Ok(Json(event))
}

/// POST /events/{event_id}/rsvp - RSVP a user to an event
///
/// Consumes one seat. Rejected with 400 when no seats are left or the user
/// already holds an RSVP.
#[utoipa::path(
    post,
    path = "/events/{event_id}/rsvp",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = RsvpRequest,
    responses(
        (status = 200, description = "RSVP accepted", body = RsvpResponse),
        (status = 400, description = "Missing user ID, no seats available, or duplicate RSVP", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn request_rsvp(
    State(state): State<EventsState>,
    Path(event_id): Path<String>,
    req: Result<Json<RsvpRequest>, JsonRejection>,
) -> Result<Json<RsvpResponse>, ApiError> {
    let Json(req) = req?;
    let user_id = req.user_id.as_deref();
    let event_id = match parse_path_id(&event_id, "Event") {
        Ok(id) => id,
        // A missing user id is reported before the event lookup
        Err(_) if user_id.map_or(true, |u| u.trim().is_empty()) => {
            return Err(EventError::invalid_input("User ID is required").into())
        }
        Err(e) => return Err(e),
    };
    let event = state.service.request_rsvp(event_id, user_id).await?;

    Ok(Json(RsvpResponse {
        message: "RSVP successful!".to_string(),
        event,
    }))
}

/// GET /events/user/{user_id} - Events a user has RSVP'd to
#[utoipa::path(
    get,
    path = "/events/user/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Events with resolved attendees", body = ListResponse<EventWithAttendees>),
        (status = 404, description = "No RSVP'd events", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn list_user_rsvps(
    State(state): State<EventsState>,
    Path(user_id): Path<String>,
) -> Result<Json<ListResponse<EventWithAttendees>>, ApiError> {
    let user_id = parse_path_id(&user_id, "RSVP'd events")?;
    let events = state.service.list_user_rsvps(user_id).await?;
    Ok(Json(ListResponse::new(events)))
}

/// DELETE /events/delete/{event_id} - Delete an event (admin)
#[utoipa::path(
    delete,
    path = "/events/delete/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event deleted successfully", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    tag = "events"
)]
pub async fn delete_event(
    State(state): State<EventsState>,
    auth: AuthUser,
    Path(event_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let event_id = parse_path_id(&event_id, "Event")?;
    state.service.delete(&auth.identity(), event_id).await?;
    Ok(Json(MessageResponse::new("Event deleted successfully")))
}

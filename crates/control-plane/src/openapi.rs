// OpenAPI specification generation
//
// This module defines the OpenAPI spec for the RSVP API.
// It is used by both the API server (for Swagger UI)
// and the export-openapi binary (for static spec generation).

use crate::api;
use crate::api::{ErrorResponse, ListResponse};
use rsvp_core::{Event, EventWithAttendees, User, UserProfile};
use utoipa::OpenApi;

/// OpenAPI documentation for the RSVP API
#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/api", description = "Default API prefix"),
    ),
    paths(
        api::events::create_event,
        api::events::list_events,
        api::events::get_event,
        api::events::update_event,
        api::events::request_rsvp,
        api::events::list_user_rsvps,
        api::events::delete_event,
        api::users::register,
        api::users::sign_in,
        api::users::get_current_user,
        api::users::get_user,
        api::users::update_preferences,
    ),
    components(
        schemas(
            Event, EventWithAttendees, User, UserProfile,
            ErrorResponse,
            api::common::MessageResponse,
            api::events::CreateEventRequest, api::events::UpdateEventRequest,
            api::events::RsvpRequest, api::events::RsvpResponse,
            api::users::RegisterRequest, api::users::RegisterResponse,
            api::users::SignInRequest, api::users::SignInResponse,
            api::users::UpdatePreferencesRequest,
            ListResponse<Event>,
            ListResponse<EventWithAttendees>,
        )
    ),
    tags(
        (name = "events", description = "Event browsing, RSVP and admin lifecycle endpoints"),
        (name = "users", description = "Registration, sign-in and user profile endpoints")
    ),
    info(
        title = "RSVP API",
        version = "0.1.0",
        description = "API for browsing events and reserving seats",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Generate the OpenAPI spec as a pretty-printed JSON string
    pub fn to_json() -> Result<String, serde_json::Error> {
        Self::openapi().to_pretty_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_route() {
        let json: serde_json::Value = serde_json::from_str(&ApiDoc::to_json().unwrap()).unwrap();
        let paths = json["paths"].as_object().unwrap();

        for path in [
            "/events",
            "/events/create",
            "/events/{event_id}",
            "/events/{event_id}/rsvp",
            "/events/user/{user_id}",
            "/events/delete/{event_id}",
            "/users/register",
            "/users/signin",
            "/users/me",
            "/users/{user_id}",
            "/users/{user_id}/preferences",
        ] {
            assert!(paths.contains_key(path), "missing {path}");
        }
    }
}

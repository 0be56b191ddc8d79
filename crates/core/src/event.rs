// Event domain types
//
// These types represent the Event entity and its attendee-resolved view.
// Used by the API layer and the OpenAPI schema.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{EventError, Result};
use crate::user::UserProfile;

/// Parse an event date supplied by a client.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC)
/// and plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_event_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(EventError::invalid_input(format!(
        "'{}' is not a valid date",
        raw
    )))
}

/// Validate a seat count supplied by a client
pub fn validate_capacity(capacity: i64) -> Result<i32> {
    if capacity < 0 {
        return Err(EventError::invalid_input("Capacity must not be negative"));
    }
    i32::try_from(capacity).map_err(|_| EventError::invalid_input("Capacity is too large"))
}

/// Return the trimmed value of a required text field
pub fn required_text(field: &str, value: Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(EventError::invalid_input(format!("{} is required", field))),
    }
}

/// Event - something users can RSVP to.
///
/// `capacity` is the number of seats still open, not the original size of
/// the event. It never goes below zero and drops by exactly one per admitted
/// RSVP. `rsvps` holds each admitted user id once, in admission order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique identifier for the event.
    pub id: Uuid,
    /// Display name of the event.
    #[cfg_attr(feature = "openapi", schema(example = "Rust Meetup"))]
    pub name: String,
    /// When the event takes place.
    pub date: DateTime<Utc>,
    /// Where the event takes place.
    #[cfg_attr(feature = "openapi", schema(example = "Community Hall, Room 2"))]
    pub location: String,
    /// Remaining open seats.
    #[cfg_attr(feature = "openapi", schema(example = 25, minimum = 0))]
    pub capacity: i32,
    /// Category used for filtering (exact match).
    #[cfg_attr(feature = "openapi", schema(example = "meetup"))]
    pub event_type: String,
    /// IDs of users holding an RSVP, in admission order.
    #[serde(default)]
    pub rsvps: Vec<Uuid>,
    /// Timestamp when the event was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last change (admission or admin update).
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn has_rsvp(&self, user_id: Uuid) -> bool {
        self.rsvps.contains(&user_id)
    }

    pub fn has_open_seats(&self) -> bool {
        self.capacity > 0
    }
}

/// Event with RSVP identities resolved to user profiles.
/// Returned when listing the events a user has RSVP'd to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EventWithAttendees {
    pub id: Uuid,
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub event_type: String,
    /// Attendees with name and email. Unknown user ids are omitted.
    pub rsvps: Vec<UserProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventWithAttendees {
    pub fn new(event: Event, attendees: Vec<UserProfile>) -> Self {
        Self {
            id: event.id,
            name: event.name,
            date: event.date,
            location: event.location,
            capacity: event.capacity,
            event_type: event.event_type,
            rsvps: attendees,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> Event {
        let now = Utc::now();
        Event {
            id: Uuid::now_v7(),
            name: "Rust Meetup".to_string(),
            date: now,
            location: "Hall A".to_string(),
            capacity: 1,
            event_type: "meetup".to_string(),
            rsvps: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let event = sample_event();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["eventType"], "meetup");
        assert_eq!(json["capacity"], 1);
        assert!(json["rsvps"].as_array().unwrap().is_empty());
        assert!(json.get("event_type").is_none());
    }

    #[test]
    fn test_seat_and_membership_helpers() {
        let mut event = sample_event();
        let user = Uuid::now_v7();
        assert!(event.has_open_seats());
        assert!(!event.has_rsvp(user));

        event.rsvps.push(user);
        event.capacity -= 1;
        assert!(!event.has_open_seats());
        assert!(event.has_rsvp(user));
    }

    #[test]
    fn test_parse_event_date_formats() {
        let rfc = parse_event_date("2025-05-01T18:30:00+02:00").unwrap();
        assert_eq!(rfc.to_rfc3339(), "2025-05-01T16:30:00+00:00");

        let naive = parse_event_date("2025-05-01T18:30").unwrap();
        assert_eq!(naive.to_rfc3339(), "2025-05-01T18:30:00+00:00");

        let day = parse_event_date(" 2025-05-01 ").unwrap();
        assert_eq!(day.to_rfc3339(), "2025-05-01T00:00:00+00:00");

        assert!(matches!(
            parse_event_date("next friday"),
            Err(EventError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_capacity() {
        assert_eq!(validate_capacity(0).unwrap(), 0);
        assert_eq!(validate_capacity(150).unwrap(), 150);
        assert!(validate_capacity(-1).is_err());
        assert!(validate_capacity(i64::from(i32::MAX) + 1).is_err());
    }

    #[test]
    fn test_required_text() {
        assert_eq!(
            required_text("Name", Some("  Jazz Night ".to_string())).unwrap(),
            "Jazz Night"
        );
        assert!(required_text("Name", Some("   ".to_string())).is_err());
        assert!(required_text("Name", None).is_err());
    }

    #[test]
    fn test_with_attendees_keeps_event_fields() {
        let event = sample_event();
        let profile = UserProfile {
            id: Uuid::now_v7(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };

        let resolved = EventWithAttendees::new(event.clone(), vec![profile.clone()]);
        assert_eq!(resolved.id, event.id);
        assert_eq!(resolved.event_type, "meetup");
        assert_eq!(resolved.rsvps.len(), 1);
        assert_eq!(resolved.rsvps[0].email, "ada@example.com");
    }
}

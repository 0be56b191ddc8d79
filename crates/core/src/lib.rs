// RSVP Core
//
// Domain types shared by the control-plane API and its binaries.
//
// Key design decisions:
// - Entities are storage-agnostic; row types live next to the storage backends
// - EventError is the single error taxonomy for admission and lifecycle operations
// - Identity is the only thing the services know about authentication

// Telemetry (tracing subscriber setup)
pub mod telemetry;

// Domain entity types
pub mod event;
pub mod user;

pub mod error;
pub mod identity;

// Re-exports for convenience
pub use error::{EventError, Result};
pub use event::{parse_event_date, required_text, validate_capacity, Event, EventWithAttendees};
pub use identity::{require_admin, Identity};
pub use user::{User, UserProfile};

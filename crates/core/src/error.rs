// Error types for event admission and lifecycle operations

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for event operations
pub type Result<T> = std::result::Result<T, EventError>;

/// Errors returned by the event and user services.
///
/// Business-rule rejections (`CapacityExhausted`, `DuplicateRsvp`) are not
/// system faults; `StoreUnavailable` wraps collaborator failures and must not
/// be shown to clients verbatim.
#[derive(Debug, Error)]
pub enum EventError {
    /// Caller supplied malformed or missing data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Referenced entity does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// No seats left on the event
    #[error("No seats available for event {0}")]
    CapacityExhausted(Uuid),

    /// User already holds an RSVP for the event
    #[error("User {user_id} has already RSVP'd for event {event_id}")]
    DuplicateRsvp { event_id: Uuid, user_id: Uuid },

    /// Caller is not allowed to perform the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Entity with the same unique key already exists
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Storage collaborator failed
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] anyhow::Error),
}

impl EventError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound(entity.into())
    }

    /// True for rejections caused by the caller or by business rules,
    /// false for collaborator failures.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::StoreUnavailable(_))
    }
}

// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// This module provides a unified StorageBackend enum that can work with
// either PostgreSQL (production) or in-memory (dev mode) storage.

use anyhow::Result;
use uuid::Uuid;

use super::memory::InMemoryDatabase;
use super::models::*;
use super::repositories::Database;

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(std::sync::Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Create a PostgreSQL storage backend from a database URL and apply migrations
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        db.migrate().await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(std::sync::Arc::new(InMemoryDatabase::new()))
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    // ============================================
    // Users
    // ============================================

    /// Returns None if the email is already registered
    pub async fn create_user(&self, input: CreateUserRow) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user(id).await,
            Self::InMemory(db) => db.get_user(id).await,
        }
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_email(email).await,
            Self::InMemory(db) => db.get_user_by_email(email).await,
        }
    }

    pub async fn get_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserProfileRow>> {
        match self {
            Self::Postgres(db) => db.get_users_by_ids(ids).await,
            Self::InMemory(db) => db.get_users_by_ids(ids).await,
        }
    }

    pub async fn update_user_preferences(
        &self,
        id: Uuid,
        preferences: &str,
    ) -> Result<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.update_user_preferences(id, preferences).await,
            Self::InMemory(db) => db.update_user_preferences(id, preferences).await,
        }
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: CreateEventRow) -> Result<EventRow> {
        match self {
            Self::Postgres(db) => db.create_event(input).await,
            Self::InMemory(db) => db.create_event(input).await,
        }
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        match self {
            Self::Postgres(db) => db.get_event(id).await,
            Self::InMemory(db) => db.get_event(id).await,
        }
    }

    pub async fn list_events(&self, event_type: Option<&str>) -> Result<Vec<EventRow>> {
        match self {
            Self::Postgres(db) => db.list_events(event_type).await,
            Self::InMemory(db) => db.list_events(event_type).await,
        }
    }

    pub async fn list_events_for_user(&self, user_id: Uuid) -> Result<Vec<EventRow>> {
        match self {
            Self::Postgres(db) => db.list_events_for_user(user_id).await,
            Self::InMemory(db) => db.list_events_for_user(user_id).await,
        }
    }

    /// Conditional update: admit only if `capacity > 0` and the user holds no
    /// RSVP at the instant the update is applied. None when nothing matched.
    pub async fn admit_rsvp(&self, event_id: Uuid, user_id: Uuid) -> Result<Option<EventRow>> {
        match self {
            Self::Postgres(db) => db.admit_rsvp(event_id, user_id).await,
            Self::InMemory(db) => db.admit_rsvp(event_id, user_id).await,
        }
    }

    pub async fn update_event(&self, id: Uuid, input: UpdateEvent) -> Result<Option<EventRow>> {
        match self {
            Self::Postgres(db) => db.update_event(id, input).await,
            Self::InMemory(db) => db.update_event(id, input).await,
        }
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<bool> {
        match self {
            Self::Postgres(db) => db.delete_event(id).await,
            Self::InMemory(db) => db.delete_event(id).await,
        }
    }
}

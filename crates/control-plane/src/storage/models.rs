// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================
// Events
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: Uuid,
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub event_type: String,
    pub rsvps: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateEventRow {
    pub name: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub event_type: String,
}

/// Admin update of event fields. RSVP membership is never changed here.
#[derive(Debug, Clone, Default)]
pub struct UpdateEvent {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub capacity: Option<i32>,
    pub event_type: Option<String>,
}

// ============================================
// Users
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub preferences: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub preferences: Option<String>,
    pub is_admin: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserProfileRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

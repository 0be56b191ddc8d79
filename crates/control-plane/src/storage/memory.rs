// In-memory storage implementation for dev mode
// Decision: Use parking_lot for thread-safe access
// Decision: UUIDs generated via uuid v7 (time-ordered)
//
// This implementation mirrors the PostgreSQL repository API backed by
// in-memory HashMaps, allowing the control-plane to run without a database.
// Conditional updates (RSVP admission, unique email) check and mutate inside
// a single write-lock scope so they stay atomic under concurrent requests.

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use super::models::*;

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    users: RwLock<HashMap<Uuid, UserRow>>,
    events: RwLock<HashMap<Uuid, EventRow>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn sort_events(rows: &mut [EventRow]) {
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> Result<Option<UserRow>> {
        let mut users = self.users.write();
        if users.values().any(|u| u.email == input.email) {
            return Ok(None);
        }

        let now = Self::now();
        let id = Uuid::now_v7();
        let row = UserRow {
            id,
            name: input.name,
            email: input.email,
            password_hash: input.password_hash,
            preferences: input.preferences,
            is_admin: input.is_admin,
            created_at: now,
            updated_at: now,
        };
        users.insert(id, row.clone());
        Ok(Some(row))
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        Ok(self.users.read().get(&id).cloned())
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    pub async fn get_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserProfileRow>> {
        let users = self.users.read();
        Ok(ids
            .iter()
            .filter_map(|id| users.get(id))
            .map(|u| UserProfileRow {
                id: u.id,
                name: u.name.clone(),
                email: u.email.clone(),
            })
            .collect())
    }

    pub async fn update_user_preferences(
        &self,
        id: Uuid,
        preferences: &str,
    ) -> Result<Option<UserRow>> {
        let mut users = self.users.write();
        if let Some(user) = users.get_mut(&id) {
            user.preferences = Some(preferences.to_string());
            user.updated_at = Self::now();
            return Ok(Some(user.clone()));
        }
        Ok(None)
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: CreateEventRow) -> Result<EventRow> {
        let now = Self::now();
        let id = Uuid::now_v7();
        let row = EventRow {
            id,
            name: input.name,
            date: input.date,
            location: input.location,
            capacity: input.capacity,
            event_type: input.event_type,
            rsvps: vec![],
            created_at: now,
            updated_at: now,
        };
        self.events.write().insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        Ok(self.events.read().get(&id).cloned())
    }

    pub async fn list_events(&self, event_type: Option<&str>) -> Result<Vec<EventRow>> {
        let events = self.events.read();
        let mut result: Vec<_> = events
            .values()
            .filter(|e| event_type.map_or(true, |t| e.event_type == t))
            .cloned()
            .collect();
        Self::sort_events(&mut result);
        Ok(result)
    }

    pub async fn list_events_for_user(&self, user_id: Uuid) -> Result<Vec<EventRow>> {
        let events = self.events.read();
        let mut result: Vec<_> = events
            .values()
            .filter(|e| e.rsvps.contains(&user_id))
            .cloned()
            .collect();
        Self::sort_events(&mut result);
        Ok(result)
    }

    /// Admit `user_id` if a seat is open and the user is not yet a member.
    /// Check and mutation happen under the same write lock.
    pub async fn admit_rsvp(&self, event_id: Uuid, user_id: Uuid) -> Result<Option<EventRow>> {
        let mut events = self.events.write();
        let Some(event) = events.get_mut(&event_id) else {
            return Ok(None);
        };

        if event.capacity <= 0 || event.rsvps.contains(&user_id) {
            return Ok(None);
        }

        event.rsvps.push(user_id);
        event.capacity -= 1;
        event.updated_at = Self::now();
        Ok(Some(event.clone()))
    }

    pub async fn update_event(&self, id: Uuid, input: UpdateEvent) -> Result<Option<EventRow>> {
        let mut events = self.events.write();
        if let Some(event) = events.get_mut(&id) {
            if let Some(name) = input.name {
                event.name = name;
            }
            if let Some(date) = input.date {
                event.date = date;
            }
            if let Some(location) = input.location {
                event.location = location;
            }
            if let Some(capacity) = input.capacity {
                event.capacity = capacity;
            }
            if let Some(event_type) = input.event_type {
                event.event_type = event_type;
            }
            event.updated_at = Self::now();
            return Ok(Some(event.clone()));
        }
        Ok(None)
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<bool> {
        Ok(self.events.write().remove(&id).is_some())
    }
}

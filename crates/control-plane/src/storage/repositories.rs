// Repository layer for PostgreSQL
//
// Decision: RSVP admission is one conditional UPDATE; Postgres row locking
// serializes concurrent admissions on the same event.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::*;

const EVENT_COLUMNS: &str =
    "id, name, date, location, capacity, event_type, rsvps, created_at, updated_at";

const USER_COLUMNS: &str =
    "id, name, email, password_hash, preferences, is_admin, created_at, updated_at";

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Apply embedded migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    // ============================================
    // Users
    // ============================================

    /// Insert a user. Returns None if the email is already registered.
    pub async fn create_user(&self, input: CreateUserRow) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, name, email, password_hash, preferences, is_admin)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.password_hash)
        .bind(&input.preferences)
        .bind(input.is_admin)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<UserProfileRow>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = sqlx::query_as::<_, UserProfileRow>(
            r#"
            SELECT id, name, email
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_user_preferences(
        &self,
        id: Uuid,
        preferences: &str,
    ) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET preferences = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(preferences)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Events
    // ============================================

    pub async fn create_event(&self, input: CreateEventRow) -> Result<EventRow> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            INSERT INTO events (id, name, date, location, capacity, event_type, rsvps)
            VALUES ($1, $2, $3, $4, $5, $6, '{{}}')
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(Uuid::now_v7())
        .bind(&input.name)
        .bind(input.date)
        .bind(&input.location)
        .bind(input.capacity)
        .bind(&input.event_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_events(&self, event_type: Option<&str>) -> Result<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE ($1::TEXT IS NULL OR event_type = $1)
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(event_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn list_events_for_user(&self, user_id: Uuid) -> Result<Vec<EventRow>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM events
            WHERE $1 = ANY(rsvps)
            ORDER BY created_at ASC, id ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Admit `user_id` to the event if a seat is open and the user has no RSVP yet.
    ///
    /// Predicate and mutation are one statement. Returns None when no row
    /// matched (missing event, no seats, or already admitted).
    pub async fn admit_rsvp(&self, event_id: Uuid, user_id: Uuid) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET
                rsvps = array_append(rsvps, $2),
                capacity = capacity - 1,
                updated_at = NOW()
            WHERE id = $1
              AND capacity > 0
              AND NOT ($2 = ANY(rsvps))
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(event_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_event(&self, id: Uuid, input: UpdateEvent) -> Result<Option<EventRow>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            r#"
            UPDATE events
            SET
                name = COALESCE($2, name),
                date = COALESCE($3, date),
                location = COALESCE($4, location),
                capacity = COALESCE($5, capacity),
                event_type = COALESCE($6, event_type),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {EVENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.date)
        .bind(&input.location)
        .bind(input.capacity)
        .bind(&input.event_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

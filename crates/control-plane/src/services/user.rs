// User service: registration, credential checks and preferences
//
// Decision: Admin role is granted at registration by the seed-admin policy
// (AUTH_SEED_ADMIN_EMAILS). Clients cannot ask for it.

use crate::auth::AuthConfig;
use crate::storage::{
    models::CreateUserRow,
    password::{hash_password, verify_password},
    StorageBackend, UserRow,
};
use rsvp_core::{required_text, EventError, Identity, Result, User};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::users::RegisterRequest;

pub struct UserService {
    db: Arc<StorageBackend>,
    config: AuthConfig,
}

impl UserService {
    pub fn new(db: Arc<StorageBackend>, config: AuthConfig) -> Self {
        Self { db, config }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        if self.config.disable_signup {
            return Err(EventError::Forbidden("Registration is disabled".to_string()));
        }

        let name = required_text("Name", req.name)?;
        let email = normalize_email(&required_text("Email", req.email)?);
        let preferences = required_text("Preferences", req.preferences)?;
        let password = req
            .password
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| EventError::invalid_input("Password is required"))?;

        let password_hash = hash_password(&password)?;
        let is_admin = self.config.is_seed_admin(&email);

        let row = self
            .db
            .create_user(CreateUserRow {
                name,
                email: email.clone(),
                password_hash,
                preferences: Some(preferences),
                is_admin,
            })
            .await?
            .ok_or_else(|| EventError::AlreadyExists(format!("User with email {}", email)))?;

        tracing::info!(user.id = %row.id, is_admin, "User registered");
        Ok(Self::row_to_user(row))
    }

    /// Check credentials. None when the email is unknown or the password is
    /// wrong; callers must not tell the two apart.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        let Some(row) = self.db.get_user_by_email(&email).await? else {
            tracing::debug!("Sign-in for unknown email");
            return Ok(None);
        };

        if !verify_password(password, &row.password_hash)? {
            tracing::debug!(user.id = %row.id, "Sign-in with wrong password");
            return Ok(None);
        }

        Ok(Some(Self::row_to_user(row)))
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        self.db
            .get_user(id)
            .await?
            .map(Self::row_to_user)
            .ok_or_else(|| EventError::not_found("User"))
    }

    pub async fn update_preferences(
        &self,
        identity: &Identity,
        id: Uuid,
        preferences: Option<String>,
    ) -> Result<User> {
        let preferences = required_text("Preferences", preferences)?;
        if !identity.can_act_for(id) {
            return Err(EventError::Forbidden(
                "Only the account owner can change preferences".to_string(),
            ));
        }

        let row = self
            .db
            .update_user_preferences(id, &preferences)
            .await?
            .ok_or_else(|| EventError::not_found("User"))?;

        tracing::info!(user.id = %id, actor = %identity.id, "Preferences updated");
        Ok(Self::row_to_user(row))
    }

    fn row_to_user(row: UserRow) -> User {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            preferences: row.preferences.unwrap_or_default(),
            is_admin: row.is_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

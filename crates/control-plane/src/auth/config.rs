// Authentication configuration loaded from environment variables.
// Decision: AUTH_ prefix for all auth config
// Decision: Default to "none" mode for local development

use anyhow::{bail, Result};
use std::time::Duration;

/// Authentication mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthMode {
    /// No authentication required; every caller acts as an admin (local development)
    #[default]
    None,
    /// Bearer/cookie JWT issued by sign-in
    Full,
}

impl AuthMode {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "full" => AuthMode::Full,
            _ => AuthMode::None,
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWTs
    pub secret: String,
    /// Access token lifetime
    pub access_token_lifetime: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_lifetime: Duration::from_secs(60 * 60), // 1 hour
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Authentication mode
    pub mode: AuthMode,
    /// JWT configuration
    pub jwt: JwtConfig,
    /// Emails that become admins when they register (lowercase)
    pub seed_admin_emails: Vec<String>,
    /// Whether to disable signup (registration)
    pub disable_signup: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::None,
            jwt: JwtConfig::default(),
            seed_admin_emails: Vec::new(),
            disable_signup: false,
        }
    }
}

impl AuthConfig {
    /// Load configuration from environment variables.
    /// Full mode refuses to start without AUTH_JWT_SECRET.
    pub fn from_env() -> Result<Self> {
        let mode = std::env::var("AUTH_MODE")
            .map(|s| AuthMode::from_str(&s))
            .unwrap_or_default();

        let jwt_secret = match std::env::var("AUTH_JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if mode == AuthMode::Full => {
                bail!("AUTH_JWT_SECRET must be set when AUTH_MODE=full")
            }
            _ => {
                // Generate a random secret for dev mode
                use rand::Rng;
                let bytes: [u8; 32] = rand::thread_rng().gen();
                hex::encode(bytes)
            }
        };

        let access_token_lifetime = std::env::var("AUTH_JWT_ACCESS_TOKEN_LIFETIME")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60 * 60));

        let seed_admin_emails = std::env::var("AUTH_SEED_ADMIN_EMAILS")
            .map(|s| parse_email_list(&s))
            .unwrap_or_default();

        let disable_signup = std::env::var("AUTH_DISABLE_SIGNUP")
            .map(|s| s.to_lowercase() == "true" || s == "1")
            .unwrap_or(false);

        Ok(Self {
            mode,
            jwt: JwtConfig {
                secret: jwt_secret,
                access_token_lifetime,
            },
            seed_admin_emails,
            disable_signup,
        })
    }

    /// Check if authentication is enabled
    pub fn is_enabled(&self) -> bool {
        self.mode != AuthMode::None
    }

    /// Whether a newly registered account with this email gets the admin role
    pub fn is_seed_admin(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.seed_admin_emails.iter().any(|e| *e == email)
    }
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

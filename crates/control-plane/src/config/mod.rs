// Server configuration loaded from environment variables
//
// Auth settings live in auth::AuthConfig; this covers the listener, routing
// and storage selection.

use axum::http::HeaderValue;

/// Default listen address
pub const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:5002";
/// Default prefix for all API routes
pub const DEFAULT_API_PREFIX: &str = "/api";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub http_addr: String,
    /// Prefix for API routes; empty serves them at the root
    pub api_prefix: String,
    /// PostgreSQL URL. None selects the in-memory dev backend.
    pub database_url: Option<String>,
    /// Allowed CORS origins. Empty means same-origin only.
    pub cors_origins: Vec<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            database_url: None,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let http_addr = std::env::var("HTTP_ADDR")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());

        // API_PREFIX="" explicitly serves the API at the root
        let api_prefix = std::env::var("API_PREFIX")
            .map(|s| normalize_prefix(&s))
            .unwrap_or_else(|_| DEFAULT_API_PREFIX.to_string());

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.is_empty());

        // Only needed when the UI is served from a different origin than the API
        // Example: CORS_ALLOWED_ORIGINS="https://app.example.com,https://admin.example.com"
        let cors_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        Self {
            http_addr,
            api_prefix,
            database_url,
            cors_origins,
        }
    }
}

fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn parse_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect()
}

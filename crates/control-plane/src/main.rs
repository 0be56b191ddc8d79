// RSVP API server
// Decision: PostgreSQL when DATABASE_URL is set, in-memory storage otherwise (dev mode)

use anyhow::{Context, Result};
use rsvp_control_plane::auth::AuthConfig;
use rsvp_control_plane::config::ServerConfig;
use rsvp_control_plane::storage::StorageBackend;
use rsvp_control_plane::build_app;
use rsvp_core::telemetry::{init_telemetry, TelemetryConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Configure via environment variables:
    // - SERVICE_NAME: Service name (default: "rsvp-control-plane")
    // - RUST_LOG / LOG_LEVEL: Log filter (default: "rsvp_control_plane=debug,tower_http=debug")
    let mut telemetry_config = TelemetryConfig::from_env();
    if telemetry_config.service_name == "rsvp" {
        telemetry_config.service_name = "rsvp-control-plane".to_string();
    }
    if telemetry_config.log_filter.is_none() {
        telemetry_config.log_filter =
            Some("rsvp_control_plane=debug,rsvp_core=debug,tower_http=debug".to_string());
    }
    telemetry_config.service_version = Some(env!("CARGO_PKG_VERSION").to_string());
    init_telemetry(telemetry_config);

    tracing::info!("rsvp-control-plane starting...");

    let server_config = ServerConfig::from_env();

    let db = match &server_config.database_url {
        Some(url) => {
            let db = StorageBackend::postgres(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database, migrations applied");
            db
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            StorageBackend::in_memory()
        }
    };

    // Load authentication configuration
    let auth_config = AuthConfig::from_env().context("Invalid authentication configuration")?;
    tracing::info!(
        mode = ?auth_config.mode,
        enabled = auth_config.is_enabled(),
        seed_admins = auth_config.seed_admin_emails.len(),
        signup_disabled = auth_config.disable_signup,
        "Authentication configured"
    );

    if !server_config.api_prefix.is_empty() {
        tracing::info!(prefix = %server_config.api_prefix, "API prefix configured");
    }
    if server_config.cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?server_config.cors_origins, "CORS origins configured");
    }

    let app = build_app(Arc::new(db), auth_config, &server_config);

    // Start HTTP server
    let listener = tokio::net::TcpListener::bind(&server_config.http_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_config.http_addr))?;
    tracing::info!("HTTP server listening on {}", server_config.http_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

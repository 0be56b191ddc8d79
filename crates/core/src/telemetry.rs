// Telemetry Module
//
// Tracing subscriber setup shared by the server and the CLI binaries.
// Console output only; the log filter comes from RUST_LOG or LOG_LEVEL.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// ============================================================================
// Span field names
// ============================================================================

/// Field names recorded on admission and lifecycle spans
pub mod fields {
    pub const EVENT_ID: &str = "event.id";
    pub const USER_ID: &str = "user.id";
    pub const OUTCOME: &str = "rsvp.outcome";
}

// ============================================================================
// Telemetry Configuration
// ============================================================================

/// Configuration for tracing output
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name, logged once at startup
    pub service_name: String,
    /// Service version
    pub service_version: Option<String>,
    /// Whether to enable console logging
    pub enable_console: bool,
    /// Log filter (e.g., "info", "debug", "rsvp_control_plane=debug")
    pub log_filter: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "rsvp".to_string(),
            service_version: None,
            enable_console: true,
            log_filter: None,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables
    ///
    /// Environment variables:
    /// - `SERVICE_NAME`: Service name (default: "rsvp")
    /// - `RUST_LOG` or `LOG_LEVEL`: Log filter
    pub fn from_env() -> Self {
        Self {
            service_name: std::env::var("SERVICE_NAME").unwrap_or_else(|_| "rsvp".to_string()),
            service_version: None,
            enable_console: true,
            log_filter: std::env::var("RUST_LOG")
                .or_else(|_| std::env::var("LOG_LEVEL"))
                .ok(),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        self.log_filter
            .as_ref()
            .and_then(|f| EnvFilter::try_new(f).ok())
            .unwrap_or_else(|| EnvFilter::new("info"))
    }
}

/// Initialize the global tracing subscriber.
///
/// Panics if a global subscriber is already installed, so call it once from
/// `main`. Tests should use [`try_init_telemetry`].
pub fn init_telemetry(config: TelemetryConfig) {
    build_and_install(&config, true);
}

/// Like [`init_telemetry`] but ignores an already-installed subscriber.
pub fn try_init_telemetry(config: TelemetryConfig) {
    build_and_install(&config, false);
}

fn build_and_install(config: &TelemetryConfig, strict: bool) {
    let console_layer = if config.enable_console {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(config.env_filter()),
        )
    } else {
        None
    };

    let registry = tracing_subscriber::registry().with(console_layer);
    if strict {
        registry.init();
    } else {
        let _ = registry.try_init();
    }

    tracing::info!(
        service = %config.service_name,
        version = config.service_version.as_deref().unwrap_or("unknown"),
        "Telemetry initialized"
    );
}

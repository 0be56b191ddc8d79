// Router assembly shared by the server binary and the integration tests

use crate::api;
use crate::auth::{AuthConfig, AuthState};
use crate::config::ServerConfig;
use crate::openapi::ApiDoc;
use crate::storage::StorageBackend;
use axum::http::{header, Method};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    auth_mode: String,
    storage: &'static str,
}

/// State for health endpoint
#[derive(Clone)]
struct HealthState {
    auth_mode: String,
    storage: &'static str,
}

async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        auth_mode: state.auth_mode.clone(),
        storage: state.storage,
    })
}

/// Build the full application router: health (not prefixed), prefixed API
/// routes, Swagger UI, optional CORS and request tracing.
pub fn build_app(db: Arc<StorageBackend>, auth_config: AuthConfig, server: &ServerConfig) -> Router {
    let health_state = HealthState {
        auth_mode: format!("{:?}", auth_config.mode),
        storage: if db.is_dev_mode() { "memory" } else { "postgres" },
    };

    let auth_state = AuthState::new(auth_config);
    let events_state = api::events::EventsState::new(db.clone(), auth_state.clone());
    let users_state = api::users::UsersState::new(db, auth_state);

    let api_routes = Router::new()
        .merge(api::events::routes(events_state))
        .merge(api::users::routes(users_state));

    let app = Router::new()
        .route("/health", get(health).with_state(health_state))
        .merge(build_router_with_prefix(api_routes, &server.api_prefix))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !server.cors_origins.is_empty() {
        app.layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(server.cors_origins.clone()))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([
                    header::CONTENT_TYPE,
                    header::AUTHORIZATION,
                    header::ACCEPT,
                    header::ORIGIN,
                ])
                .allow_credentials(true),
        )
    } else {
        app
    };

    app.layer(TraceLayer::new_for_http())
}

/// Build router with optional API prefix (extracted for testing)
fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}

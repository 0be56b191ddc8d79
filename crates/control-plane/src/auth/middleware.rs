// Authentication middleware and extractors
// Decision: Support both cookie-based (browser) and header-based (API) auth
// Decision: In "none" mode, create an anonymous admin context

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;
use rsvp_core::Identity;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{
    config::{AuthConfig, AuthMode},
    jwt::JwtService,
};

/// Cookie carrying the access token for browser clients
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authentication error
#[derive(Debug, Clone, Serialize)]
pub struct AuthError {
    pub error: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl AuthError {
    pub fn unauthorized(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::UNAUTHORIZED,
        }
    }

    pub fn forbidden(message: &str) -> Self {
        Self {
            error: message.to_string(),
            status: StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Authenticated user context extracted from request
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User ID
    pub id: Uuid,
    /// User email
    pub email: String,
    /// Admin role carried by the token
    pub is_admin: bool,
    /// Authentication method used
    pub auth_method: AuthMethod,
}

impl AuthUser {
    /// Create an anonymous user for no-auth mode
    pub fn anonymous() -> Self {
        Self {
            id: Uuid::nil(),
            email: "anonymous@local".to_string(),
            is_admin: true, // Full access in no-auth mode
            auth_method: AuthMethod::None,
        }
    }

    /// The identity the services authorize against
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            is_admin: self.is_admin,
        }
    }
}

/// Authentication method used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// No authentication (anonymous)
    None,
    /// JWT access token
    Jwt,
}

/// Auth state shared across routes
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub jwt_service: Arc<JwtService>,
}

impl AuthState {
    pub fn new(config: AuthConfig) -> Self {
        let jwt_service = Arc::new(JwtService::new(config.jwt.clone()));
        Self {
            config,
            jwt_service,
        }
    }
}

/// Extractor for authenticated user
/// This is required - returns 401 if not authenticated
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);
        extract_auth_user(parts, &auth_state)
    }
}

/// Helper trait for extracting AuthState from application state
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

impl FromRef<AuthState> for AuthState {
    fn from_ref(input: &AuthState) -> Self {
        input.clone()
    }
}

/// Extract authenticated user from request
fn extract_auth_user(parts: &Parts, auth_state: &AuthState) -> Result<AuthUser, AuthError> {
    // In no-auth mode, always return anonymous user
    if auth_state.config.mode == AuthMode::None {
        return Ok(AuthUser::anonymous());
    }

    // Try to extract from Authorization header first
    if let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| AuthError::unauthorized("Invalid authorization header"))?;

        return match auth_str.strip_prefix("Bearer ") {
            Some(token) => validate_jwt_token(token.trim(), auth_state),
            None => Err(AuthError::unauthorized("Unsupported authorization scheme")),
        };
    }

    // Try to extract from cookie (for browsers)
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(ACCESS_TOKEN_COOKIE) {
        return validate_jwt_token(cookie.value(), auth_state);
    }

    // No valid credentials found
    Err(AuthError::unauthorized("Authentication required"))
}

/// Validate JWT token and return user
fn validate_jwt_token(token: &str, auth_state: &AuthState) -> Result<AuthUser, AuthError> {
    let claims = auth_state
        .jwt_service
        .validate_access_token(token)
        .map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            AuthError::unauthorized("Invalid or expired token")
        })?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AuthError::unauthorized("Invalid user ID in token"))?;

    Ok(AuthUser {
        id: user_id,
        email: claims.email,
        is_admin: claims.is_admin,
        auth_method: AuthMethod::Jwt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::config::JwtConfig;
    use axum::http::Request;
    use std::time::Duration;

    fn full_state() -> AuthState {
        AuthState::new(AuthConfig {
            mode: AuthMode::Full,
            jwt: JwtConfig {
                secret: "middleware-test-secret".to_string(),
                access_token_lifetime: Duration::from_secs(600),
            },
            ..Default::default()
        })
    }

    fn parts_with_header(name: header::HeaderName, value: &str) -> Parts {
        let (parts, _) = Request::builder()
            .header(name, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_auth_user_anonymous() {
        let user = AuthUser::anonymous();
        assert_eq!(user.id, Uuid::nil());
        assert!(user.is_admin);
        assert!(user.identity().is_admin);
        assert_eq!(user.auth_method, AuthMethod::None);
    }

    #[test]
    fn test_none_mode_skips_credentials() {
        let state = AuthState::new(AuthConfig::default());
        let (parts, _) = Request::builder().body(()).unwrap().into_parts();

        let user = extract_auth_user(&parts, &state).unwrap();
        assert_eq!(user.auth_method, AuthMethod::None);
    }

    #[test]
    fn test_bearer_token_accepted() {
        let state = full_state();
        let id = Uuid::now_v7();
        let token = state
            .jwt_service
            .generate_access_token(id, "ada@example.com", false)
            .unwrap();

        let parts = parts_with_header(header::AUTHORIZATION, &format!("Bearer {}", token));
        let user = extract_auth_user(&parts, &state).unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.email, "ada@example.com");
        assert!(!user.is_admin);
        assert_eq!(user.identity(), Identity::user(id));
    }

    #[test]
    fn test_cookie_token_accepted() {
        let state = full_state();
        let id = Uuid::now_v7();
        let token = state
            .jwt_service
            .generate_access_token(id, "root@example.com", true)
            .unwrap();

        let parts = parts_with_header(header::COOKIE, &format!("access_token={}", token));
        let user = extract_auth_user(&parts, &state).unwrap();
        assert!(user.identity().is_admin);
    }

    #[test]
    fn test_missing_or_bad_credentials_rejected() {
        let state = full_state();
        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        let err = extract_auth_user(&parts, &state).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let parts = parts_with_header(header::AUTHORIZATION, "Bearer garbage");
        let err = extract_auth_user(&parts, &state).unwrap_err();
        assert_eq!(err.error, "Invalid or expired token");

        let parts = parts_with_header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz");
        assert!(extract_auth_user(&parts, &state).is_err());
    }

    #[test]
    fn test_auth_error() {
        let error = AuthError::unauthorized("Test error");
        assert_eq!(error.status, StatusCode::UNAUTHORIZED);
        assert_eq!(error.error, "Test error");

        let forbidden = AuthError::forbidden("Forbidden");
        assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    }
}

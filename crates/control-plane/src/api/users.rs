// Users API routes
// Decision: Registration and sign-in live beside the user resources; sign-in
// returns the token in the body and as an HttpOnly cookie for browsers

use crate::auth::middleware::{AuthError, AuthState, AuthUser, FromRef, ACCESS_TOKEN_COOKIE};
use crate::services::UserService;
use crate::storage::StorageBackend;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rsvp_core::User;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{parse_path_id, ApiError, ErrorResponse};

/// Register request. All fields are required.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "Ada Lovelace")]
    pub name: Option<String>,
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
    pub password: Option<String>,
    /// Free-form preferences text
    #[schema(example = "jazz, meetups")]
    pub preferences: Option<String>,
}

/// Register response
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    #[schema(example = "User registered successfully!")]
    pub message: String,
    pub id: Uuid,
    pub is_admin: bool,
}

/// Sign-in request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Sign-in response
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignInResponse {
    #[schema(example = "Sign-in successful!")]
    pub message: String,
    /// HS256 access token, sent back as `Authorization: Bearer <token>`
    pub token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 3600)]
    pub expires_in: i64,
}

/// Preferences update request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdatePreferencesRequest {
    #[schema(example = "opera, theatre")]
    pub preferences: Option<String>,
}

/// App state for users routes
#[derive(Clone)]
pub struct UsersState {
    pub service: Arc<UserService>,
    pub auth: AuthState,
}

impl UsersState {
    pub fn new(db: Arc<StorageBackend>, auth: AuthState) -> Self {
        Self {
            service: Arc::new(UserService::new(db, auth.config.clone())),
            auth,
        }
    }
}

impl FromRef<UsersState> for AuthState {
    fn from_ref(input: &UsersState) -> Self {
        input.auth.clone()
    }
}

/// Create users routes
pub fn routes(state: UsersState) -> Router {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/signin", post(sign_in))
        .route("/users/me", get(get_current_user))
        .route("/users/:user_id", get(get_user))
        .route("/users/:user_id/preferences", patch(update_preferences))
        .with_state(state)
}

/// POST /users/register - Register a new user
#[utoipa::path(
    post,
    path = "/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Missing field", body = ErrorResponse),
        (status = 403, description = "Registration is disabled", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn register(
    State(state): State<UsersState>,
    req: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(req) = req?;
    let user = state.service.register(req).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully!".to_string(),
            id: user.id,
            is_admin: user.is_admin,
        }),
    ))
}

/// POST /users/signin - Sign in with email and password
#[utoipa::path(
    post,
    path = "/users/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SignInResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn sign_in(
    State(state): State<UsersState>,
    jar: CookieJar,
    req: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<SignInResponse>), axum::response::Response> {
    use axum::response::IntoResponse;

    let Json(req) = req.map_err(|e| ApiError::from(e).into_response())?;

    let user = state
        .service
        .sign_in(&req.email, &req.password)
        .await
        .map_err(|e| ApiError::from(e).into_response())?
        .ok_or_else(|| AuthError::unauthorized("Invalid email or password").into_response())?;

    let jwt = &state.auth.jwt_service;
    let token = jwt
        .generate_access_token(user.id, &user.email, user.is_admin)
        .map_err(|e| {
            tracing::error!("Failed to issue access token: {}", e);
            ErrorResponse::new("Internal server error")
                .into_response(StatusCode::INTERNAL_SERVER_ERROR)
                .into_response()
        })?;

    tracing::info!(user.id = %user.id, "User signed in");

    let expires_in = jwt.access_token_lifetime_secs();
    let cookie = Cookie::build((ACCESS_TOKEN_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(expires_in))
        .build();

    Ok((
        jar.add(cookie),
        Json(SignInResponse {
            message: "Sign-in successful!".to_string(),
            token,
            token_type: "Bearer".to_string(),
            expires_in,
        }),
    ))
}

/// GET /users/me - Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User no longer exists", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_current_user(
    State(state): State<UsersState>,
    auth: AuthUser,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.service.get(auth.id).await?))
}

/// GET /users/{user_id} - Get user by ID
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<UsersState>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user_id = parse_path_id(&user_id, "User")?;
    Ok(Json(state.service.get(user_id).await?))
}

/// PATCH /users/{user_id}/preferences - Replace a user's preferences
#[utoipa::path(
    patch,
    path = "/users/{user_id}/preferences",
    params(
        ("user_id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdatePreferencesRequest,
    responses(
        (status = 200, description = "Preferences updated", body = User),
        (status = 400, description = "Preferences are required", body = ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the account owner", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn update_preferences(
    State(state): State<UsersState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    req: Result<Json<UpdatePreferencesRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let user_id = parse_path_id(&user_id, "User")?;
    let Json(req) = req?;
    let user = state
        .service
        .update_preferences(&auth.identity(), user_id, req.preferences)
        .await?;
    Ok(Json(user))
}

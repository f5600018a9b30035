use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    auth::{AuthUser, RegisterUserInput},
    entities::user::{self, UserRole},
    errors::ApiError,
    handlers::AppState,
};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/register", post(register))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// User representation returned by the API. Never carries the hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            full_name: u.full_name,
            role: u.role,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let tokens = state
        .auth
        .login(&payload.username, &payload.password)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(tokens))
}

async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let tokens = state
        .auth
        .refresh(&payload.refresh_token)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(tokens))
}

/// Admin-only user registration.
async fn register(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(payload): Json<RegisterUserInput>,
) -> Result<impl IntoResponse, ApiError> {
    actor.require_admin().map_err(map_service_error)?;
    let created = state
        .auth
        .register(payload)
        .await
        .map_err(map_service_error)?;
    info!(user_id = %created.id, "user registered");
    Ok(created_response(UserResponse::from(created)))
}

async fn me(
    State(state): State<AppState>,
    actor: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let account = state
        .auth
        .get_user(actor.user_id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(UserResponse::from(account)))
}

use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    auth::AuthUser,
    errors::ApiError,
    handlers::AppState,
    services::recipients::{CreateRecipientInput, UpdateRecipientInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub fn recipient_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipients).post(create_recipient))
        .route(
            "/{id}",
            get(get_recipient)
                .patch(update_recipient)
                .delete(deactivate_recipient),
        )
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRecipientRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRecipientRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RecipientsQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

async fn list_recipients(
    State(state): State<AppState>,
    _actor: AuthUser,
    Query(query): Query<RecipientsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let recipients = state
        .services
        .recipients
        .list(query.include_inactive)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(recipients))
}

async fn create_recipient(
    State(state): State<AppState>,
    _actor: AuthUser,
    Json(payload): Json<CreateRecipientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .recipients
        .create(CreateRecipientInput {
            name: payload.name,
            notes: payload.notes,
        })
        .await
        .map_err(map_service_error)?;
    Ok(created_response(created))
}

async fn get_recipient(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let recipient = state
        .services
        .recipients
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(recipient))
}

async fn update_recipient(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRecipientRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let updated = state
        .services
        .recipients
        .update(
            id,
            UpdateRecipientInput {
                name: payload.name,
                notes: payload.notes,
                is_active: payload.is_active,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(updated))
}

/// Soft delete.
async fn deactivate_recipient(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .recipients
        .deactivate(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

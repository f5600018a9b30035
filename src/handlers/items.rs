use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    LimitQuery,
};
use crate::{
    auth::AuthUser,
    entities::item::ItemCategory,
    errors::ApiError,
    handlers::AppState,
    services::items::{CreateItemInput, ItemFilter, UpdateItemInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route(
            "/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .route("/{id}/adjust", post(adjust_stock))
        .route("/{id}/movements", get(list_item_movements))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub category: ItemCategory,
    #[validate(length(min = 1, max = 50))]
    pub unit_of_measure: String,
    pub initial_stock: Option<Decimal>,
    pub minimum_stock_level: Option<Decimal>,
    #[validate(length(max = 100))]
    pub sku: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ItemCategory>,
    #[validate(length(min = 1, max = 50))]
    pub unit_of_measure: Option<String>,
    pub minimum_stock_level: Option<Decimal>,
    #[validate(length(max = 100))]
    pub sku: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AdjustStockRequest {
    /// Signed correction applied to current stock.
    pub delta: Decimal,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ItemsQuery {
    pub category: Option<ItemCategory>,
    #[serde(default)]
    pub low_stock_only: bool,
}

async fn list_items(
    State(state): State<AppState>,
    _actor: AuthUser,
    Query(query): Query<ItemsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state
        .services
        .items
        .list(ItemFilter {
            category: query.category,
            low_stock_only: query.low_stock_only,
        })
        .await
        .map_err(map_service_error)?;
    Ok(success_response(items))
}

async fn create_item(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(payload): Json<CreateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .items
        .create(
            CreateItemInput {
                name: payload.name,
                description: payload.description,
                category: payload.category,
                unit_of_measure: payload.unit_of_measure,
                initial_stock: payload.initial_stock,
                minimum_stock_level: payload.minimum_stock_level,
                sku: payload.sku,
                notes: payload.notes,
            },
            actor.user_id,
        )
        .await
        .map_err(map_service_error)?;
    info!(item_id = %created.id, "item created");
    Ok(created_response(created))
}

async fn get_item(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state
        .services
        .items
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(item))
}

async fn update_item(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let updated = state
        .services
        .items
        .update(
            id,
            UpdateItemInput {
                name: payload.name,
                description: payload.description,
                category: payload.category,
                unit_of_measure: payload.unit_of_measure,
                minimum_stock_level: payload.minimum_stock_level,
                sku: payload.sku,
                notes: payload.notes,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(updated))
}

async fn delete_item(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .items
        .delete(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

/// Manual stock correction; writes a ledger movement alongside the change.
async fn adjust_stock(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustStockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let updated = state
        .services
        .items
        .adjust_stock(id, payload.delta, actor.user_id, payload.notes)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(updated))
}

async fn list_item_movements(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // 404 for unknown items instead of an empty ledger
    state
        .services
        .items
        .get(id)
        .await
        .map_err(map_service_error)?;
    let movements = state
        .services
        .stock_movements
        .list_for_item(id, query.limit)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(movements))
}

use super::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    auth::AuthUser,
    errors::ApiError,
    handlers::AppState,
    services::distributions::{DistributionLineInput, RecordDistributionInput},
    services::production::RecordProductionInput,
    services::purchasing::{PurchaseLineInput, RecordPurchaseInput},
};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Dashboard quick-entry endpoints: the day-to-day data capture paths.
pub fn quick_entry_routes() -> Router<AppState> {
    Router::new()
        .route("/production", post(record_production))
        .route("/purchase", post(record_purchase))
        .route("/distribution", post(record_distribution))
        .route("/dashboard/stats", get(dashboard_stats))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QuickProductionEntry {
    pub produced_item_id: Uuid,
    pub quantity_produced: Decimal,
    pub production_date: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PurchaseItemEntry {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QuickPurchaseEntry {
    pub purchase_date: Option<DateTime<Utc>>,
    #[validate(length(max = 255))]
    pub supplier_name: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<PurchaseItemEntry>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DistributionItemEntry {
    pub item_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct QuickDistributionEntry {
    pub distribution_date: Option<DateTime<Utc>>,
    /// Distribution type as its wire value (e.g. "weekly", "crisis_aid").
    /// Historical values are accepted and normalized to "other".
    #[validate(length(min = 1, max = 50))]
    pub distribution_type: String,
    pub recipient_info: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<DistributionItemEntry>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

async fn record_production(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(payload): Json<QuickProductionEntry>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .production
        .record(
            RecordProductionInput {
                produced_item_id: payload.produced_item_id,
                quantity_produced: payload.quantity_produced,
                production_date: payload.production_date,
                notes: payload.notes,
            },
            actor.user_id,
        )
        .await
        .map_err(map_service_error)?;
    Ok(created_response(created))
}

async fn record_purchase(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(payload): Json<QuickPurchaseEntry>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .purchasing
        .record(
            RecordPurchaseInput {
                purchase_date: payload.purchase_date,
                supplier_name: payload.supplier_name,
                items: payload
                    .items
                    .into_iter()
                    .map(|line| PurchaseLineInput {
                        item_id: line.item_id,
                        quantity: line.quantity,
                        unit_cost: line.unit_cost,
                    })
                    .collect(),
                notes: payload.notes,
            },
            actor.user_id,
        )
        .await
        .map_err(map_service_error)?;
    Ok(created_response(created))
}

async fn record_distribution(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(payload): Json<QuickDistributionEntry>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .distributions
        .record(
            RecordDistributionInput {
                distribution_date: payload.distribution_date,
                distribution_type: payload.distribution_type,
                recipient_info: payload.recipient_info,
                items: payload
                    .items
                    .into_iter()
                    .map(|line| DistributionLineInput {
                        item_id: line.item_id,
                        quantity: line.quantity,
                    })
                    .collect(),
                notes: payload.notes,
            },
            actor.user_id,
        )
        .await
        .map_err(map_service_error)?;
    Ok(created_response(created))
}

async fn dashboard_stats(
    State(state): State<AppState>,
    _actor: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .services
        .reports
        .dashboard_stats()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(stats))
}

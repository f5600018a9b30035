use super::common::{map_service_error, success_response};
use crate::{
    auth::AuthUser, entities::distribution::DistributionType, errors::ApiError,
    handlers::AppState, services::reports::ReportPeriod,
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/activity", get(activity_report))
        .route("/distributions", get(distributions_report))
        .route("/reconciliation", get(reconciliation_report))
}

fn default_period() -> String {
    "week".to_string()
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ActivityQuery {
    /// Time period: day, week, month
    #[serde(default = "default_period")]
    pub period: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DistributionsQuery {
    #[serde(default = "default_period")]
    pub period: String,
    pub distribution_type: Option<DistributionType>,
}

async fn activity_report(
    State(state): State<AppState>,
    _actor: AuthUser,
    Query(query): Query<ActivityQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (from, to) = match (query.start_date, query.end_date) {
        (Some(from), Some(to)) => (from, to),
        _ => ReportPeriod::parse(&query.period).range(Utc::now()),
    };
    let report = state
        .services
        .reports
        .activity(from, to)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(report))
}

async fn distributions_report(
    State(state): State<AppState>,
    _actor: AuthUser,
    Query(query): Query<DistributionsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (from, _) = ReportPeriod::parse(&query.period).range(Utc::now());
    let report = state
        .services
        .reports
        .distributions(from, query.distribution_type)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(report))
}

/// Ledger-vs-stock consistency check across all items.
async fn reconciliation_report(
    State(state): State<AppState>,
    _actor: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .services
        .reports
        .reconciliation()
        .await
        .map_err(map_service_error)?;
    Ok(success_response(report))
}

use super::common::{
    created_response, map_service_error, no_content_response, success_response, validate_input,
    LimitQuery,
};
use crate::{
    auth::AuthUser,
    entities::{assembly, kit_template},
    errors::ApiError,
    handlers::AppState,
    services::kit_templates::{ComponentInput, CreateKitTemplateInput, UpdateKitTemplateInput},
};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub fn kit_routes() -> Router<AppState> {
    Router::new()
        .route("/templates", get(list_templates).post(create_template))
        .route(
            "/templates/{id}",
            get(get_template)
                .patch(update_template)
                .delete(deactivate_template),
        )
        .route("/preview", post(preview_assembly))
        .route("/assemble", post(assemble_kits))
        .route("/assemblies", get(list_assemblies))
        .route("/assemblies/{id}", get(get_assembly))
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct KitComponentRequest {
    pub item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateKitTemplateRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub kit_item_id: Uuid,
    #[validate(length(min = 1))]
    pub components: Vec<KitComponentRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateKitTemplateRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub components: Option<Vec<KitComponentRequest>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssembleKitRequest {
    pub kit_template_id: Uuid,
    /// Number of kits to assemble
    #[validate(range(min = 1, max = 10000))]
    pub quantity: i32,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TemplatesQuery {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Template enriched with the output item's display name.
#[derive(Debug, Serialize, ToSchema)]
pub struct KitTemplateResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kit_item_id: Uuid,
    pub kit_item_name: String,
    pub components: kit_template::KitComponents,
    pub is_active: bool,
    pub created_by_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Assembly record enriched with the kit's display name.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssemblyResponse {
    pub id: Uuid,
    pub assembly_date: DateTime<Utc>,
    pub kit_template_id: Uuid,
    pub kit_item_id: Uuid,
    pub kit_name: String,
    pub quantity_assembled: i32,
    pub components_used: assembly::ComponentsUsed,
    pub assembled_by_user_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

async fn template_response(
    state: &AppState,
    template: kit_template::Model,
) -> Result<KitTemplateResponse, ApiError> {
    let kit_item_name = match state.services.items.get(template.kit_item_id).await {
        Ok(item) => item.name,
        Err(_) => "Unknown".to_string(),
    };
    Ok(KitTemplateResponse {
        id: template.id,
        name: template.name,
        description: template.description,
        kit_item_id: template.kit_item_id,
        kit_item_name,
        components: template.components,
        is_active: template.is_active,
        created_by_user_id: template.created_by_user_id,
        created_at: template.created_at,
        updated_at: template.updated_at,
    })
}

async fn assembly_response(
    state: &AppState,
    record: assembly::Model,
) -> Result<AssemblyResponse, ApiError> {
    let kit_name = match state.services.items.get(record.kit_item_id).await {
        Ok(item) => item.name,
        Err(_) => "Unknown".to_string(),
    };
    Ok(AssemblyResponse {
        id: record.id,
        assembly_date: record.assembly_date,
        kit_template_id: record.kit_template_id,
        kit_item_id: record.kit_item_id,
        kit_name,
        quantity_assembled: record.quantity_assembled,
        components_used: record.components_used,
        assembled_by_user_id: record.assembled_by_user_id,
        notes: record.notes,
        created_at: record.created_at,
    })
}

async fn list_templates(
    State(state): State<AppState>,
    _actor: AuthUser,
    Query(query): Query<TemplatesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let templates = state
        .services
        .kit_templates
        .list(query.include_inactive)
        .await
        .map_err(map_service_error)?;

    let mut out = Vec::with_capacity(templates.len());
    for template in templates {
        out.push(template_response(&state, template).await?);
    }
    Ok(success_response(out))
}

async fn create_template(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(payload): Json<CreateKitTemplateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let created = state
        .services
        .kit_templates
        .create(
            CreateKitTemplateInput {
                name: payload.name,
                description: payload.description,
                kit_item_id: payload.kit_item_id,
                components: payload
                    .components
                    .into_iter()
                    .map(|c| ComponentInput {
                        item_id: c.item_id,
                        quantity: c.quantity,
                    })
                    .collect(),
            },
            actor.user_id,
        )
        .await
        .map_err(map_service_error)?;
    info!(template_id = %created.id, "kit template created");
    Ok(created_response(template_response(&state, created).await?))
}

async fn get_template(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let template = state
        .services
        .kit_templates
        .get(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(template_response(&state, template).await?))
}

async fn update_template(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateKitTemplateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let updated = state
        .services
        .kit_templates
        .update(
            id,
            UpdateKitTemplateInput {
                name: payload.name,
                description: payload.description,
                components: payload.components.map(|components| {
                    components
                        .into_iter()
                        .map(|c| ComponentInput {
                            item_id: c.item_id,
                            quantity: c.quantity,
                        })
                        .collect()
                }),
                is_active: payload.is_active,
            },
        )
        .await
        .map_err(map_service_error)?;
    Ok(success_response(template_response(&state, updated).await?))
}

/// Soft delete: templates are deactivated, never removed.
async fn deactivate_template(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .kit_templates
        .deactivate(id)
        .await
        .map_err(map_service_error)?;
    Ok(no_content_response())
}

/// Dry run: reports component requirements and availability, no changes.
async fn preview_assembly(
    State(state): State<AppState>,
    _actor: AuthUser,
    Json(payload): Json<AssembleKitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let preview = state
        .services
        .assembly
        .preview(payload.kit_template_id, payload.quantity)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(preview))
}

async fn assemble_kits(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(payload): Json<AssembleKitRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;
    let record = state
        .services
        .assembly
        .assemble(
            payload.kit_template_id,
            payload.quantity,
            actor.user_id,
            payload.notes,
        )
        .await
        .map_err(map_service_error)?;
    Ok(created_response(assembly_response(&state, record).await?))
}

async fn list_assemblies(
    State(state): State<AppState>,
    _actor: AuthUser,
    Query(query): Query<LimitQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let records = state
        .services
        .assembly
        .list_assemblies(query.limit)
        .await
        .map_err(map_service_error)?;

    let mut out = Vec::with_capacity(records.len());
    for record in records {
        out.push(assembly_response(&state, record).await?);
    }
    Ok(success_response(out))
}

async fn get_assembly(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .services
        .assembly
        .get_assembly(id)
        .await
        .map_err(map_service_error)?;
    Ok(success_response(assembly_response(&state, record).await?))
}

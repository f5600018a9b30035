use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        item::{self, ItemCategory},
        kit_template::{self, KitComponent, KitComponents},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

/// One component line of a template being created or replaced.
#[derive(Debug, Clone)]
pub struct ComponentInput {
    pub item_id: Uuid,
    pub quantity: i32,
}

/// Input for creating a template.
#[derive(Debug, Clone)]
pub struct CreateKitTemplateInput {
    pub name: String,
    pub description: Option<String>,
    pub kit_item_id: Uuid,
    pub components: Vec<ComponentInput>,
}

/// Partial update. A `components` value replaces the whole list and
/// re-runs the full component validation.
#[derive(Debug, Clone, Default)]
pub struct UpdateKitTemplateInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub components: Option<Vec<ComponentInput>>,
    pub is_active: Option<bool>,
}

/// Registry of kit templates: the named bills of materials the assembly
/// engine executes. Templates are soft-deleted only.
#[derive(Clone)]
pub struct KitTemplateService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl KitTemplateService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: CreateKitTemplateInput,
        created_by: Uuid,
    ) -> Result<kit_template::Model, ServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "template name must not be empty".to_string(),
            ));
        }
        if self.name_taken(&name, None).await? {
            return Err(ServiceError::Conflict(format!(
                "kit template '{}' already exists",
                name
            )));
        }

        let kit_item = self.resolve_kit_item(input.kit_item_id).await?;
        let components = self.validate_components(&input.components).await?;

        let now = Utc::now();
        let model = kit_template::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(input.description),
            kit_item_id: Set(kit_item.id),
            components: Set(components),
            is_active: Set(true),
            created_by_user_id: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = model.insert(self.db.as_ref()).await?;

        self.event_sender
            .emit(Event::KitTemplateCreated(created.id))
            .await;
        Ok(created)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: Uuid,
        patch: UpdateKitTemplateInput,
    ) -> Result<kit_template::Model, ServiceError> {
        let existing = self.get(id).await?;

        if let Some(name) = patch.name.as_deref() {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "template name must not be empty".to_string(),
                ));
            }
            if !name.eq_ignore_ascii_case(&existing.name)
                && self.name_taken(name, Some(id)).await?
            {
                return Err(ServiceError::Conflict(format!(
                    "kit template '{}' already exists",
                    name
                )));
            }
        }

        let new_components = match &patch.components {
            Some(components) => Some(self.validate_components(components).await?),
            None => None,
        };

        let mut active: kit_template::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(components) = new_components {
            active.components = Set(components);
        }
        if let Some(is_active) = patch.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(self.db.as_ref()).await?;
        self.event_sender
            .emit(Event::KitTemplateUpdated(updated.id))
            .await;
        Ok(updated)
    }

    /// Soft delete: the template disappears from the assembly path but
    /// stays readable for the history of past assemblies.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: Uuid) -> Result<kit_template::Model, ServiceError> {
        let existing = self.get(id).await?;
        let mut active: kit_template::ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());
        let updated = active.update(self.db.as_ref()).await?;

        self.event_sender
            .emit(Event::KitTemplateDeactivated(updated.id))
            .await;
        Ok(updated)
    }

    pub async fn get(&self, id: Uuid) -> Result<kit_template::Model, ServiceError> {
        kit_template::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("kit template {} not found", id)))
    }

    pub async fn list(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<kit_template::Model>, ServiceError> {
        let mut query = kit_template::Entity::find();
        if !include_inactive {
            query = query.filter(kit_template::Column::IsActive.eq(true));
        }
        Ok(query
            .order_by_asc(kit_template::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    /// Case-insensitive duplicate check, optionally excluding one template
    /// (for renames).
    async fn name_taken(&self, name: &str, exclude: Option<Uuid>) -> Result<bool, ServiceError> {
        let mut query = kit_template::Entity::find().filter(
            Expr::expr(Func::lower(Expr::col(kit_template::Column::Name)))
                .eq(name.to_lowercase()),
        );
        if let Some(id) = exclude {
            query = query.filter(kit_template::Column::Id.ne(id));
        }
        Ok(query.one(self.db.as_ref()).await?.is_some())
    }

    async fn resolve_kit_item(&self, kit_item_id: Uuid) -> Result<item::Model, ServiceError> {
        let kit_item = item::Entity::find_by_id(kit_item_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("kit item {} not found", kit_item_id))
            })?;
        if kit_item.category != ItemCategory::AssembledKit {
            return Err(ServiceError::ValidationError(format!(
                "kit item must have category 'assembled_kit', not '{:?}'",
                kit_item.category
            )));
        }
        Ok(kit_item)
    }

    /// Enforces every component invariant and snapshots item names into the
    /// stored list.
    async fn validate_components(
        &self,
        components: &[ComponentInput],
    ) -> Result<KitComponents, ServiceError> {
        if components.is_empty() {
            return Err(ServiceError::ValidationError(
                "a kit template needs at least one component".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for component in components {
            if component.quantity <= 0 {
                return Err(ServiceError::ValidationError(
                    "component quantities must be positive".to_string(),
                ));
            }
            if !seen.insert(component.item_id) {
                return Err(ServiceError::ValidationError(
                    "duplicate component items are not allowed".to_string(),
                ));
            }
        }

        let ids: Vec<Uuid> = components.iter().map(|c| c.item_id).collect();
        let items = item::Entity::find()
            .filter(item::Column::Id.is_in(ids))
            .all(self.db.as_ref())
            .await?;
        if items.len() != components.len() {
            return Err(ServiceError::NotFound(
                "one or more component items not found".to_string(),
            ));
        }

        // Kits cannot contain kits.
        if let Some(nested) = items
            .iter()
            .find(|i| i.category == ItemCategory::AssembledKit)
        {
            return Err(ServiceError::ValidationError(format!(
                "component '{}' is an assembled kit; kits cannot contain other kits",
                nested.name
            )));
        }

        let by_id: std::collections::HashMap<Uuid, &item::Model> =
            items.iter().map(|i| (i.id, i)).collect();
        let mut snapshot = Vec::with_capacity(components.len());
        for component in components {
            let item = by_id.get(&component.item_id).ok_or_else(|| {
                ServiceError::NotFound(format!("component item {} not found", component.item_id))
            })?;
            snapshot.push(KitComponent {
                item_id: component.item_id,
                item_name: item.name.clone(),
                quantity: component.quantity,
            });
        }

        Ok(KitComponents(snapshot))
    }
}

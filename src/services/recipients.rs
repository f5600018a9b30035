use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::recipient,
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone)]
pub struct CreateRecipientInput {
    pub name: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRecipientInput {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

/// Recipient directory. Thin CRUD with soft delete.
#[derive(Clone)]
pub struct RecipientService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl RecipientService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: CreateRecipientInput,
    ) -> Result<recipient::Model, ServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "recipient name must not be empty".to_string(),
            ));
        }
        let existing = recipient::Entity::find()
            .filter(recipient::Column::Name.eq(name.clone()))
            .one(self.db.as_ref())
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "recipient '{}' already exists",
                name
            )));
        }

        let now = Utc::now();
        let row = recipient::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            notes: Set(input.notes),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let created = row.insert(self.db.as_ref()).await?;
        self.event_sender
            .emit(Event::RecipientCreated(created.id))
            .await;
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<recipient::Model, ServiceError> {
        recipient::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("recipient {} not found", id)))
    }

    pub async fn list(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<recipient::Model>, ServiceError> {
        let mut query = recipient::Entity::find();
        if !include_inactive {
            query = query.filter(recipient::Column::IsActive.eq(true));
        }
        Ok(query
            .order_by_asc(recipient::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: Uuid,
        patch: UpdateRecipientInput,
    ) -> Result<recipient::Model, ServiceError> {
        let existing = self.get(id).await?;

        if let Some(name) = patch.name.as_deref() {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "recipient name must not be empty".to_string(),
                ));
            }
            if name != existing.name {
                let clash = recipient::Entity::find()
                    .filter(recipient::Column::Name.eq(name))
                    .filter(recipient::Column::Id.ne(id))
                    .one(self.db.as_ref())
                    .await?;
                if clash.is_some() {
                    return Err(ServiceError::Conflict(format!(
                        "recipient '{}' already exists",
                        name
                    )));
                }
            }
        }

        let mut active: recipient::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(is_active) = patch.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(self.db.as_ref()).await?;
        self.event_sender
            .emit(Event::RecipientUpdated(updated.id))
            .await;
        Ok(updated)
    }

    /// Soft delete.
    pub async fn deactivate(&self, id: Uuid) -> Result<recipient::Model, ServiceError> {
        self.update(
            id,
            UpdateRecipientInput {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
    }
}

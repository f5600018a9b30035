use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionError, TransactionTrait,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        item::{self, ItemCategory},
        kit_template, stock_movement,
        stock_movement::{MovementType, ReferenceType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::stock_movements::{self, NewMovement},
};

/// Input for creating an item.
#[derive(Debug, Clone)]
pub struct CreateItemInput {
    pub name: String,
    pub description: Option<String>,
    pub category: ItemCategory,
    pub unit_of_measure: String,
    pub initial_stock: Option<Decimal>,
    pub minimum_stock_level: Option<Decimal>,
    pub sku: Option<String>,
    pub notes: Option<String>,
}

/// Partial update; untouched fields stay as they are.
#[derive(Debug, Clone, Default)]
pub struct UpdateItemInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ItemCategory>,
    pub unit_of_measure: Option<String>,
    pub minimum_stock_level: Option<Decimal>,
    pub sku: Option<String>,
    pub notes: Option<String>,
}

/// Filters for listing items.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub category: Option<ItemCategory>,
    pub low_stock_only: bool,
}

/// Item store: the single source of truth for current stock quantities.
/// All stock mutations go through transactional paths that also write the
/// movement ledger.
#[derive(Clone)]
pub struct ItemService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ItemService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: CreateItemInput,
        actor: Uuid,
    ) -> Result<item::Model, ServiceError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::ValidationError(
                "item name must not be empty".to_string(),
            ));
        }
        let initial = input.initial_stock.unwrap_or(Decimal::ZERO);
        if initial < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "initial stock must not be negative".to_string(),
            ));
        }
        if let Some(min) = input.minimum_stock_level {
            if min < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "minimum stock level must not be negative".to_string(),
                ));
            }
        }

        if let Some(sku) = input.sku.as_deref() {
            let existing = item::Entity::find()
                .filter(item::Column::Sku.eq(sku))
                .one(self.db.as_ref())
                .await?;
            if existing.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "SKU '{}' already exists",
                    sku
                )));
            }
        }

        let created = self
            .db
            .as_ref()
            .transaction::<_, item::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let now = Utc::now();
                    let model = item::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        name: Set(name),
                        description: Set(input.description),
                        category: Set(input.category),
                        unit_of_measure: Set(input.unit_of_measure),
                        current_stock_level: Set(initial),
                        minimum_stock_level: Set(input.minimum_stock_level),
                        sku: Set(input.sku),
                        notes: Set(input.notes),
                        created_at: Set(now),
                        updated_at: Set(now),
                    };
                    let created = model.insert(txn).await?;

                    // Non-zero opening stock gets a ledger entry so the
                    // reconciliation invariant holds from creation time.
                    if initial > Decimal::ZERO {
                        stock_movements::record(
                            txn,
                            NewMovement {
                                item_id: created.id,
                                movement_type: MovementType::In,
                                quantity: initial,
                                reference_type: ReferenceType::Adjustment,
                                reference_id: None,
                                user_id: actor,
                                notes: Some("initial stock".to_string()),
                            },
                        )
                        .await?;
                    }

                    Ok(created)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        self.event_sender.emit(Event::ItemCreated(created.id)).await;
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<item::Model, ServiceError> {
        item::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item {} not found", id)))
    }

    pub async fn list(&self, filter: ItemFilter) -> Result<Vec<item::Model>, ServiceError> {
        let mut query = item::Entity::find();
        if let Some(category) = filter.category {
            query = query.filter(item::Column::Category.eq(category));
        }
        if filter.low_stock_only {
            query = query
                .filter(item::Column::MinimumStockLevel.is_not_null())
                .filter(
                    Expr::col(item::Column::CurrentStockLevel)
                        .lte(Expr::col(item::Column::MinimumStockLevel)),
                );
        }
        Ok(query
            .order_by_asc(item::Column::Name)
            .all(self.db.as_ref())
            .await?)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: Uuid,
        patch: UpdateItemInput,
    ) -> Result<item::Model, ServiceError> {
        let existing = self.get(id).await?;

        if let Some(name) = patch.name.as_deref() {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "item name must not be empty".to_string(),
                ));
            }
        }

        if let Some(sku) = patch.sku.as_deref() {
            if existing.sku.as_deref() != Some(sku) {
                let clash = item::Entity::find()
                    .filter(item::Column::Sku.eq(sku))
                    .one(self.db.as_ref())
                    .await?;
                if clash.is_some() {
                    return Err(ServiceError::Conflict(format!(
                        "SKU '{}' already exists",
                        sku
                    )));
                }
            }
        }

        // Category drives template validation rules; once a template refers
        // to the item the category is frozen.
        if let Some(category) = patch.category {
            if category != existing.category && self.referenced_by_template(id).await? {
                return Err(ServiceError::Conflict(
                    "cannot change the category of an item referenced by a kit template"
                        .to_string(),
                ));
            }
        }

        let mut active: item::ActiveModel = existing.into();
        if let Some(name) = patch.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(category) = patch.category {
            active.category = Set(category);
        }
        if let Some(unit) = patch.unit_of_measure {
            active.unit_of_measure = Set(unit);
        }
        if let Some(min) = patch.minimum_stock_level {
            if min < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "minimum stock level must not be negative".to_string(),
                ));
            }
            active.minimum_stock_level = Set(Some(min));
        }
        if let Some(sku) = patch.sku {
            active.sku = Set(Some(sku));
        }
        if let Some(notes) = patch.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(self.db.as_ref()).await?;
        self.event_sender.emit(Event::ItemUpdated(updated.id)).await;
        Ok(updated)
    }

    /// Deletes an item. Refused once anything references it: deleting a
    /// referenced item would orphan ledger history and break reconciliation.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;

        let movement_count = stock_movement::Entity::find()
            .filter(stock_movement::Column::ItemId.eq(id))
            .count(self.db.as_ref())
            .await?;
        if movement_count > 0 {
            return Err(ServiceError::Conflict(
                "item has recorded stock movements and cannot be deleted".to_string(),
            ));
        }
        if self.referenced_by_template(id).await? {
            return Err(ServiceError::Conflict(
                "item is referenced by a kit template and cannot be deleted".to_string(),
            ));
        }

        item::Entity::delete_by_id(existing.id)
            .exec(self.db.as_ref())
            .await?;
        self.event_sender.emit(Event::ItemDeleted(id)).await;
        Ok(())
    }

    /// Manual stock correction. The delta is decomposed into an In or Out
    /// movement with reference type Adjustment; corrections that would
    /// drive stock negative are rejected.
    #[instrument(skip(self))]
    pub async fn adjust_stock(
        &self,
        id: Uuid,
        delta: Decimal,
        actor: Uuid,
        notes: Option<String>,
    ) -> Result<item::Model, ServiceError> {
        if delta == Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "adjustment delta must not be zero".to_string(),
            ));
        }

        let updated = self
            .db
            .as_ref()
            .transaction::<_, item::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let existing = item::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::NotFound(format!("item {} not found", id)))?;

                    if delta < Decimal::ZERO {
                        let required = -delta;
                        let res = item::Entity::update_many()
                            .col_expr(
                                item::Column::CurrentStockLevel,
                                Expr::col(item::Column::CurrentStockLevel).sub(required),
                            )
                            .col_expr(item::Column::UpdatedAt, Expr::value(Utc::now()))
                            .filter(item::Column::Id.eq(id))
                            .filter(item::Column::CurrentStockLevel.gte(required))
                            .exec(txn)
                            .await?;
                        if res.rows_affected == 0 {
                            return Err(ServiceError::InsufficientStock {
                                item_id: existing.id,
                                item_name: existing.name.clone(),
                                required,
                                available: existing.current_stock_level,
                            });
                        }
                    } else {
                        item::Entity::update_many()
                            .col_expr(
                                item::Column::CurrentStockLevel,
                                Expr::col(item::Column::CurrentStockLevel).add(delta),
                            )
                            .col_expr(item::Column::UpdatedAt, Expr::value(Utc::now()))
                            .filter(item::Column::Id.eq(id))
                            .exec(txn)
                            .await?;
                    }

                    let (movement_type, quantity) = if delta < Decimal::ZERO {
                        (MovementType::Out, -delta)
                    } else {
                        (MovementType::In, delta)
                    };
                    stock_movements::record(
                        txn,
                        NewMovement {
                            item_id: id,
                            movement_type,
                            quantity,
                            reference_type: ReferenceType::Adjustment,
                            reference_id: None,
                            user_id: actor,
                            notes,
                        },
                    )
                    .await?;

                    item::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| ServiceError::NotFound(format!("item {} not found", id)))
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        self.event_sender
            .emit(Event::StockAdjusted {
                item_id: updated.id,
                delta,
                new_level: updated.current_stock_level,
            })
            .await;
        Ok(updated)
    }

    async fn referenced_by_template(&self, item_id: Uuid) -> Result<bool, ServiceError> {
        // Component references live inside a JSON column; templates are few
        // enough that scanning them beats a backend-specific JSON query.
        let templates = kit_template::Entity::find().all(self.db.as_ref()).await?;
        Ok(templates.iter().any(|t| {
            t.kit_item_id == item_id || t.components.iter().any(|c| c.item_id == item_id)
        }))
    }
}

pub(crate) fn unwrap_txn_err(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::db_error(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        item, production,
        stock_movement::{MovementType, ReferenceType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::items::unwrap_txn_err,
    services::stock_movements::{self, NewMovement},
};

/// Input for recording an in-house production event.
#[derive(Debug, Clone)]
pub struct RecordProductionInput {
    pub produced_item_id: Uuid,
    pub quantity_produced: Decimal,
    pub production_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Records production events: stock credit plus ledger entry plus the
/// production row, in one transaction.
#[derive(Clone)]
pub struct ProductionService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl ProductionService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn record(
        &self,
        input: RecordProductionInput,
        actor: Uuid,
    ) -> Result<production::Model, ServiceError> {
        if input.quantity_produced <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "produced quantity must be positive".to_string(),
            ));
        }

        let created = self
            .db
            .as_ref()
            .transaction::<_, production::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let item = item::Entity::find_by_id(input.produced_item_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "item {} not found",
                                input.produced_item_id
                            ))
                        })?;

                    let now = Utc::now();
                    let row = production::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        production_date: Set(input.production_date.unwrap_or(now)),
                        produced_item_id: Set(item.id),
                        quantity_produced: Set(input.quantity_produced),
                        produced_by_user_id: Set(actor),
                        notes: Set(input.notes.clone()),
                        created_at: Set(now),
                    };
                    let created = row.insert(txn).await?;

                    item::Entity::update_many()
                        .col_expr(
                            item::Column::CurrentStockLevel,
                            Expr::col(item::Column::CurrentStockLevel)
                                .add(input.quantity_produced),
                        )
                        .col_expr(item::Column::UpdatedAt, Expr::value(now))
                        .filter(item::Column::Id.eq(item.id))
                        .exec(txn)
                        .await?;

                    stock_movements::record(
                        txn,
                        NewMovement {
                            item_id: item.id,
                            movement_type: MovementType::In,
                            quantity: input.quantity_produced,
                            reference_type: ReferenceType::Production,
                            reference_id: Some(created.id),
                            user_id: actor,
                            notes: input.notes,
                        },
                    )
                    .await?;

                    Ok(created)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        self.event_sender
            .emit(Event::ProductionRecorded {
                production_id: created.id,
                item_id: created.produced_item_id,
                quantity: created.quantity_produced,
            })
            .await;
        Ok(created)
    }

    pub async fn list(&self, limit: u64) -> Result<Vec<production::Model>, ServiceError> {
        Ok(production::Entity::find()
            .order_by_desc(production::Column::ProductionDate)
            .limit(limit)
            .all(self.db.as_ref())
            .await?)
    }
}

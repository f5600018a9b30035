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
        distribution::{self, DistributionLine, DistributionLines, DistributionType},
        item,
        stock_movement::{MovementType, ReferenceType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::items::unwrap_txn_err,
    services::stock_movements::{self, NewMovement},
};

/// One line of a distribution being recorded.
#[derive(Debug, Clone)]
pub struct DistributionLineInput {
    pub item_id: Uuid,
    pub quantity: Decimal,
}

/// Input for recording a distribution. The type arrives as the raw string
/// so historical values are accepted: unknown values normalize to `Other`
/// with the original preserved alongside.
#[derive(Debug, Clone)]
pub struct RecordDistributionInput {
    pub distribution_date: Option<DateTime<Utc>>,
    pub distribution_type: String,
    pub recipient_info: Option<String>,
    pub items: Vec<DistributionLineInput>,
    pub notes: Option<String>,
}

/// Records outgoing aid distributions: availability-gated multi-item debit
/// with one Out movement per line, in one transaction.
#[derive(Clone)]
pub struct DistributionService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl DistributionService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn record(
        &self,
        input: RecordDistributionInput,
        actor: Uuid,
    ) -> Result<distribution::Model, ServiceError> {
        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "a distribution needs at least one line".to_string(),
            ));
        }
        for line in &input.items {
            if line.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "distributed quantities must be positive".to_string(),
                ));
            }
        }

        let (distribution_type, legacy) =
            DistributionType::from_legacy(&input.distribution_type);

        let created = self
            .db
            .as_ref()
            .transaction::<_, distribution::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let ids: Vec<Uuid> = input.items.iter().map(|l| l.item_id).collect();
                    let found = item::Entity::find()
                        .filter(item::Column::Id.is_in(ids))
                        .all(txn)
                        .await?;
                    if found.len() != input.items.len() {
                        return Err(ServiceError::NotFound(
                            "one or more distributed items not found".to_string(),
                        ));
                    }

                    // Gate every line before the first write.
                    for line in &input.items {
                        let item = found
                            .iter()
                            .find(|i| i.id == line.item_id)
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "item {} not found",
                                    line.item_id
                                ))
                            })?;
                        if item.current_stock_level < line.quantity {
                            return Err(ServiceError::InsufficientStock {
                                item_id: item.id,
                                item_name: item.name.clone(),
                                required: line.quantity,
                                available: item.current_stock_level,
                            });
                        }
                    }

                    let now = Utc::now();
                    let distribution_id = Uuid::new_v4();
                    let lines = DistributionLines(
                        input
                            .items
                            .iter()
                            .map(|l| DistributionLine {
                                item_id: l.item_id,
                                quantity: l.quantity,
                            })
                            .collect(),
                    );

                    let row = distribution::ActiveModel {
                        id: Set(distribution_id),
                        distribution_date: Set(input.distribution_date.unwrap_or(now)),
                        distribution_type: Set(distribution_type),
                        items_distributed: Set(lines),
                        recipient_info: Set(input.recipient_info),
                        distributed_by_user_id: Set(actor),
                        notes: Set(input.notes),
                        distribution_type_legacy: Set(legacy),
                        created_at: Set(now),
                    };
                    let created = row.insert(txn).await?;

                    for line in &input.items {
                        let item = found
                            .iter()
                            .find(|i| i.id == line.item_id)
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "item {} not found",
                                    line.item_id
                                ))
                            })?;

                        let result = item::Entity::update_many()
                            .col_expr(
                                item::Column::CurrentStockLevel,
                                Expr::col(item::Column::CurrentStockLevel).sub(line.quantity),
                            )
                            .col_expr(item::Column::UpdatedAt, Expr::value(now))
                            .filter(item::Column::Id.eq(line.item_id))
                            .filter(item::Column::CurrentStockLevel.gte(line.quantity))
                            .exec(txn)
                            .await?;
                        if result.rows_affected == 0 {
                            return Err(ServiceError::InsufficientStock {
                                item_id: item.id,
                                item_name: item.name.clone(),
                                required: line.quantity,
                                available: item.current_stock_level,
                            });
                        }

                        stock_movements::record(
                            txn,
                            NewMovement {
                                item_id: line.item_id,
                                movement_type: MovementType::Out,
                                quantity: line.quantity,
                                reference_type: ReferenceType::Distribution,
                                reference_id: Some(distribution_id),
                                user_id: actor,
                                notes: None,
                            },
                        )
                        .await?;
                    }

                    Ok(created)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        self.event_sender
            .emit(Event::DistributionRecorded {
                distribution_id: created.id,
                line_count: created.items_distributed.0.len(),
            })
            .await;
        Ok(created)
    }

    pub async fn list(
        &self,
        limit: u64,
        distribution_type: Option<DistributionType>,
    ) -> Result<Vec<distribution::Model>, ServiceError> {
        let mut query = distribution::Entity::find();
        if let Some(kind) = distribution_type {
            query = query.filter(distribution::Column::DistributionType.eq(kind));
        }
        Ok(query
            .order_by_desc(distribution::Column::DistributionDate)
            .limit(limit)
            .all(self.db.as_ref())
            .await?)
    }
}

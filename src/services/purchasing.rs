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
        item,
        purchase::{self, PurchaseLine, PurchaseLines},
        stock_movement::{MovementType, ReferenceType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::items::unwrap_txn_err,
    services::stock_movements::{self, NewMovement},
};

/// One line of a purchase being recorded.
#[derive(Debug, Clone)]
pub struct PurchaseLineInput {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
}

/// Input for recording a purchase.
#[derive(Debug, Clone)]
pub struct RecordPurchaseInput {
    pub purchase_date: Option<DateTime<Utc>>,
    pub supplier_name: Option<String>,
    pub items: Vec<PurchaseLineInput>,
    pub notes: Option<String>,
}

/// Records purchases: one transaction crediting every purchased line and
/// appending one In movement per line.
#[derive(Clone)]
pub struct PurchasingService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl PurchasingService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self, input))]
    pub async fn record(
        &self,
        input: RecordPurchaseInput,
        actor: Uuid,
    ) -> Result<purchase::Model, ServiceError> {
        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "a purchase needs at least one line".to_string(),
            ));
        }
        for line in &input.items {
            if line.quantity <= Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "purchased quantities must be positive".to_string(),
                ));
            }
            if let Some(cost) = line.unit_cost {
                if cost < Decimal::ZERO {
                    return Err(ServiceError::ValidationError(
                        "unit cost must not be negative".to_string(),
                    ));
                }
            }
        }

        let created = self
            .db
            .as_ref()
            .transaction::<_, purchase::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let ids: Vec<Uuid> = input.items.iter().map(|l| l.item_id).collect();
                    let found = item::Entity::find()
                        .filter(item::Column::Id.is_in(ids))
                        .all(txn)
                        .await?;
                    if found.len() != input.items.len() {
                        return Err(ServiceError::NotFound(
                            "one or more purchased items not found".to_string(),
                        ));
                    }

                    let total: Decimal = input
                        .items
                        .iter()
                        .map(|l| l.quantity * l.unit_cost.unwrap_or(Decimal::ZERO))
                        .sum();
                    let total_cost = (total > Decimal::ZERO).then_some(total);

                    let now = Utc::now();
                    let purchase_id = Uuid::new_v4();
                    let lines = PurchaseLines(
                        input
                            .items
                            .iter()
                            .map(|l| PurchaseLine {
                                item_id: l.item_id,
                                quantity: l.quantity,
                                unit_cost: l.unit_cost,
                            })
                            .collect(),
                    );

                    let row = purchase::ActiveModel {
                        id: Set(purchase_id),
                        purchase_date: Set(input.purchase_date.unwrap_or(now)),
                        supplier_name: Set(input.supplier_name),
                        items_purchased: Set(lines),
                        total_cost: Set(total_cost),
                        received_by_user_id: Set(actor),
                        notes: Set(input.notes),
                        created_at: Set(now),
                    };
                    let created = row.insert(txn).await?;

                    for line in &input.items {
                        item::Entity::update_many()
                            .col_expr(
                                item::Column::CurrentStockLevel,
                                Expr::col(item::Column::CurrentStockLevel).add(line.quantity),
                            )
                            .col_expr(item::Column::UpdatedAt, Expr::value(now))
                            .filter(item::Column::Id.eq(line.item_id))
                            .exec(txn)
                            .await?;

                        stock_movements::record(
                            txn,
                            NewMovement {
                                item_id: line.item_id,
                                movement_type: MovementType::In,
                                quantity: line.quantity,
                                reference_type: ReferenceType::Purchase,
                                reference_id: Some(purchase_id),
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
            .emit(Event::PurchaseRecorded {
                purchase_id: created.id,
                line_count: created.items_purchased.0.len(),
            })
            .await;
        Ok(created)
    }

    pub async fn list(&self, limit: u64) -> Result<Vec<purchase::Model>, ServiceError> {
        Ok(purchase::Entity::find()
            .order_by_desc(purchase::Column::PurchaseDate)
            .limit(limit)
            .all(self.db.as_ref())
            .await?)
    }
}

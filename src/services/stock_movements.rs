//! Append-only stock movement ledger.
//!
//! Every change to an item's stock level is mirrored by exactly one
//! movement row, written inside the same transaction as the stock change.
//! There is no update or delete path: the ledger is the audit trail, and
//! the signed sum of an item's movements must always reconcile with its
//! current stock level.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::stock_movement::{self, MovementType, ReferenceType},
    errors::ServiceError,
};

/// One movement to append. The id and timestamp are assigned at write time.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub item_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub reference_type: ReferenceType,
    pub reference_id: Option<Uuid>,
    pub user_id: Uuid,
    pub notes: Option<String>,
}

/// Appends one movement on the given connection. Callers performing stock
/// mutations pass their open transaction so the ledger entry commits or
/// rolls back together with the stock change.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    movement: NewMovement,
) -> Result<stock_movement::Model, ServiceError> {
    if movement.quantity <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "movement quantity must be positive".to_string(),
        ));
    }

    let row = stock_movement::ActiveModel {
        id: Set(Uuid::new_v4()),
        item_id: Set(movement.item_id),
        movement_type: Set(movement.movement_type),
        quantity: Set(movement.quantity),
        reference_type: Set(movement.reference_type),
        reference_id: Set(movement.reference_id),
        user_id: Set(movement.user_id),
        notes: Set(movement.notes),
        created_at: Set(Utc::now()),
    };

    Ok(row.insert(conn).await?)
}

/// Read side of the ledger, used by reporting and invariant checks.
#[derive(Clone)]
pub struct StockMovementService {
    db: Arc<DbPool>,
}

impl StockMovementService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Movements for one item, newest first.
    pub async fn list_for_item(
        &self,
        item_id: Uuid,
        limit: u64,
    ) -> Result<Vec<stock_movement::Model>, ServiceError> {
        Ok(stock_movement::Entity::find()
            .filter(stock_movement::Column::ItemId.eq(item_id))
            .order_by_desc(stock_movement::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?)
    }

    /// Movements caused by one originating operation.
    pub async fn list_for_reference(
        &self,
        reference_type: ReferenceType,
        reference_id: Uuid,
    ) -> Result<Vec<stock_movement::Model>, ServiceError> {
        Ok(stock_movement::Entity::find()
            .filter(stock_movement::Column::ReferenceType.eq(reference_type))
            .filter(stock_movement::Column::ReferenceId.eq(reference_id))
            .order_by_asc(stock_movement::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?)
    }

    /// Movements within a time range, oldest first.
    pub async fn list_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<stock_movement::Model>, ServiceError> {
        Ok(stock_movement::Entity::find()
            .filter(stock_movement::Column::CreatedAt.gte(from))
            .filter(stock_movement::Column::CreatedAt.lte(to))
            .order_by_asc(stock_movement::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?)
    }

    /// Most recent movements across all items.
    pub async fn recent(&self, limit: u64) -> Result<Vec<stock_movement::Model>, ServiceError> {
        Ok(stock_movement::Entity::find()
            .order_by_desc(stock_movement::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?)
    }

    /// Signed sum of all movements recorded against an item. Must equal the
    /// item's current stock level at all times.
    pub async fn ledger_balance(&self, item_id: Uuid) -> Result<Decimal, ServiceError> {
        let movements = stock_movement::Entity::find()
            .filter(stock_movement::Column::ItemId.eq(item_id))
            .all(self.db.as_ref())
            .await?;

        Ok(movements
            .iter()
            .fold(Decimal::ZERO, |acc, m| acc + m.signed_quantity()))
    }
}

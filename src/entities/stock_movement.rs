use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Direction of a stock movement. Quantity is always stored positive; the
/// direction carries the sign.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    #[sea_orm(string_value = "in")]
    In,
    #[sea_orm(string_value = "out")]
    Out,
    /// Restatement entry retained for imported history; current code paths
    /// decompose manual corrections into `In`/`Out` rows instead.
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

/// Causal linkage back to the operation that produced the movement.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    #[sea_orm(string_value = "production")]
    Production,
    #[sea_orm(string_value = "purchase")]
    Purchase,
    #[sea_orm(string_value = "assembly")]
    Assembly,
    #[sea_orm(string_value = "distribution")]
    Distribution,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
}

/// Append-only ledger row: one atomic directional change to one item's
/// stock. The signed sum of an item's movements must reconcile with its
/// current stock level at all times.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub reference_type: ReferenceType,
    pub reference_id: Option<Uuid>,
    pub user_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// The movement's contribution to the item's running balance.
    pub fn signed_quantity(&self) -> Decimal {
        match self.movement_type {
            MovementType::In | MovementType::Adjustment => self.quantity,
            MovementType::Out => -self.quantity,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::ItemId",
        to = "super::item::Column::Id"
    )]
    Item,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One purchased line item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PurchaseLine {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
}

/// JSON-backed purchase line list column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct PurchaseLines(pub Vec<PurchaseLine>);

/// Purchase event: incoming inventory from an external supplier.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub purchase_date: DateTime<Utc>,
    pub supplier_name: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub items_purchased: PurchaseLines,
    pub total_cost: Option<Decimal>,
    pub received_by_user_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Item categories. Category membership drives validation: only
/// `AssembledKit` items may be the output of a kit template, and an
/// `AssembledKit` item may never appear as a template component.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    #[sea_orm(string_value = "raw_material")]
    RawMaterial,
    #[sea_orm(string_value = "in_house_product")]
    InHouseProduct,
    #[sea_orm(string_value = "purchased_item")]
    PurchasedItem,
    #[sea_orm(string_value = "assembled_kit")]
    AssembledKit,
}

/// Inventory item. `current_stock_level` is the single source of truth for
/// on-hand quantity; every change to it is mirrored by exactly one stock
/// movement row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: ItemCategory,
    pub unit_of_measure: String,
    pub current_stock_level: Decimal,
    pub minimum_stock_level: Option<Decimal>,
    pub sku: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// True when a minimum threshold is set and stock is at or below it.
    pub fn is_low_stock(&self) -> bool {
        self.minimum_stock_level
            .map(|min| self.current_stock_level <= min)
            .unwrap_or(false)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_movement::Entity")]
    StockMovements,
}

impl Related<super::stock_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Frozen snapshot of one component consumed by an assembly, captured at
/// execution time. Distinct from the live `KitComponent` in the template:
/// later template edits never touch this record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ComponentUsed {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity_per_kit: i32,
    pub total_used: Decimal,
}

/// JSON-backed snapshot column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct ComponentsUsed(pub Vec<ComponentUsed>);

/// Immutable audit record of one kit assembly run. Written once inside the
/// assembly transaction and never updated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "assemblies")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub assembly_date: DateTime<Utc>,
    pub kit_template_id: Uuid,
    /// Denormalized output item so history survives template deactivation.
    pub kit_item_id: Uuid,
    pub quantity_assembled: i32,
    #[sea_orm(column_type = "Json")]
    pub components_used: ComponentsUsed,
    pub assembled_by_user_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::kit_template::Entity",
        from = "Column::KitTemplateId",
        to = "super::kit_template::Column::Id"
    )]
    KitTemplate,
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::KitItemId",
        to = "super::item::Column::Id"
    )]
    KitItem,
}

impl Related<super::kit_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KitTemplate.def()
    }
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KitItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

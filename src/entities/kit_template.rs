use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One component line of a template's bill of materials. The item name is a
/// point-in-time snapshot taken when the component list is written, so the
/// stored recipe stays readable even if the item is renamed later.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct KitComponent {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i32,
}

/// JSON-backed component list column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct KitComponents(pub Vec<KitComponent>);

impl KitComponents {
    pub fn iter(&self) -> std::slice::Iter<'_, KitComponent> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Kit template: the named recipe producing one `AssembledKit` item from a
/// fixed list of component items. Templates are never physically deleted;
/// deactivation removes them from the assembly path while keeping history
/// readable.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "kit_templates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub kit_item_id: Uuid,
    #[sea_orm(column_type = "Json")]
    pub components: KitComponents,
    pub is_active: bool,
    pub created_by_user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::item::Entity",
        from = "Column::KitItemId",
        to = "super::item::Column::Id"
    )]
    KitItem,
}

impl Related<super::item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KitItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Cadence or kind of an outgoing aid distribution.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum DistributionType {
    #[sea_orm(string_value = "weekly")]
    Weekly,
    #[sea_orm(string_value = "bi_weekly")]
    BiWeekly,
    #[sea_orm(string_value = "monthly")]
    Monthly,
    #[sea_orm(string_value = "bi_monthly")]
    BiMonthly,
    #[sea_orm(string_value = "crisis_aid")]
    CrisisAid,
    #[sea_orm(string_value = "other")]
    Other,
}

impl DistributionType {
    /// Normalizes a historical distribution-type value. Values that predate
    /// the simplified set map to `Other`, with the original string preserved
    /// so reports can still show it.
    pub fn from_legacy(value: &str) -> (Self, Option<String>) {
        match value {
            "weekly" => (Self::Weekly, None),
            "bi_weekly" => (Self::BiWeekly, None),
            "monthly" => (Self::Monthly, None),
            "bi_monthly" => (Self::BiMonthly, None),
            "crisis_aid" => (Self::CrisisAid, None),
            "other" => (Self::Other, None),
            legacy => (Self::Other, Some(legacy.to_string())),
        }
    }
}

/// One distributed line item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DistributionLine {
    pub item_id: Uuid,
    pub quantity: Decimal,
}

/// JSON-backed distribution line list column.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult, ToSchema)]
pub struct DistributionLines(pub Vec<DistributionLine>);

/// Distribution event: an outgoing aid package handed to a recipient.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "distributions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub distribution_date: DateTime<Utc>,
    pub distribution_type: DistributionType,
    #[sea_orm(column_type = "Json")]
    pub items_distributed: DistributionLines,
    pub recipient_info: Option<String>,
    pub distributed_by_user_id: Uuid,
    pub notes: Option<String>,
    /// Original pre-migration type value, kept verbatim when the normalized
    /// type is `Other`.
    pub distribution_type_legacy: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

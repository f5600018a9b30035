//! Reporting: read-only aggregations over the operation history and the
//! movement ledger. Nothing here mutates state.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        assembly, distribution, distribution::DistributionType, item, production, purchase,
        stock_movement, user,
    },
    errors::ServiceError,
};

/// Reporting window shorthand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Day,
    Week,
    Month,
}

impl ReportPeriod {
    /// Lenient parse; anything unrecognized falls back to a week.
    pub fn parse(value: &str) -> Self {
        match value {
            "day" => Self::Day,
            "month" => Self::Month,
            _ => Self::Week,
        }
    }

    pub fn range(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let from = match self {
            Self::Day => now - Duration::days(1),
            Self::Week => now - Duration::days(7),
            Self::Month => now - Duration::days(30),
        };
        (from, now)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductionSummary {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub item_name: String,
    pub quantity: Decimal,
    pub user_name: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportLine {
    pub item_name: String,
    pub quantity: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurchaseSummary {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub supplier_name: Option<String>,
    pub items: Vec<ReportLine>,
    pub total_cost: Option<Decimal>,
    pub user_name: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DistributionSummary {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub distribution_type: DistributionType,
    /// Original pre-migration value when the type was normalized to Other.
    pub distribution_type_legacy: Option<String>,
    pub items: Vec<ReportLine>,
    pub recipient_info: Option<String>,
    pub user_name: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssemblyComponentLine {
    pub item_name: String,
    pub quantity_per_kit: i32,
    pub total_used: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssemblySummary {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub kit_name: String,
    pub quantity_assembled: i32,
    pub components: Vec<AssemblyComponentLine>,
    pub user_name: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserActivity {
    pub user_name: String,
    pub productions_count: u64,
    pub purchases_count: u64,
    pub distributions_count: u64,
    pub assemblies_count: u64,
    pub total_entries: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivitySummary {
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub total_productions: u64,
    pub total_purchases: u64,
    pub total_distributions: u64,
    pub total_assemblies: u64,
    pub total_items_distributed: Decimal,
    pub unique_users: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComprehensiveReport {
    pub summary: ActivitySummary,
    pub user_activities: Vec<UserActivity>,
    pub productions: Vec<ProductionSummary>,
    pub purchases: Vec<PurchaseSummary>,
    pub distributions: Vec<DistributionSummary>,
    pub assemblies: Vec<AssemblySummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecentActivity {
    pub item_name: String,
    pub movement_type: stock_movement::MovementType,
    pub reference_type: stock_movement::ReferenceType,
    pub quantity: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_items: u64,
    pub low_stock_items: u64,
    pub productions_this_week: u64,
    pub distributions_this_week: u64,
    pub recent_activity: Vec<RecentActivity>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReconciliationRow {
    pub item_id: Uuid,
    pub item_name: String,
    pub current_stock_level: Decimal,
    pub ledger_balance: Decimal,
    pub consistent: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReconciliationReport {
    pub items: Vec<ReconciliationRow>,
    pub consistent: bool,
}

#[derive(Clone)]
pub struct ReportService {
    db: Arc<DbPool>,
}

impl ReportService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Comprehensive activity report over a window.
    #[instrument(skip(self))]
    pub async fn activity(
        &self,
        date_from: DateTime<Utc>,
        date_to: DateTime<Utc>,
    ) -> Result<ComprehensiveReport, ServiceError> {
        let db = self.db.as_ref();
        let users = self.user_names().await?;
        let items = self.item_names().await?;

        let productions = production::Entity::find()
            .filter(production::Column::ProductionDate.gte(date_from))
            .filter(production::Column::ProductionDate.lte(date_to))
            .order_by_desc(production::Column::ProductionDate)
            .all(db)
            .await?;
        let purchases = purchase::Entity::find()
            .filter(purchase::Column::PurchaseDate.gte(date_from))
            .filter(purchase::Column::PurchaseDate.lte(date_to))
            .order_by_desc(purchase::Column::PurchaseDate)
            .all(db)
            .await?;
        let distributions = distribution::Entity::find()
            .filter(distribution::Column::DistributionDate.gte(date_from))
            .filter(distribution::Column::DistributionDate.lte(date_to))
            .order_by_desc(distribution::Column::DistributionDate)
            .all(db)
            .await?;
        let assemblies = assembly::Entity::find()
            .filter(assembly::Column::AssemblyDate.gte(date_from))
            .filter(assembly::Column::AssemblyDate.lte(date_to))
            .order_by_desc(assembly::Column::AssemblyDate)
            .all(db)
            .await?;

        let mut tallies: HashMap<Uuid, (u64, u64, u64, u64)> = HashMap::new();
        for p in &productions {
            tallies.entry(p.produced_by_user_id).or_default().0 += 1;
        }
        for p in &purchases {
            tallies.entry(p.received_by_user_id).or_default().1 += 1;
        }
        for d in &distributions {
            tallies.entry(d.distributed_by_user_id).or_default().2 += 1;
        }
        for a in &assemblies {
            tallies.entry(a.assembled_by_user_id).or_default().3 += 1;
        }

        let user_activities = tallies
            .iter()
            .map(|(user_id, (prod, purch, dist, asm))| UserActivity {
                user_name: display_name(&users, user_id),
                productions_count: *prod,
                purchases_count: *purch,
                distributions_count: *dist,
                assemblies_count: *asm,
                total_entries: prod + purch + dist + asm,
            })
            .collect();

        let total_items_distributed = distributions
            .iter()
            .flat_map(|d| d.items_distributed.0.iter())
            .map(|line| line.quantity)
            .sum();

        let summary = ActivitySummary {
            date_from,
            date_to,
            total_productions: productions.len() as u64,
            total_purchases: purchases.len() as u64,
            total_distributions: distributions.len() as u64,
            total_assemblies: assemblies.len() as u64,
            total_items_distributed,
            unique_users: tallies.len() as u64,
        };

        Ok(ComprehensiveReport {
            summary,
            user_activities,
            productions: productions
                .into_iter()
                .map(|p| ProductionSummary {
                    id: p.id,
                    date: p.production_date,
                    item_name: display_name(&items, &p.produced_item_id),
                    quantity: p.quantity_produced,
                    user_name: display_name(&users, &p.produced_by_user_id),
                    notes: p.notes,
                })
                .collect(),
            purchases: purchases
                .into_iter()
                .map(|p| PurchaseSummary {
                    id: p.id,
                    date: p.purchase_date,
                    supplier_name: p.supplier_name,
                    items: p
                        .items_purchased
                        .0
                        .iter()
                        .map(|line| ReportLine {
                            item_name: display_name(&items, &line.item_id),
                            quantity: line.quantity,
                            unit_cost: line.unit_cost,
                        })
                        .collect(),
                    total_cost: p.total_cost,
                    user_name: display_name(&users, &p.received_by_user_id),
                    notes: p.notes,
                })
                .collect(),
            distributions: distributions
                .into_iter()
                .map(|d| distribution_summary(&users, &items, d))
                .collect(),
            assemblies: assemblies
                .into_iter()
                .map(|a| AssemblySummary {
                    id: a.id,
                    date: a.assembly_date,
                    kit_name: display_name(&items, &a.kit_item_id),
                    quantity_assembled: a.quantity_assembled,
                    components: a
                        .components_used
                        .0
                        .iter()
                        .map(|c| AssemblyComponentLine {
                            item_name: c.item_name.clone(),
                            quantity_per_kit: c.quantity_per_kit,
                            total_used: c.total_used,
                        })
                        .collect(),
                    user_name: display_name(&users, &a.assembled_by_user_id),
                    notes: a.notes,
                })
                .collect(),
        })
    }

    /// Distributions over a window, optionally filtered by type.
    #[instrument(skip(self))]
    pub async fn distributions(
        &self,
        date_from: DateTime<Utc>,
        distribution_type: Option<DistributionType>,
    ) -> Result<Vec<DistributionSummary>, ServiceError> {
        let users = self.user_names().await?;
        let items = self.item_names().await?;

        let mut query = distribution::Entity::find()
            .filter(distribution::Column::DistributionDate.gte(date_from));
        if let Some(kind) = distribution_type {
            query = query.filter(distribution::Column::DistributionType.eq(kind));
        }
        let rows = query
            .order_by_desc(distribution::Column::DistributionDate)
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|d| distribution_summary(&users, &items, d))
            .collect())
    }

    /// Headline numbers plus a recent-movement feed for the dashboard.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError> {
        let db = self.db.as_ref();
        let week_start = Utc::now() - Duration::days(7);

        let total_items = item::Entity::find().count(db).await?;
        let low_stock_items = item::Entity::find()
            .filter(item::Column::MinimumStockLevel.is_not_null())
            .filter(
                Expr::col(item::Column::CurrentStockLevel)
                    .lte(Expr::col(item::Column::MinimumStockLevel)),
            )
            .count(db)
            .await?;
        let productions_this_week = production::Entity::find()
            .filter(production::Column::ProductionDate.gte(week_start))
            .count(db)
            .await?;
        let distributions_this_week = distribution::Entity::find()
            .filter(distribution::Column::DistributionDate.gte(week_start))
            .count(db)
            .await?;

        let items = self.item_names().await?;
        let recent = stock_movement::Entity::find()
            .order_by_desc(stock_movement::Column::CreatedAt)
            .limit(10)
            .all(db)
            .await?;
        let recent_activity = recent
            .into_iter()
            .map(|m| RecentActivity {
                item_name: display_name(&items, &m.item_id),
                movement_type: m.movement_type,
                reference_type: m.reference_type,
                quantity: m.quantity,
                timestamp: m.created_at,
            })
            .collect();

        Ok(DashboardStats {
            total_items,
            low_stock_items,
            productions_this_week,
            distributions_this_week,
            recent_activity,
        })
    }

    /// Checks every item's stock level against the signed sum of its ledger
    /// movements.
    #[instrument(skip(self))]
    pub async fn reconciliation(&self) -> Result<ReconciliationReport, ServiceError> {
        let db = self.db.as_ref();
        let items = item::Entity::find()
            .order_by_asc(item::Column::Name)
            .all(db)
            .await?;
        let movements = stock_movement::Entity::find().all(db).await?;

        let mut balances: HashMap<Uuid, Decimal> = HashMap::new();
        for movement in &movements {
            *balances.entry(movement.item_id).or_insert(Decimal::ZERO) +=
                movement.signed_quantity();
        }

        let rows: Vec<ReconciliationRow> = items
            .into_iter()
            .map(|item| {
                let ledger_balance = balances.get(&item.id).copied().unwrap_or(Decimal::ZERO);
                ReconciliationRow {
                    item_id: item.id,
                    consistent: ledger_balance == item.current_stock_level,
                    item_name: item.name,
                    current_stock_level: item.current_stock_level,
                    ledger_balance,
                }
            })
            .collect();

        let consistent = rows.iter().all(|r| r.consistent);
        Ok(ReconciliationReport {
            items: rows,
            consistent,
        })
    }

    async fn user_names(&self) -> Result<HashMap<Uuid, String>, ServiceError> {
        let users = user::Entity::find().all(self.db.as_ref()).await?;
        Ok(users
            .into_iter()
            .map(|u| {
                let name = u.full_name.clone().unwrap_or_else(|| u.username.clone());
                (u.id, name)
            })
            .collect())
    }

    async fn item_names(&self) -> Result<HashMap<Uuid, String>, ServiceError> {
        let items = item::Entity::find().all(self.db.as_ref()).await?;
        Ok(items.into_iter().map(|i| (i.id, i.name)).collect())
    }
}

fn display_name(names: &HashMap<Uuid, String>, id: &Uuid) -> String {
    names
        .get(id)
        .cloned()
        .unwrap_or_else(|| "Unknown".to_string())
}

fn distribution_summary(
    users: &HashMap<Uuid, String>,
    items: &HashMap<Uuid, String>,
    d: distribution::Model,
) -> DistributionSummary {
    DistributionSummary {
        id: d.id,
        date: d.distribution_date,
        distribution_type: d.distribution_type,
        distribution_type_legacy: d.distribution_type_legacy,
        items: d
            .items_distributed
            .0
            .iter()
            .map(|line| ReportLine {
                item_name: display_name(items, &line.item_id),
                quantity: line.quantity,
                unit_cost: None,
            })
            .collect(),
        recipient_info: d.recipient_info,
        user_name: display_name(users, &d.distributed_by_user_id),
        notes: d.notes,
    }
}

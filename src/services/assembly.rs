//! Kit assembly engine.
//!
//! `preview` is the side-effect-free planner: it computes total component
//! requirements for a requested kit quantity and reports availability.
//! `assemble` is the executor: one database transaction that re-validates
//! availability against committed data, deducts every component, credits
//! the assembled kit, appends one ledger movement per stock change, and
//! persists the immutable assembly record. Any failure rolls the whole
//! unit back; callers decide whether to resubmit.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        assembly::{self, ComponentUsed, ComponentsUsed},
        item, kit_template,
        stock_movement::{MovementType, ReferenceType},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::items::unwrap_txn_err,
    services::stock_movements::{self, NewMovement},
};

/// Practical ceiling per assembly run, to reject fat-finger input.
pub const MAX_KITS_PER_ASSEMBLY: i32 = 10_000;

/// Availability of one component for a requested run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ComponentAvailability {
    pub item_id: Uuid,
    pub item_name: String,
    pub required_quantity: Decimal,
    pub available_quantity: Decimal,
    pub sufficient: bool,
}

/// Dry-run report: what an assembly would consume and whether it can run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssemblyPreview {
    pub kit_template_id: Uuid,
    pub template_name: String,
    pub kit_item_id: Uuid,
    pub kit_item_name: String,
    pub kits_requested: i32,
    pub components: Vec<ComponentAvailability>,
    pub can_assemble: bool,
    pub insufficient_items: Vec<String>,
}

#[derive(Clone)]
pub struct AssemblyService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl AssemblyService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Computes component requirements without mutating anything. Calling
    /// it repeatedly with no intervening writes returns identical results.
    #[instrument(skip(self))]
    pub async fn preview(
        &self,
        template_id: Uuid,
        quantity: i32,
    ) -> Result<AssemblyPreview, ServiceError> {
        validate_quantity(quantity)?;
        let db = self.db.as_ref();

        let template = find_active_template(db, template_id).await?;
        let kit_item = item::Entity::find_by_id(template.kit_item_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("kit item {} not found", template.kit_item_id))
            })?;

        let mut components = Vec::with_capacity(template.components.len());
        let mut insufficient_items = Vec::new();

        for component in template.components.iter() {
            let item = item::Entity::find_by_id(component.item_id)
                .one(db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "component item {} not found",
                        component.item_id
                    ))
                })?;

            let required = required_quantity(component.quantity, quantity);
            let sufficient = item.current_stock_level >= required;
            if !sufficient {
                insufficient_items.push(item.name.clone());
            }
            components.push(ComponentAvailability {
                item_id: item.id,
                item_name: item.name,
                required_quantity: required,
                available_quantity: item.current_stock_level,
                sufficient,
            });
        }

        let can_assemble = components.iter().all(|c| c.sufficient);

        Ok(AssemblyPreview {
            kit_template_id: template.id,
            template_name: template.name,
            kit_item_id: kit_item.id,
            kit_item_name: kit_item.name,
            kits_requested: quantity,
            components,
            can_assemble,
            insufficient_items,
        })
    }

    /// Executes an assembly as a single all-or-nothing unit.
    ///
    /// The availability check runs inside the transaction against committed
    /// data, and every deduction carries a `stock >= required` predicate,
    /// so two assemblies racing for the same scarce component cannot both
    /// succeed.
    #[instrument(skip(self, notes))]
    pub async fn assemble(
        &self,
        template_id: Uuid,
        quantity: i32,
        actor: Uuid,
        notes: Option<String>,
    ) -> Result<assembly::Model, ServiceError> {
        validate_quantity(quantity)?;

        let record = self
            .db
            .as_ref()
            .transaction::<_, assembly::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let template = find_active_template(txn, template_id).await?;
                    let kit_item = item::Entity::find_by_id(template.kit_item_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "kit item {} not found",
                                template.kit_item_id
                            ))
                        })?;

                    // Gate on availability before any write. Items may have
                    // been deleted or drained since the caller's preview.
                    let mut plan = Vec::with_capacity(template.components.len());
                    for component in template.components.iter() {
                        let item = item::Entity::find_by_id(component.item_id)
                            .one(txn)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "component item {} not found",
                                    component.item_id
                                ))
                            })?;

                        let required = required_quantity(component.quantity, quantity);
                        if item.current_stock_level < required {
                            return Err(ServiceError::InsufficientStock {
                                item_id: item.id,
                                item_name: item.name,
                                required,
                                available: item.current_stock_level,
                            });
                        }
                        plan.push((component.clone(), item, required));
                    }

                    let assembly_id = Uuid::new_v4();
                    let now = Utc::now();

                    // Deduct components. The predicate re-checks stock at
                    // write time; rows_affected == 0 means a concurrent
                    // sibling spent the stock after our read.
                    for (component, component_item, required) in &plan {
                        let result = item::Entity::update_many()
                            .col_expr(
                                item::Column::CurrentStockLevel,
                                Expr::col(item::Column::CurrentStockLevel).sub(*required),
                            )
                            .col_expr(item::Column::UpdatedAt, Expr::value(now))
                            .filter(item::Column::Id.eq(component.item_id))
                            .filter(item::Column::CurrentStockLevel.gte(*required))
                            .exec(txn)
                            .await?;
                        if result.rows_affected == 0 {
                            return Err(ServiceError::InsufficientStock {
                                item_id: component_item.id,
                                item_name: component_item.name.clone(),
                                required: *required,
                                available: component_item.current_stock_level,
                            });
                        }

                        stock_movements::record(
                            txn,
                            NewMovement {
                                item_id: component.item_id,
                                movement_type: MovementType::Out,
                                quantity: *required,
                                reference_type: ReferenceType::Assembly,
                                reference_id: Some(assembly_id),
                                user_id: actor,
                                notes: Some(format!(
                                    "used in assembling {} x {}",
                                    quantity, template.name
                                )),
                            },
                        )
                        .await?;
                    }

                    // Credit the assembled kits.
                    item::Entity::update_many()
                        .col_expr(
                            item::Column::CurrentStockLevel,
                            Expr::col(item::Column::CurrentStockLevel)
                                .add(Decimal::from(quantity)),
                        )
                        .col_expr(item::Column::UpdatedAt, Expr::value(now))
                        .filter(item::Column::Id.eq(kit_item.id))
                        .exec(txn)
                        .await?;

                    stock_movements::record(
                        txn,
                        NewMovement {
                            item_id: kit_item.id,
                            movement_type: MovementType::In,
                            quantity: Decimal::from(quantity),
                            reference_type: ReferenceType::Assembly,
                            reference_id: Some(assembly_id),
                            user_id: actor,
                            notes: Some(format!(
                                "assembled {} x {}",
                                quantity, template.name
                            )),
                        },
                    )
                    .await?;

                    // Freeze the consumed components into the audit record.
                    let components_used = ComponentsUsed(
                        plan.iter()
                            .map(|(component, component_item, required)| ComponentUsed {
                                item_id: component.item_id,
                                item_name: component_item.name.clone(),
                                quantity_per_kit: component.quantity,
                                total_used: *required,
                            })
                            .collect(),
                    );

                    let record = assembly::ActiveModel {
                        id: Set(assembly_id),
                        assembly_date: Set(now),
                        kit_template_id: Set(template.id),
                        kit_item_id: Set(kit_item.id),
                        quantity_assembled: Set(quantity),
                        components_used: Set(components_used),
                        assembled_by_user_id: Set(actor),
                        notes: Set(notes),
                        created_at: Set(now),
                    };

                    Ok(record.insert(txn).await?)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(
            assembly_id = %record.id,
            kit_template_id = %record.kit_template_id,
            quantity = record.quantity_assembled,
            "assembly committed"
        );
        self.event_sender
            .emit(Event::KitsAssembled {
                assembly_id: record.id,
                kit_template_id: record.kit_template_id,
                kit_item_id: record.kit_item_id,
                quantity: record.quantity_assembled,
            })
            .await;

        Ok(record)
    }

    /// Recent assembly runs, newest first.
    pub async fn list_assemblies(
        &self,
        limit: u64,
    ) -> Result<Vec<assembly::Model>, ServiceError> {
        Ok(assembly::Entity::find()
            .order_by_desc(assembly::Column::AssemblyDate)
            .limit(limit)
            .all(self.db.as_ref())
            .await?)
    }

    pub async fn get_assembly(&self, id: Uuid) -> Result<assembly::Model, ServiceError> {
        assembly::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("assembly {} not found", id)))
    }
}

fn validate_quantity(quantity: i32) -> Result<(), ServiceError> {
    if quantity < 1 {
        return Err(ServiceError::ValidationError(
            "kit quantity must be at least 1".to_string(),
        ));
    }
    if quantity > MAX_KITS_PER_ASSEMBLY {
        return Err(ServiceError::ValidationError(format!(
            "cannot assemble more than {} kits at once",
            MAX_KITS_PER_ASSEMBLY
        )));
    }
    Ok(())
}

/// Per-kit quantity times kit count, in integer arithmetic, widened for the
/// decimal comparison against stock.
fn required_quantity(per_kit: i32, kits: i32) -> Decimal {
    Decimal::from(per_kit as i64 * kits as i64)
}

async fn find_active_template<C: sea_orm::ConnectionTrait>(
    conn: &C,
    template_id: Uuid,
) -> Result<kit_template::Model, ServiceError> {
    kit_template::Entity::find_by_id(template_id)
        .filter(kit_template::Column::IsActive.eq(true))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "kit template {} not found or inactive",
                template_id
            ))
        })
}

//! Item store and ledger tests around the quick-entry flows: manual
//! adjustments, production, purchases, and distributions.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};

use common::{seed_item, setup};
use reliefstock_api::{
    entities::{
        distribution,
        item::{self, ItemCategory},
        stock_movement::{self, MovementType, ReferenceType},
    },
    errors::ServiceError,
    services::distributions::{DistributionLineInput, RecordDistributionInput},
    services::items::{CreateItemInput, UpdateItemInput},
    services::production::RecordProductionInput,
    services::purchasing::{PurchaseLineInput, RecordPurchaseInput},
};

#[tokio::test]
async fn item_creation_with_opening_stock_writes_ledger_entry() {
    let ctx = setup().await;

    let created = ctx
        .services
        .items
        .create(
            CreateItemInput {
                name: "Blanket".to_string(),
                description: None,
                category: ItemCategory::PurchasedItem,
                unit_of_measure: "units".to_string(),
                initial_stock: Some(dec!(25)),
                minimum_stock_level: Some(dec!(5)),
                sku: Some("BLK-001".to_string()),
                notes: None,
            },
            ctx.actor,
        )
        .await
        .unwrap();

    assert_eq!(created.current_stock_level, dec!(25));
    let movements = ctx
        .services
        .stock_movements
        .list_for_item(created.id, 10)
        .await
        .unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].movement_type, MovementType::In);
    assert_eq!(movements[0].reference_type, ReferenceType::Adjustment);
    assert_eq!(movements[0].quantity, dec!(25));

    let balance = ctx
        .services
        .stock_movements
        .ledger_balance(created.id)
        .await
        .unwrap();
    assert_eq!(balance, created.current_stock_level);
}

#[tokio::test]
async fn manual_adjustment_decomposes_into_directional_movements() {
    let ctx = setup().await;
    let soap = seed_item(&ctx.db, "Soap", ItemCategory::PurchasedItem, dec!(10)).await;

    let after_gain = ctx
        .services
        .items
        .adjust_stock(soap.id, dec!(5), ctx.actor, Some("recount".to_string()))
        .await
        .unwrap();
    assert_eq!(after_gain.current_stock_level, dec!(15));

    let after_loss = ctx
        .services
        .items
        .adjust_stock(soap.id, dec!(-2.5), ctx.actor, Some("damaged".to_string()))
        .await
        .unwrap();
    assert_eq!(after_loss.current_stock_level, dec!(12.5));

    let movements = ctx
        .services
        .stock_movements
        .list_for_item(soap.id, 10)
        .await
        .unwrap();
    assert_eq!(movements.len(), 2);
    assert!(movements
        .iter()
        .all(|m| m.reference_type == ReferenceType::Adjustment));
    assert!(movements
        .iter()
        .any(|m| m.movement_type == MovementType::In && m.quantity == dec!(5)));
    assert!(movements
        .iter()
        .any(|m| m.movement_type == MovementType::Out && m.quantity == dec!(2.5)));
}

#[tokio::test]
async fn adjustment_cannot_drive_stock_negative() {
    let ctx = setup().await;
    let soap = seed_item(&ctx.db, "Soap", ItemCategory::PurchasedItem, dec!(3)).await;

    let err = ctx
        .services
        .items
        .adjust_stock(soap.id, dec!(-4), ctx.actor, None)
        .await
        .expect_err("over-withdrawal must fail");
    assert_matches!(
        err,
        ServiceError::InsufficientStock {
            required,
            available,
            ..
        } if required == dec!(4) && available == dec!(3)
    );

    let unchanged = ctx.services.items.get(soap.id).await.unwrap();
    assert_eq!(unchanged.current_stock_level, dec!(3));
    assert_eq!(
        stock_movement::Entity::find()
            .count(ctx.db.as_ref())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn production_credits_stock_with_linked_movement() {
    let ctx = setup().await;
    let bread = seed_item(&ctx.db, "Bread", ItemCategory::InHouseProduct, dec!(0)).await;

    let production = ctx
        .services
        .production
        .record(
            RecordProductionInput {
                produced_item_id: bread.id,
                quantity_produced: dec!(40),
                production_date: None,
                notes: Some("morning bake".to_string()),
            },
            ctx.actor,
        )
        .await
        .unwrap();

    let updated = ctx.services.items.get(bread.id).await.unwrap();
    assert_eq!(updated.current_stock_level, dec!(40));

    let movements = ctx
        .services
        .stock_movements
        .list_for_reference(ReferenceType::Production, production.id)
        .await
        .unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].movement_type, MovementType::In);
    assert_eq!(movements[0].quantity, dec!(40));
}

#[tokio::test]
async fn purchase_credits_every_line_and_totals_cost() {
    let ctx = setup().await;
    let rice = seed_item(&ctx.db, "Rice", ItemCategory::PurchasedItem, dec!(5)).await;
    let oil = seed_item(&ctx.db, "Oil", ItemCategory::PurchasedItem, dec!(0)).await;

    let purchase = ctx
        .services
        .purchasing
        .record(
            RecordPurchaseInput {
                purchase_date: None,
                supplier_name: Some("Wholesale Ltd".to_string()),
                items: vec![
                    PurchaseLineInput {
                        item_id: rice.id,
                        quantity: dec!(20),
                        unit_cost: Some(dec!(2)),
                    },
                    PurchaseLineInput {
                        item_id: oil.id,
                        quantity: dec!(10),
                        unit_cost: Some(dec!(3.5)),
                    },
                ],
                notes: None,
            },
            ctx.actor,
        )
        .await
        .unwrap();

    assert_eq!(purchase.total_cost, Some(dec!(75)));
    assert_eq!(
        ctx.services
            .items
            .get(rice.id)
            .await
            .unwrap()
            .current_stock_level,
        dec!(25)
    );
    assert_eq!(
        ctx.services
            .items
            .get(oil.id)
            .await
            .unwrap()
            .current_stock_level,
        dec!(10)
    );

    let movements = ctx
        .services
        .stock_movements
        .list_for_reference(ReferenceType::Purchase, purchase.id)
        .await
        .unwrap();
    assert_eq!(movements.len(), 2);
    assert!(movements.iter().all(|m| m.movement_type == MovementType::In));
}

#[tokio::test]
async fn distribution_is_gated_and_atomic_across_lines() {
    let ctx = setup().await;
    let rice = seed_item(&ctx.db, "Rice", ItemCategory::PurchasedItem, dec!(20)).await;
    let oil = seed_item(&ctx.db, "Oil", ItemCategory::PurchasedItem, dec!(2)).await;

    let err = ctx
        .services
        .distributions
        .record(
            RecordDistributionInput {
                distribution_date: None,
                distribution_type: "weekly".to_string(),
                recipient_info: Some("Camp East".to_string()),
                items: vec![
                    DistributionLineInput {
                        item_id: rice.id,
                        quantity: dec!(5),
                    },
                    DistributionLineInput {
                        item_id: oil.id,
                        quantity: dec!(3),
                    },
                ],
                notes: None,
            },
            ctx.actor,
        )
        .await
        .expect_err("insufficient oil must fail the whole distribution");
    assert_matches!(
        err,
        ServiceError::InsufficientStock { item_name, .. } if item_name == "Oil"
    );

    // first line must not have been applied
    assert_eq!(
        ctx.services
            .items
            .get(rice.id)
            .await
            .unwrap()
            .current_stock_level,
        dec!(20)
    );
    assert_eq!(
        stock_movement::Entity::find()
            .count(ctx.db.as_ref())
            .await
            .unwrap(),
        0
    );
    assert_eq!(
        distribution::Entity::find()
            .count(ctx.db.as_ref())
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn legacy_distribution_types_normalize_to_other() {
    let ctx = setup().await;
    let rice = seed_item(&ctx.db, "Rice", ItemCategory::PurchasedItem, dec!(20)).await;

    let created = ctx
        .services
        .distributions
        .record(
            RecordDistributionInput {
                distribution_date: None,
                distribution_type: "school_delivery".to_string(),
                recipient_info: None,
                items: vec![DistributionLineInput {
                    item_id: rice.id,
                    quantity: dec!(5),
                }],
                notes: None,
            },
            ctx.actor,
        )
        .await
        .unwrap();

    assert_eq!(
        created.distribution_type,
        distribution::DistributionType::Other
    );
    assert_eq!(
        created.distribution_type_legacy.as_deref(),
        Some("school_delivery")
    );

    // known values keep their type and carry no legacy marker
    let weekly = ctx
        .services
        .distributions
        .record(
            RecordDistributionInput {
                distribution_date: None,
                distribution_type: "weekly".to_string(),
                recipient_info: None,
                items: vec![DistributionLineInput {
                    item_id: rice.id,
                    quantity: dec!(1),
                }],
                notes: None,
            },
            ctx.actor,
        )
        .await
        .unwrap();
    assert_eq!(
        weekly.distribution_type,
        distribution::DistributionType::Weekly
    );
    assert_eq!(weekly.distribution_type_legacy, None);
}

#[tokio::test]
async fn movement_queries_cover_item_reference_and_range() {
    let ctx = setup().await;
    let soap = seed_item(&ctx.db, "Soap", ItemCategory::PurchasedItem, dec!(10)).await;

    ctx.services
        .items
        .adjust_stock(soap.id, dec!(5), ctx.actor, None)
        .await
        .unwrap();
    ctx.services
        .items
        .adjust_stock(soap.id, dec!(-1), ctx.actor, None)
        .await
        .unwrap();

    let by_item = ctx
        .services
        .stock_movements
        .list_for_item(soap.id, 10)
        .await
        .unwrap();
    assert_eq!(by_item.len(), 2);

    let now = Utc::now();
    let in_range = ctx
        .services
        .stock_movements
        .list_in_range(now - Duration::minutes(5), now)
        .await
        .unwrap();
    assert_eq!(in_range.len(), 2);

    let empty_range = ctx
        .services
        .stock_movements
        .list_in_range(now - Duration::days(2), now - Duration::days(1))
        .await
        .unwrap();
    assert!(empty_range.is_empty());

    let recent = ctx.services.stock_movements.recent(1).await.unwrap();
    assert_eq!(recent.len(), 1);
}

#[tokio::test]
async fn item_deletion_is_blocked_once_referenced() {
    let ctx = setup().await;

    // deletable while untouched
    let fresh = seed_item(&ctx.db, "Fresh", ItemCategory::PurchasedItem, dec!(0)).await;
    ctx.services.items.delete(fresh.id).await.unwrap();
    assert!(item::Entity::find_by_id(fresh.id)
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .is_none());

    // blocked once movements exist
    let used = seed_item(&ctx.db, "Used", ItemCategory::PurchasedItem, dec!(5)).await;
    ctx.services
        .items
        .adjust_stock(used.id, dec!(1), ctx.actor, None)
        .await
        .unwrap();
    let err = ctx
        .services
        .items
        .delete(used.id)
        .await
        .expect_err("delete must be blocked");
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn category_change_is_frozen_by_template_references() {
    let ctx = setup().await;
    let kit = seed_item(&ctx.db, "Kit", ItemCategory::AssembledKit, dec!(0)).await;
    let soap = seed_item(&ctx.db, "Soap", ItemCategory::PurchasedItem, dec!(10)).await;

    ctx.services
        .kit_templates
        .create(
            reliefstock_api::services::kit_templates::CreateKitTemplateInput {
                name: "Kit Standard".to_string(),
                description: None,
                kit_item_id: kit.id,
                components: vec![
                    reliefstock_api::services::kit_templates::ComponentInput {
                        item_id: soap.id,
                        quantity: 1,
                    },
                ],
            },
            ctx.actor,
        )
        .await
        .unwrap();

    let err = ctx
        .services
        .items
        .update(
            soap.id,
            UpdateItemInput {
                category: Some(ItemCategory::AssembledKit),
                ..Default::default()
            },
        )
        .await
        .expect_err("category change must be blocked");
    assert_matches!(err, ServiceError::Conflict(_));

    // unrelated fields still update
    let renamed = ctx
        .services
        .items
        .update(
            soap.id,
            UpdateItemInput {
                name: Some("Bar Soap".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Bar Soap");
}

#[tokio::test]
async fn low_stock_filter_uses_minimum_threshold() {
    let ctx = setup().await;

    ctx.services
        .items
        .create(
            CreateItemInput {
                name: "Low".to_string(),
                description: None,
                category: ItemCategory::PurchasedItem,
                unit_of_measure: "units".to_string(),
                initial_stock: Some(dec!(2)),
                minimum_stock_level: Some(dec!(5)),
                sku: None,
                notes: None,
            },
            ctx.actor,
        )
        .await
        .unwrap();
    ctx.services
        .items
        .create(
            CreateItemInput {
                name: "Plenty".to_string(),
                description: None,
                category: ItemCategory::PurchasedItem,
                unit_of_measure: "units".to_string(),
                initial_stock: Some(dec!(50)),
                minimum_stock_level: Some(dec!(5)),
                sku: None,
                notes: None,
            },
            ctx.actor,
        )
        .await
        .unwrap();

    let low = ctx
        .services
        .items
        .list(reliefstock_api::services::items::ItemFilter {
            category: None,
            low_stock_only: true,
        })
        .await
        .unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].name, "Low");
    assert!(low[0].is_low_stock());

    let all = ctx
        .services
        .items
        .list(Default::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
}

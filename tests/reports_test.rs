//! Reporting aggregation tests.

mod common;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

use common::{seed_item, setup};
use reliefstock_api::{
    entities::{distribution::DistributionType, item::ItemCategory},
    services::distributions::{DistributionLineInput, RecordDistributionInput},
    services::kit_templates::{ComponentInput, CreateKitTemplateInput},
    services::production::RecordProductionInput,
    services::purchasing::{PurchaseLineInput, RecordPurchaseInput},
    services::reports::ReportPeriod,
};

#[tokio::test]
async fn activity_report_aggregates_all_operation_kinds() {
    let ctx = setup().await;
    let bread = seed_item(&ctx.db, "Bread", ItemCategory::InHouseProduct, dec!(0)).await;
    let soap = seed_item(&ctx.db, "Soap", ItemCategory::PurchasedItem, dec!(50)).await;
    let kit = seed_item(&ctx.db, "Kit", ItemCategory::AssembledKit, dec!(0)).await;

    ctx.services
        .production
        .record(
            RecordProductionInput {
                produced_item_id: bread.id,
                quantity_produced: dec!(30),
                production_date: None,
                notes: None,
            },
            ctx.actor,
        )
        .await
        .unwrap();

    ctx.services
        .purchasing
        .record(
            RecordPurchaseInput {
                purchase_date: None,
                supplier_name: None,
                items: vec![PurchaseLineInput {
                    item_id: soap.id,
                    quantity: dec!(10),
                    unit_cost: None,
                }],
                notes: None,
            },
            ctx.actor,
        )
        .await
        .unwrap();

    let template = ctx
        .services
        .kit_templates
        .create(
            CreateKitTemplateInput {
                name: "Kit Standard".to_string(),
                description: None,
                kit_item_id: kit.id,
                components: vec![ComponentInput {
                    item_id: soap.id,
                    quantity: 2,
                }],
            },
            ctx.actor,
        )
        .await
        .unwrap();
    ctx.services
        .assembly
        .assemble(template.id, 5, ctx.actor, None)
        .await
        .unwrap();

    ctx.services
        .distributions
        .record(
            RecordDistributionInput {
                distribution_date: None,
                distribution_type: "monthly".to_string(),
                recipient_info: None,
                items: vec![
                    DistributionLineInput {
                        item_id: kit.id,
                        quantity: dec!(3),
                    },
                    DistributionLineInput {
                        item_id: bread.id,
                        quantity: dec!(10),
                    },
                ],
                notes: None,
            },
            ctx.actor,
        )
        .await
        .unwrap();

    let (from, to) = ReportPeriod::Week.range(Utc::now());
    let report = ctx.services.reports.activity(from, to).await.unwrap();

    assert_eq!(report.summary.total_productions, 1);
    assert_eq!(report.summary.total_purchases, 1);
    assert_eq!(report.summary.total_assemblies, 1);
    assert_eq!(report.summary.total_distributions, 1);
    assert_eq!(report.summary.total_items_distributed, dec!(13));
    assert_eq!(report.summary.unique_users, 1);

    assert_eq!(report.user_activities.len(), 1);
    let activity = &report.user_activities[0];
    assert_eq!(activity.user_name, "Warehouse Manager");
    assert_eq!(activity.total_entries, 4);

    assert_eq!(report.productions[0].item_name, "Bread");
    assert_eq!(report.assemblies[0].kit_name, "Kit");
    assert_eq!(report.assemblies[0].quantity_assembled, 5);
    assert_eq!(report.distributions[0].items.len(), 2);
}

#[tokio::test]
async fn distributions_report_filters_by_type() {
    let ctx = setup().await;
    let rice = seed_item(&ctx.db, "Rice", ItemCategory::PurchasedItem, dec!(100)).await;

    for (kind, qty) in [("weekly", dec!(5)), ("crisis_aid", dec!(7))] {
        ctx.services
            .distributions
            .record(
                RecordDistributionInput {
                    distribution_date: None,
                    distribution_type: kind.to_string(),
                    recipient_info: None,
                    items: vec![DistributionLineInput {
                        item_id: rice.id,
                        quantity: qty,
                    }],
                    notes: None,
                },
                ctx.actor,
            )
            .await
            .unwrap();
    }

    let all = ctx
        .services
        .reports
        .distributions(Utc::now() - Duration::days(7), None)
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let crisis_only = ctx
        .services
        .reports
        .distributions(
            Utc::now() - Duration::days(7),
            Some(DistributionType::CrisisAid),
        )
        .await
        .unwrap();
    assert_eq!(crisis_only.len(), 1);
    assert_eq!(crisis_only[0].items[0].quantity, dec!(7));
}

#[tokio::test]
async fn dashboard_stats_count_items_and_recent_movements() {
    let ctx = setup().await;

    ctx.services
        .items
        .create(
            reliefstock_api::services::items::CreateItemInput {
                name: "Low".to_string(),
                description: None,
                category: ItemCategory::PurchasedItem,
                unit_of_measure: "units".to_string(),
                initial_stock: Some(dec!(1)),
                minimum_stock_level: Some(dec!(5)),
                sku: None,
                notes: None,
            },
            ctx.actor,
        )
        .await
        .unwrap();
    seed_item(&ctx.db, "Plain", ItemCategory::RawMaterial, dec!(0)).await;

    let stats = ctx.services.reports.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_items, 2);
    assert_eq!(stats.low_stock_items, 1);
    assert_eq!(stats.productions_this_week, 0);
    assert_eq!(stats.distributions_this_week, 0);
    // the opening-stock ledger entry shows up as recent activity
    assert_eq!(stats.recent_activity.len(), 1);
    assert_eq!(stats.recent_activity[0].item_name, "Low");
}

#[tokio::test]
async fn period_parsing_is_lenient() {
    assert_eq!(ReportPeriod::parse("day"), ReportPeriod::Day);
    assert_eq!(ReportPeriod::parse("month"), ReportPeriod::Month);
    assert_eq!(ReportPeriod::parse("week"), ReportPeriod::Week);
    assert_eq!(ReportPeriod::parse("fortnight"), ReportPeriod::Week);

    let now = Utc::now();
    let (from, to) = ReportPeriod::Month.range(now);
    assert_eq!(to, now);
    assert_eq!(to - from, Duration::days(30));
}

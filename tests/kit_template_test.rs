//! Template registry validation and lifecycle tests.

mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;

use common::{seed_item, setup};
use reliefstock_api::{
    entities::item::ItemCategory,
    errors::ServiceError,
    services::kit_templates::{
        ComponentInput, CreateKitTemplateInput, UpdateKitTemplateInput,
    },
};

#[tokio::test]
async fn create_rejects_kit_items_as_components() {
    let ctx = setup().await;
    let kit = seed_item(&ctx.db, "School Kit", ItemCategory::AssembledKit, dec!(0)).await;
    let nested = seed_item(&ctx.db, "Starter Kit", ItemCategory::AssembledKit, dec!(5)).await;
    let pencil = seed_item(&ctx.db, "Pencil", ItemCategory::PurchasedItem, dec!(100)).await;

    let err = ctx
        .services
        .kit_templates
        .create(
            CreateKitTemplateInput {
                name: "School Kit Standard".to_string(),
                description: None,
                kit_item_id: kit.id,
                components: vec![
                    ComponentInput {
                        item_id: pencil.id,
                        quantity: 10,
                    },
                    ComponentInput {
                        item_id: nested.id,
                        quantity: 1,
                    },
                ],
            },
            ctx.actor,
        )
        .await
        .expect_err("nested kit must be rejected");

    assert_matches!(err, ServiceError::ValidationError(_));
    assert!(err.to_string().contains("Starter Kit"));
}

#[tokio::test]
async fn create_requires_assembled_kit_output() {
    let ctx = setup().await;
    let not_a_kit = seed_item(&ctx.db, "Rice Bag", ItemCategory::PurchasedItem, dec!(0)).await;
    let rice = seed_item(&ctx.db, "Rice", ItemCategory::RawMaterial, dec!(100)).await;

    let err = ctx
        .services
        .kit_templates
        .create(
            CreateKitTemplateInput {
                name: "Food Pack".to_string(),
                description: None,
                kit_item_id: not_a_kit.id,
                components: vec![ComponentInput {
                    item_id: rice.id,
                    quantity: 2,
                }],
            },
            ctx.actor,
        )
        .await
        .expect_err("non-kit output must be rejected");
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn create_validates_component_list_shape() {
    let ctx = setup().await;
    let kit = seed_item(&ctx.db, "Kit", ItemCategory::AssembledKit, dec!(0)).await;
    let soap = seed_item(&ctx.db, "Soap", ItemCategory::PurchasedItem, dec!(10)).await;

    // empty component list
    let err = ctx
        .services
        .kit_templates
        .create(
            CreateKitTemplateInput {
                name: "Empty".to_string(),
                description: None,
                kit_item_id: kit.id,
                components: vec![],
            },
            ctx.actor,
        )
        .await
        .expect_err("empty components must be rejected");
    assert_matches!(err, ServiceError::ValidationError(_));

    // non-positive quantity
    let err = ctx
        .services
        .kit_templates
        .create(
            CreateKitTemplateInput {
                name: "Zero".to_string(),
                description: None,
                kit_item_id: kit.id,
                components: vec![ComponentInput {
                    item_id: soap.id,
                    quantity: 0,
                }],
            },
            ctx.actor,
        )
        .await
        .expect_err("zero quantity must be rejected");
    assert_matches!(err, ServiceError::ValidationError(_));

    // duplicate component references
    let err = ctx
        .services
        .kit_templates
        .create(
            CreateKitTemplateInput {
                name: "Duplicates".to_string(),
                description: None,
                kit_item_id: kit.id,
                components: vec![
                    ComponentInput {
                        item_id: soap.id,
                        quantity: 1,
                    },
                    ComponentInput {
                        item_id: soap.id,
                        quantity: 2,
                    },
                ],
            },
            ctx.actor,
        )
        .await
        .expect_err("duplicate components must be rejected");
    assert_matches!(err, ServiceError::ValidationError(_));

    // unknown component
    let err = ctx
        .services
        .kit_templates
        .create(
            CreateKitTemplateInput {
                name: "Ghost".to_string(),
                description: None,
                kit_item_id: kit.id,
                components: vec![ComponentInput {
                    item_id: uuid::Uuid::new_v4(),
                    quantity: 1,
                }],
            },
            ctx.actor,
        )
        .await
        .expect_err("unknown component must be rejected");
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn template_names_are_unique_case_insensitively() {
    let ctx = setup().await;
    let kit = seed_item(&ctx.db, "Kit", ItemCategory::AssembledKit, dec!(0)).await;
    let soap = seed_item(&ctx.db, "Soap", ItemCategory::PurchasedItem, dec!(10)).await;

    let input = |name: &str| CreateKitTemplateInput {
        name: name.to_string(),
        description: None,
        kit_item_id: kit.id,
        components: vec![ComponentInput {
            item_id: soap.id,
            quantity: 1,
        }],
    };

    ctx.services
        .kit_templates
        .create(input("Hygiene Kit"), ctx.actor)
        .await
        .expect("first template failed");

    let err = ctx
        .services
        .kit_templates
        .create(input("hygiene kit"), ctx.actor)
        .await
        .expect_err("case-insensitive duplicate must be rejected");
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn components_snapshot_item_names_at_write_time() {
    let ctx = setup().await;
    let kit = seed_item(&ctx.db, "Kit", ItemCategory::AssembledKit, dec!(0)).await;
    let soap = seed_item(&ctx.db, "Soap", ItemCategory::PurchasedItem, dec!(10)).await;

    let template = ctx
        .services
        .kit_templates
        .create(
            CreateKitTemplateInput {
                name: "Hygiene Kit".to_string(),
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

    assert_eq!(template.components.len(), 1);
    assert_eq!(template.components.0[0].item_name, "Soap");
    assert_eq!(template.components.0[0].quantity, 2);
}

#[tokio::test]
async fn update_revalidates_touched_invariants() {
    let ctx = setup().await;
    let kit = seed_item(&ctx.db, "Kit A", ItemCategory::AssembledKit, dec!(0)).await;
    let other_kit = seed_item(&ctx.db, "Kit B", ItemCategory::AssembledKit, dec!(0)).await;
    let soap = seed_item(&ctx.db, "Soap", ItemCategory::PurchasedItem, dec!(10)).await;

    let make = |name: &str| CreateKitTemplateInput {
        name: name.to_string(),
        description: None,
        kit_item_id: kit.id,
        components: vec![ComponentInput {
            item_id: soap.id,
            quantity: 1,
        }],
    };

    let first = ctx
        .services
        .kit_templates
        .create(make("First"), ctx.actor)
        .await
        .unwrap();
    let second = ctx
        .services
        .kit_templates
        .create(make("Second"), ctx.actor)
        .await
        .unwrap();

    // renaming onto an existing name is rejected
    let err = ctx
        .services
        .kit_templates
        .update(
            second.id,
            UpdateKitTemplateInput {
                name: Some("FIRST".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect_err("duplicate rename must fail");
    assert_matches!(err, ServiceError::Conflict(_));

    // swapping in a kit-category component is rejected
    let err = ctx
        .services
        .kit_templates
        .update(
            first.id,
            UpdateKitTemplateInput {
                components: Some(vec![ComponentInput {
                    item_id: other_kit.id,
                    quantity: 1,
                }]),
                ..Default::default()
            },
        )
        .await
        .expect_err("kit component must fail");
    assert_matches!(err, ServiceError::ValidationError(_));

    // a clean component replacement re-snapshots names
    let updated = ctx
        .services
        .kit_templates
        .update(
            first.id,
            UpdateKitTemplateInput {
                components: Some(vec![ComponentInput {
                    item_id: soap.id,
                    quantity: 4,
                }]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.components.0[0].quantity, 4);
}

#[tokio::test]
async fn deactivated_templates_are_hidden_but_kept() {
    let ctx = setup().await;
    let kit = seed_item(&ctx.db, "Kit", ItemCategory::AssembledKit, dec!(0)).await;
    let soap = seed_item(&ctx.db, "Soap", ItemCategory::PurchasedItem, dec!(10)).await;

    let template = ctx
        .services
        .kit_templates
        .create(
            CreateKitTemplateInput {
                name: "Hygiene Kit".to_string(),
                description: None,
                kit_item_id: kit.id,
                components: vec![ComponentInput {
                    item_id: soap.id,
                    quantity: 1,
                }],
            },
            ctx.actor,
        )
        .await
        .unwrap();

    ctx.services
        .kit_templates
        .deactivate(template.id)
        .await
        .unwrap();

    let active_only = ctx.services.kit_templates.list(false).await.unwrap();
    assert!(active_only.is_empty());

    let with_inactive = ctx.services.kit_templates.list(true).await.unwrap();
    assert_eq!(with_inactive.len(), 1);
    assert!(!with_inactive[0].is_active);

    // still directly readable for history
    let fetched = ctx.services.kit_templates.get(template.id).await.unwrap();
    assert!(!fetched.is_active);
}

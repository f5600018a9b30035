//! Shared test harness: application services backed by an in-memory SQLite
//! database with the embedded migrations applied.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use reliefstock_api::{
    db::{establish_connection_with_config, DbConfig, DbPool},
    entities::{
        item::{self, ItemCategory},
        user::{self, UserRole},
    },
    events,
    migrator::Migrator,
    services::AppServices,
};

pub struct TestContext {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub actor: Uuid,
}

/// Fresh database, migrated schema, one seeded user, events drained into
/// the void.
pub async fn setup() -> TestContext {
    // One connection only: every pooled connection to sqlite::memory: would
    // otherwise get its own private database.
    let config = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };
    let db = Arc::new(
        establish_connection_with_config(&config)
            .await
            .expect("failed to open in-memory database"),
    );
    Migrator::up(db.as_ref(), None)
        .await
        .expect("failed to run migrations");

    let (event_sender, mut event_rx) = events::channel(64);
    tokio::spawn(async move { while event_rx.recv().await.is_some() {} });

    let services = AppServices::new(db.clone(), Arc::new(event_sender));
    let actor = seed_user(&db).await;

    TestContext {
        db,
        services,
        actor,
    }
}

async fn seed_user(db: &DbPool) -> Uuid {
    let now = Utc::now();
    let id = Uuid::new_v4();
    user::ActiveModel {
        id: Set(id),
        username: Set("warehouse".to_string()),
        email: Set("warehouse@example.org".to_string()),
        password_hash: Set("not-a-real-hash".to_string()),
        full_name: Set(Some("Warehouse Manager".to_string())),
        role: Set(UserRole::WarehouseManager),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("failed to seed user");
    id
}

/// Inserts an item directly, bypassing the service layer, so tests control
/// the starting stock without extra ledger entries.
pub async fn seed_item(
    db: &DbPool,
    name: &str,
    category: ItemCategory,
    stock: Decimal,
) -> item::Model {
    let now = Utc::now();
    item::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        description: Set(None),
        category: Set(category),
        unit_of_measure: Set("units".to_string()),
        current_stock_level: Set(stock),
        minimum_stock_level: Set(None),
        sku: Set(None),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("failed to seed item")
}

pub mod assembly;
pub mod distributions;
pub mod items;
pub mod kit_templates;
pub mod production;
pub mod purchasing;
pub mod recipients;
pub mod reports;
pub mod stock_movements;

use crate::{db::DbPool, events::EventSender};
use std::sync::Arc;

/// Business-logic layer used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub items: Arc<items::ItemService>,
    pub kit_templates: Arc<kit_templates::KitTemplateService>,
    pub assembly: Arc<assembly::AssemblyService>,
    pub stock_movements: Arc<stock_movements::StockMovementService>,
    pub production: Arc<production::ProductionService>,
    pub purchasing: Arc<purchasing::PurchasingService>,
    pub distributions: Arc<distributions::DistributionService>,
    pub recipients: Arc<recipients::RecipientService>,
    pub reports: Arc<reports::ReportService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            items: Arc::new(items::ItemService::new(db.clone(), event_sender.clone())),
            kit_templates: Arc::new(kit_templates::KitTemplateService::new(
                db.clone(),
                event_sender.clone(),
            )),
            assembly: Arc::new(assembly::AssemblyService::new(
                db.clone(),
                event_sender.clone(),
            )),
            stock_movements: Arc::new(stock_movements::StockMovementService::new(db.clone())),
            production: Arc::new(production::ProductionService::new(
                db.clone(),
                event_sender.clone(),
            )),
            purchasing: Arc::new(purchasing::PurchasingService::new(
                db.clone(),
                event_sender.clone(),
            )),
            distributions: Arc::new(distributions::DistributionService::new(
                db.clone(),
                event_sender.clone(),
            )),
            recipients: Arc::new(recipients::RecipientService::new(db.clone(), event_sender)),
            reports: Arc::new(reports::ReportService::new(db)),
        }
    }
}

//! OpenAPI document served under `/docs`.

use utoipa::OpenApi;

use crate::{
    auth::{RegisterUserInput, TokenPair},
    entities::{
        assembly::{ComponentUsed, ComponentsUsed},
        distribution::{DistributionLine, DistributionLines, DistributionType},
        item::ItemCategory,
        kit_template::{KitComponent, KitComponents},
        purchase::{PurchaseLine, PurchaseLines},
        stock_movement::{MovementType, ReferenceType},
        user::UserRole,
    },
    errors::ErrorResponse,
    handlers::{
        auth::{LoginRequest, RefreshRequest, UserResponse},
        items::{AdjustStockRequest, CreateItemRequest, UpdateItemRequest},
        kits::{
            AssembleKitRequest, AssemblyResponse, CreateKitTemplateRequest, KitComponentRequest,
            KitTemplateResponse, UpdateKitTemplateRequest,
        },
        quick_entry::{
            DistributionItemEntry, PurchaseItemEntry, QuickDistributionEntry, QuickProductionEntry,
            QuickPurchaseEntry,
        },
        recipients::{CreateRecipientRequest, UpdateRecipientRequest},
    },
    services::assembly::{AssemblyPreview, ComponentAvailability},
    services::reports::{
        ActivitySummary, AssemblySummary, ComprehensiveReport, DashboardStats,
        DistributionSummary, ProductionSummary, PurchaseSummary, ReconciliationReport,
        ReconciliationRow, RecentActivity, ReportLine, UserActivity,
    },
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "reliefstock-api",
        description = "Inventory and kit-assembly tracking for humanitarian aid distribution",
        license(name = "MIT")
    ),
    components(schemas(
        ErrorResponse,
        LoginRequest,
        RefreshRequest,
        RegisterUserInput,
        TokenPair,
        UserResponse,
        UserRole,
        ItemCategory,
        CreateItemRequest,
        UpdateItemRequest,
        AdjustStockRequest,
        MovementType,
        ReferenceType,
        KitComponent,
        KitComponents,
        KitComponentRequest,
        CreateKitTemplateRequest,
        UpdateKitTemplateRequest,
        KitTemplateResponse,
        AssembleKitRequest,
        AssemblyResponse,
        AssemblyPreview,
        ComponentAvailability,
        ComponentUsed,
        ComponentsUsed,
        QuickProductionEntry,
        QuickPurchaseEntry,
        PurchaseItemEntry,
        PurchaseLine,
        PurchaseLines,
        QuickDistributionEntry,
        DistributionItemEntry,
        DistributionLine,
        DistributionLines,
        DistributionType,
        CreateRecipientRequest,
        UpdateRecipientRequest,
        ComprehensiveReport,
        ActivitySummary,
        UserActivity,
        ProductionSummary,
        PurchaseSummary,
        DistributionSummary,
        AssemblySummary,
        ReportLine,
        RecentActivity,
        DashboardStats,
        ReconciliationReport,
        ReconciliationRow,
    )),
    tags(
        (name = "auth", description = "Authentication"),
        (name = "items", description = "Inventory items"),
        (name = "kits", description = "Kit templates and assembly"),
        (name = "quick", description = "Quick entry"),
        (name = "recipients", description = "Recipient directory"),
        (name = "reports", description = "Reports")
    )
)]
pub struct ApiDoc;

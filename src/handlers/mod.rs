pub mod auth;
pub mod common;
pub mod items;
pub mod kits;
pub mod quick_entry;
pub mod recipients;
pub mod reports;

use axum::Router;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Assembles the full API router, nested under `/api` by the caller.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::auth_routes())
        .nest("/items", items::item_routes())
        .nest("/kits", kits::kit_routes())
        .nest("/quick", quick_entry::quick_entry_routes())
        .nest("/recipients", recipients::recipient_routes())
        .nest("/reports", reports::report_routes())
}

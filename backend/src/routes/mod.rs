//! Route definitions for the back-office API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/inventory", inventory_routes())
        .nest("/dashboard", dashboard_routes())
        .nest("/reports", report_routes())
}

/// Stock levels and adjustments
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/stock-levels", get(handlers::list_stock_levels))
        .route("/stock-levels/adjust", post(handlers::adjust_stock))
        .route(
            "/stock-levels/:item_id/adjustments",
            get(handlers::list_adjustments),
        )
}

fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/low-stock-alerts", get(handlers::low_stock_alerts))
}

fn report_routes() -> Router<AppState> {
    Router::new().route("/sales", get(handlers::get_sales_report))
}

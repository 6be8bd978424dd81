//! HTTP handlers for stock levels, adjustments and low stock alerts

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::{InventoryItem, LowStockAlert, StockAdjustmentRecord, StockLevel, StockLevelFilter};

use crate::error::AppResult;
use crate::middleware::Actor;
use crate::services::inventory::AdjustStockInput;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LowStockQuery {
    pub limit: Option<usize>,
}

/// List stock levels, optionally for one branch and/or product
pub async fn list_stock_levels(
    State(state): State<AppState>,
    Query(filter): Query<StockLevelFilter>,
) -> AppResult<Json<Vec<StockLevel>>> {
    let levels = state.ledger.list_levels(filter).await?;
    Ok(Json(levels))
}

/// Apply an IN/OUT/SET adjustment and return the updated item
pub async fn adjust_stock(
    State(state): State<AppState>,
    Actor(actor_id): Actor,
    payload: Result<Json<AdjustStockInput>, JsonRejection>,
) -> AppResult<Json<InventoryItem>> {
    let Json(input) = payload?;
    let item = state.ledger.adjust_from_input(actor_id, input).await?;
    Ok(Json(item))
}

/// Audit trail for one item, newest first
pub async fn list_adjustments(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockAdjustmentRecord>>> {
    let records = state.ledger.adjustment_history(item_id).await?;
    Ok(Json(records))
}

/// Dashboard widget: items below their minimum stock level
pub async fn low_stock_alerts(
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<Vec<LowStockAlert>>> {
    let limit = query
        .limit
        .unwrap_or(state.config.inventory.low_stock_limit);
    let alerts = state.ledger.low_stock_alerts(limit).await?;
    Ok(Json(alerts))
}

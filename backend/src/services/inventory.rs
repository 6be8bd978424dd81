//! Stock ledger: the only code path that changes inventory quantities

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use shared::{
    AdjustmentKind, AdjustmentReason, InventoryItem, LowStockAlert, StockAdjustmentRecord,
    StockLevel, StockLevelFilter,
};

use crate::error::{AppError, AppResult};
use crate::store::{AdjustmentRequest, PgStockStore, StockStore};

/// Direction of a manual adjustment as entered on the stock form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdjustmentMode {
    /// Stock received; quantity is added
    In,
    /// Stock removed; quantity is subtracted
    Out,
    /// Quantity becomes exactly the given value
    Set,
}

/// Body of `POST /inventory/stock-levels/adjust`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AdjustStockInput {
    pub inventory_item_id: Uuid,
    pub adjustment_type: AdjustmentMode,
    pub quantity: Decimal,
    /// Parsed into [`AdjustmentReason`]; kept as text so a bad code is a
    /// validation error rather than a body rejection
    pub reason: String,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl AdjustStockInput {
    /// Resolve the form input into the ledger's terms
    pub fn to_kind(&self) -> AppResult<AdjustmentKind> {
        match self.adjustment_type {
            AdjustmentMode::In | AdjustmentMode::Out if self.quantity <= Decimal::ZERO => Err(
                AppError::validation("quantity", "Quantity must be positive for IN and OUT"),
            ),
            AdjustmentMode::In => Ok(AdjustmentKind::Delta(self.quantity)),
            AdjustmentMode::Out => Ok(AdjustmentKind::Delta(-self.quantity)),
            AdjustmentMode::Set => Ok(AdjustmentKind::SetTo(self.quantity)),
        }
    }
}

pub fn parse_reason(raw: &str) -> AppResult<AdjustmentReason> {
    raw.parse()
        .map_err(|e: shared::UnknownReason| AppError::validation("reason", e.to_string()))
}

/// Stock ledger over a pluggable store
#[derive(Clone)]
pub struct StockLedger {
    store: Arc<dyn StockStore>,
}

impl StockLedger {
    pub fn new(store: Arc<dyn StockStore>) -> Self {
        Self { store }
    }

    /// Ledger backed by Postgres
    pub fn postgres(db: PgPool) -> Self {
        Self::new(Arc::new(PgStockStore::new(db)))
    }

    /// Apply a signed change to one item and record it.
    ///
    /// Returns the item as written. A result that would be negative is refused
    /// with `InvalidState` and nothing changes.
    pub async fn adjust(
        &self,
        item_id: Uuid,
        quantity_delta: Decimal,
        reason: AdjustmentReason,
        actor_id: Uuid,
        notes: Option<String>,
    ) -> AppResult<InventoryItem> {
        self.apply(AdjustmentRequest {
            item_id,
            kind: AdjustmentKind::Delta(quantity_delta),
            reason,
            actor_id,
            notes,
        })
        .await
    }

    /// Set an absolute quantity. The delta is worked out against the quantity
    /// read inside the store's atomic unit, not one read earlier.
    pub async fn set_quantity(
        &self,
        item_id: Uuid,
        target: Decimal,
        reason: AdjustmentReason,
        actor_id: Uuid,
        notes: Option<String>,
    ) -> AppResult<InventoryItem> {
        self.apply(AdjustmentRequest {
            item_id,
            kind: AdjustmentKind::SetTo(target),
            reason,
            actor_id,
            notes,
        })
        .await
    }

    /// Entry point for the HTTP form
    pub async fn adjust_from_input(
        &self,
        actor_id: Uuid,
        input: AdjustStockInput,
    ) -> AppResult<InventoryItem> {
        input.validate().map_err(|errors| {
            let field = errors
                .field_errors()
                .keys()
                .next()
                .map(|f| f.to_string())
                .unwrap_or_else(|| "body".to_string());
            AppError::validation(field, errors.to_string())
        })?;

        let reason = parse_reason(&input.reason)?;
        let kind = input.to_kind()?;

        self.apply(AdjustmentRequest {
            item_id: input.inventory_item_id,
            kind,
            reason,
            actor_id,
            notes: input.notes,
        })
        .await
    }

    async fn apply(&self, request: AdjustmentRequest) -> AppResult<InventoryItem> {
        let item_id = request.item_id;
        let reason = request.reason;
        let actor_id = request.actor_id;

        // Stateless checks before touching the store
        if let Err(violation) = request.kind.validate() {
            tracing::warn!(%item_id, %reason, %actor_id, "Stock adjustment rejected: {}", violation);
            return Err(violation.into());
        }

        match self.store.apply_adjustment(request).await {
            Ok(applied) => {
                tracing::info!(
                    %item_id,
                    delta = %applied.record.quantity_change,
                    new_quantity = %applied.record.new_quantity,
                    %reason,
                    %actor_id,
                    "Stock adjusted"
                );
                Ok(applied.item)
            }
            Err(err) => {
                tracing::warn!(%item_id, %reason, %actor_id, "Stock adjustment rejected: {}", err);
                Err(err)
            }
        }
    }

    pub async fn list_levels(&self, filter: StockLevelFilter) -> AppResult<Vec<StockLevel>> {
        self.store.list_levels(filter).await
    }

    pub async fn adjustment_history(&self, item_id: Uuid) -> AppResult<Vec<StockAdjustmentRecord>> {
        self.store.adjustment_history(item_id).await
    }

    /// Items below their minimum, most depleted first, at most `limit`
    pub async fn low_stock_alerts(&self, limit: usize) -> AppResult<Vec<LowStockAlert>> {
        let levels = self.store.list_levels(StockLevelFilter::default()).await?;

        let mut alerts: Vec<LowStockAlert> =
            levels.iter().filter_map(LowStockAlert::from_level).collect();
        alerts.sort_by(|a, b| {
            (a.current_quantity - a.min_stock_level)
                .cmp(&(b.current_quantity - b.min_stock_level))
                .then_with(|| a.product_name.cmp(&b.product_name))
        });
        alerts.truncate(limit);
        Ok(alerts)
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

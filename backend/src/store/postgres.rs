//! Postgres-backed stock store
//!
//! Adjustments run in a transaction that takes a row lock on the inventory
//! item (`SELECT ... FOR UPDATE`) before reading its quantity, so two writers
//! on the same item are serialized by the database. Serialization failures
//! and deadlocks surface as `AppError::Conflict` through the `sqlx::Error`
//! conversion; nothing here retries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use shared::{
    plan_adjustment, AdjustmentReason, InventoryItem, StockAdjustmentRecord, StockLevel,
    StockLevelFilter,
};

use super::{AdjustmentRequest, AppliedAdjustment, StockStore};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct PgStockStore {
    db: PgPool,
}

impl PgStockStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: Uuid,
    product_id: Uuid,
    branch_id: Uuid,
    quantity: Decimal,
    min_stock_level: Option<Decimal>,
    max_stock_level: Option<Decimal>,
    updated_at: DateTime<Utc>,
}

impl From<ItemRow> for InventoryItem {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            branch_id: row.branch_id,
            quantity: row.quantity,
            min_stock_level: row.min_stock_level,
            max_stock_level: row.max_stock_level,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct LevelRow {
    id: Uuid,
    product_id: Uuid,
    branch_id: Uuid,
    quantity: Decimal,
    min_stock_level: Option<Decimal>,
    max_stock_level: Option<Decimal>,
    updated_at: DateTime<Utc>,
    product_name: String,
    sku: Option<String>,
    branch_name: String,
}

impl From<LevelRow> for StockLevel {
    fn from(row: LevelRow) -> Self {
        Self {
            item: InventoryItem {
                id: row.id,
                product_id: row.product_id,
                branch_id: row.branch_id,
                quantity: row.quantity,
                min_stock_level: row.min_stock_level,
                max_stock_level: row.max_stock_level,
                updated_at: row.updated_at,
            },
            product_name: row.product_name,
            sku: row.sku,
            branch_name: row.branch_name,
        }
    }
}

#[derive(Debug, FromRow)]
struct AdjustmentRow {
    id: Uuid,
    inventory_item_id: Uuid,
    quantity_change: Decimal,
    new_quantity: Decimal,
    reason: String,
    adjusted_by_user_id: Uuid,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdjustmentRow> for StockAdjustmentRecord {
    type Error = AppError;

    fn try_from(row: AdjustmentRow) -> Result<Self, Self::Error> {
        let reason: AdjustmentReason = row
            .reason
            .parse()
            .map_err(|e| AppError::Internal(format!("corrupt stock_adjustments row {}: {}", row.id, e)))?;
        Ok(Self {
            id: row.id,
            inventory_item_id: row.inventory_item_id,
            quantity_change: row.quantity_change,
            new_quantity: row.new_quantity,
            reason,
            adjusted_by_user_id: row.adjusted_by_user_id,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl StockStore for PgStockStore {
    #[instrument(
        skip(self, request),
        fields(item_id = %request.item_id, reason = %request.reason),
        err
    )]
    async fn apply_adjustment(&self, request: AdjustmentRequest) -> AppResult<AppliedAdjustment> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, Decimal>(
            "SELECT quantity FROM inventory_items WHERE id = $1 FOR UPDATE",
        )
        .bind(request.item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        // Dropping `tx` on the error path rolls back and releases the lock
        let plan = plan_adjustment(current, request.kind)?;

        let item = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE inventory_items
            SET quantity = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, product_id, branch_id, quantity, min_stock_level,
                      max_stock_level, updated_at
            "#,
        )
        .bind(request.item_id)
        .bind(plan.new_quantity)
        .fetch_one(&mut *tx)
        .await?;

        let record = sqlx::query_as::<_, AdjustmentRow>(
            r#"
            INSERT INTO stock_adjustments (
                id, inventory_item_id, quantity_change, new_quantity, reason,
                adjusted_by_user_id, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, inventory_item_id, quantity_change, new_quantity, reason,
                      adjusted_by_user_id, notes, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.item_id)
        .bind(plan.quantity_change)
        .bind(plan.new_quantity)
        .bind(request.reason.as_str())
        .bind(request.actor_id)
        .bind(&request.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AppliedAdjustment {
            item: item.into(),
            record: record.try_into()?,
        })
    }

    async fn list_levels(&self, filter: StockLevelFilter) -> AppResult<Vec<StockLevel>> {
        let rows = sqlx::query_as::<_, LevelRow>(
            r#"
            SELECT i.id, i.product_id, i.branch_id, i.quantity, i.min_stock_level,
                   i.max_stock_level, i.updated_at,
                   p.name AS product_name, p.sku, b.name AS branch_name
            FROM inventory_items i
            JOIN products p ON p.id = i.product_id
            JOIN branches b ON b.id = i.branch_id
            WHERE ($1::uuid IS NULL OR i.branch_id = $1)
              AND ($2::uuid IS NULL OR i.product_id = $2)
            ORDER BY p.name ASC, b.name ASC
            "#,
        )
        .bind(filter.branch_id)
        .bind(filter.product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn adjustment_history(&self, item_id: Uuid) -> AppResult<Vec<StockAdjustmentRecord>> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM inventory_items WHERE id = $1)",
        )
        .bind(item_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Inventory item".to_string()));
        }

        let rows = sqlx::query_as::<_, AdjustmentRow>(
            r#"
            SELECT id, inventory_item_id, quantity_change, new_quantity, reason,
                   adjusted_by_user_id, notes, created_at
            FROM stock_adjustments
            WHERE inventory_item_id = $1
            ORDER BY created_at DESC, seq DESC
            "#,
        )
        .bind(item_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(StockAdjustmentRecord::try_from).collect()
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}

//! In-memory stock store for tests and local runs without a database

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use shared::{plan_adjustment, StockAdjustmentRecord, StockLevel, StockLevelFilter};

use super::{AdjustmentRequest, AppliedAdjustment, StockStore};
use crate::error::{AppError, AppResult};

#[derive(Debug, Default)]
struct Ledger {
    levels: HashMap<Uuid, StockLevel>,
    /// Append-only, in write order
    adjustments: Vec<StockAdjustmentRecord>,
}

/// Mutex-guarded store. The lock is held across the whole read-plan-write
/// cycle, which serializes adjustments store-wide.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    ledger: Mutex<Ledger>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeded with the given levels
    pub fn with_levels(levels: impl IntoIterator<Item = StockLevel>) -> Self {
        let store = Self::new();
        {
            let mut ledger = store.ledger.lock().unwrap_or_else(|e| e.into_inner());
            for level in levels {
                ledger.levels.insert(level.item.id, level);
            }
        }
        store
    }

    /// Add or replace one level
    pub fn insert_level(&self, level: StockLevel) -> AppResult<()> {
        self.lock()?.levels.insert(level.item.id, level);
        Ok(())
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Ledger>> {
        self.ledger
            .lock()
            .map_err(|_| AppError::Internal("stock ledger lock poisoned".to_string()))
    }
}

#[async_trait]
impl StockStore for InMemoryStockStore {
    async fn apply_adjustment(&self, request: AdjustmentRequest) -> AppResult<AppliedAdjustment> {
        let mut ledger = self.lock()?;

        let level = ledger
            .levels
            .get_mut(&request.item_id)
            .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        let plan = plan_adjustment(level.item.quantity, request.kind)?;
        let now = Utc::now();

        level.item.quantity = plan.new_quantity;
        level.item.updated_at = now;
        let item = level.item.clone();

        let record = StockAdjustmentRecord {
            id: Uuid::new_v4(),
            inventory_item_id: request.item_id,
            quantity_change: plan.quantity_change,
            new_quantity: plan.new_quantity,
            reason: request.reason,
            adjusted_by_user_id: request.actor_id,
            notes: request.notes,
            created_at: now,
        };
        ledger.adjustments.push(record.clone());

        Ok(AppliedAdjustment { item, record })
    }

    async fn list_levels(&self, filter: StockLevelFilter) -> AppResult<Vec<StockLevel>> {
        let ledger = self.lock()?;
        let mut levels: Vec<StockLevel> = ledger
            .levels
            .values()
            .filter(|level| filter.matches(&level.item))
            .cloned()
            .collect();
        levels.sort_by(|a, b| {
            a.product_name
                .cmp(&b.product_name)
                .then_with(|| a.branch_name.cmp(&b.branch_name))
        });
        Ok(levels)
    }

    async fn adjustment_history(&self, item_id: Uuid) -> AppResult<Vec<StockAdjustmentRecord>> {
        let ledger = self.lock()?;
        if !ledger.levels.contains_key(&item_id) {
            return Err(AppError::NotFound("Inventory item".to_string()));
        }
        // Write order is chronological, so reversing gives newest first
        Ok(ledger
            .adjustments
            .iter()
            .rev()
            .filter(|r| r.inventory_item_id == item_id)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> AppResult<()> {
        self.lock().map(|_| ())
    }
}

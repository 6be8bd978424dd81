//! Persistence seam for the stock ledger
//!
//! Both implementations run the whole read-plan-write cycle of an adjustment
//! as one atomic unit and use [`shared::plan_adjustment`] for the rule itself.

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use shared::{
    AdjustmentKind, AdjustmentReason, InventoryItem, StockAdjustmentRecord, StockLevel,
    StockLevelFilter,
};

use crate::error::AppResult;

pub use memory::InMemoryStockStore;
pub use postgres::PgStockStore;

/// Everything needed to write one adjustment
#[derive(Debug, Clone)]
pub struct AdjustmentRequest {
    pub item_id: Uuid,
    pub kind: AdjustmentKind,
    pub reason: AdjustmentReason,
    pub actor_id: Uuid,
    pub notes: Option<String>,
}

/// Item state after an accepted adjustment, with the record written for it
#[derive(Debug, Clone)]
pub struct AppliedAdjustment {
    pub item: InventoryItem,
    pub record: StockAdjustmentRecord,
}

#[async_trait]
pub trait StockStore: Send + Sync {
    /// Lock the item, plan against its current quantity, then write the item
    /// and append the record together. Nothing is written on error.
    async fn apply_adjustment(&self, request: AdjustmentRequest) -> AppResult<AppliedAdjustment>;

    /// Levels matching `filter`, ordered by product name
    async fn list_levels(&self, filter: StockLevelFilter) -> AppResult<Vec<StockLevel>>;

    /// Records for one item, newest first. `NotFound` for an unknown item.
    async fn adjustment_history(&self, item_id: Uuid) -> AppResult<Vec<StockAdjustmentRecord>>;

    /// Connectivity check
    async fn ping(&self) -> AppResult<()>;
}

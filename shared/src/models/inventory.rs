//! Inventory models and the stock adjustment rule

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// On-hand quantity of one product at one branch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub branch_id: Uuid,
    /// Never negative
    pub quantity: Decimal,
    pub min_stock_level: Option<Decimal>,
    pub max_stock_level: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

/// Inventory item joined with the product and branch it belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockLevel {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub product_name: String,
    pub sku: Option<String>,
    pub branch_name: String,
}

impl StockLevel {
    /// True when a minimum is configured and the quantity has dropped below it
    pub fn is_below_minimum(&self) -> bool {
        self.item
            .min_stock_level
            .is_some_and(|min| self.item.quantity < min)
    }
}

/// Optional branch/product narrowing for stock level listings
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockLevelFilter {
    pub branch_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
}

impl StockLevelFilter {
    pub fn matches(&self, item: &InventoryItem) -> bool {
        self.branch_id.map_or(true, |id| item.branch_id == id)
            && self.product_id.map_or(true, |id| item.product_id == id)
    }
}

/// Dashboard entry for an item below its minimum stock level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LowStockAlert {
    pub item_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub branch_name: String,
    pub current_quantity: Decimal,
    pub min_stock_level: Decimal,
}

impl LowStockAlert {
    pub fn from_level(level: &StockLevel) -> Option<Self> {
        let min_stock_level = level.item.min_stock_level?;
        if level.item.quantity >= min_stock_level {
            return None;
        }
        Some(Self {
            item_id: level.item.id,
            product_id: level.item.product_id,
            product_name: level.product_name.clone(),
            branch_name: level.branch_name.clone(),
            current_quantity: level.item.quantity,
            min_stock_level,
        })
    }

    /// How far below the minimum the item sits (always positive)
    pub fn shortfall(&self) -> Decimal {
        self.min_stock_level - self.current_quantity
    }
}

/// Immutable audit entry for one accepted stock adjustment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockAdjustmentRecord {
    pub id: Uuid,
    pub inventory_item_id: Uuid,
    pub quantity_change: Decimal,
    pub new_quantity: Decimal,
    pub reason: AdjustmentReason,
    pub adjusted_by_user_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Why stock moved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentReason {
    Received,
    Sale,
    Waste,
    Damaged,
    Returned,
    Correction,
}

impl AdjustmentReason {
    pub const ALL: [AdjustmentReason; 6] = [
        AdjustmentReason::Received,
        AdjustmentReason::Sale,
        AdjustmentReason::Waste,
        AdjustmentReason::Damaged,
        AdjustmentReason::Returned,
        AdjustmentReason::Correction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentReason::Received => "RECEIVED",
            AdjustmentReason::Sale => "SALE",
            AdjustmentReason::Waste => "WASTE",
            AdjustmentReason::Damaged => "DAMAGED",
            AdjustmentReason::Returned => "RETURNED",
            AdjustmentReason::Correction => "CORRECTION",
        }
    }
}

impl std::fmt::Display for AdjustmentReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reason code outside the closed set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown adjustment reason '{0}'")]
pub struct UnknownReason(pub String);

impl FromStr for AdjustmentReason {
    type Err = UnknownReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdjustmentReason::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownReason(s.to_string()))
    }
}

/// How the caller wants the quantity to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "quantity", rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Signed change; positive is stock in
    Delta(Decimal),
    /// Absolute target, resolved against the quantity read under lock
    SetTo(Decimal),
}

/// Decimal places a stored quantity keeps
pub const QUANTITY_SCALE: u32 = 3;

/// Largest magnitude a stored quantity or change can hold (`NUMERIC(14, 3)`)
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 3);

impl AdjustmentKind {
    /// Checks that need no stored state. Run before opening a transaction.
    pub fn validate(&self) -> Result<(), LedgerViolation> {
        let amount = match *self {
            AdjustmentKind::Delta(delta) if delta.is_zero() => {
                return Err(LedgerViolation::ZeroDelta);
            }
            AdjustmentKind::SetTo(target) if target < Decimal::ZERO => {
                return Err(LedgerViolation::NegativeTarget(target));
            }
            AdjustmentKind::Delta(amount) | AdjustmentKind::SetTo(amount) => amount,
        };
        check_quantity(amount)
    }
}

/// A value storable as a quantity: at most three decimal places and within
/// [`MAX_QUANTITY`] either side of zero.
pub fn check_quantity(value: Decimal) -> Result<(), LedgerViolation> {
    if value.normalize().scale() > QUANTITY_SCALE {
        return Err(LedgerViolation::TooPrecise(value));
    }
    if value.abs() > MAX_QUANTITY {
        return Err(LedgerViolation::OutOfRange(value));
    }
    Ok(())
}

/// Outcome of applying an [`AdjustmentKind`] to a current quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentPlan {
    pub quantity_change: Decimal,
    pub new_quantity: Decimal,
}

/// Reasons an adjustment is refused before anything is written
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerViolation {
    #[error("quantity change must be non-zero")]
    ZeroDelta,

    #[error("target quantity {0} cannot be negative")]
    NegativeTarget(Decimal),

    #[error("quantity {0} has more than three decimal places")]
    TooPrecise(Decimal),

    #[error("quantity {0} is out of range")]
    OutOfRange(Decimal),

    #[error("stock would go negative: current {current}, change {change}")]
    WouldGoNegative { current: Decimal, change: Decimal },
}

/// Resolve an adjustment against the current quantity.
///
/// Must be called with `current` read inside the same atomic unit that will
/// write the result.
pub fn plan_adjustment(
    current: Decimal,
    kind: AdjustmentKind,
) -> Result<AdjustmentPlan, LedgerViolation> {
    kind.validate()?;

    let quantity_change = match kind {
        AdjustmentKind::Delta(delta) => delta,
        AdjustmentKind::SetTo(target) => target
            .checked_sub(current)
            .ok_or(LedgerViolation::OutOfRange(target))?,
    };
    if quantity_change.is_zero() {
        return Err(LedgerViolation::ZeroDelta);
    }

    let new_quantity = current
        .checked_add(quantity_change)
        .ok_or(LedgerViolation::OutOfRange(quantity_change))?;
    if new_quantity < Decimal::ZERO {
        return Err(LedgerViolation::WouldGoNegative {
            current,
            change: quantity_change,
        });
    }
    if new_quantity > MAX_QUANTITY {
        return Err(LedgerViolation::OutOfRange(new_quantity));
    }

    Ok(AdjustmentPlan {
        quantity_change,
        new_quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_plan_stock_in() {
        let plan = plan_adjustment(dec(3), AdjustmentKind::Delta(dec(10))).unwrap();
        assert_eq!(plan.quantity_change, dec(10));
        assert_eq!(plan.new_quantity, dec(13));
    }

    #[test]
    fn test_plan_rejects_negative_result() {
        let err = plan_adjustment(dec(3), AdjustmentKind::Delta(dec(-5))).unwrap_err();
        assert_eq!(
            err,
            LedgerViolation::WouldGoNegative {
                current: dec(3),
                change: dec(-5)
            }
        );
    }

    #[test]
    fn test_plan_allows_exact_depletion() {
        let plan = plan_adjustment(dec(3), AdjustmentKind::Delta(dec(-3))).unwrap();
        assert_eq!(plan.new_quantity, Decimal::ZERO);
    }

    #[test]
    fn test_plan_rejects_zero_delta() {
        assert_eq!(
            plan_adjustment(dec(3), AdjustmentKind::Delta(Decimal::ZERO)),
            Err(LedgerViolation::ZeroDelta)
        );
    }

    #[test]
    fn test_set_to_resolves_delta_from_current() {
        let plan = plan_adjustment(dec(8), AdjustmentKind::SetTo(dec(5))).unwrap();
        assert_eq!(plan.quantity_change, dec(-3));
        assert_eq!(plan.new_quantity, dec(5));

        let plan = plan_adjustment(dec(0), AdjustmentKind::SetTo(dec(12))).unwrap();
        assert_eq!(plan.quantity_change, dec(12));
    }

    #[test]
    fn test_set_to_same_quantity_is_zero_delta() {
        assert_eq!(
            plan_adjustment(dec(7), AdjustmentKind::SetTo(dec(7))),
            Err(LedgerViolation::ZeroDelta)
        );
    }

    #[test]
    fn test_set_to_negative_target() {
        assert_eq!(
            AdjustmentKind::SetTo(dec(-1)).validate(),
            Err(LedgerViolation::NegativeTarget(dec(-1)))
        );
        assert!(AdjustmentKind::SetTo(Decimal::ZERO).validate().is_ok());
    }

    #[test]
    fn test_max_quantity_matches_column() {
        assert_eq!(MAX_QUANTITY.to_string(), "99999999999.999");
    }

    #[test]
    fn test_rejects_more_than_three_places() {
        let tiny = Decimal::new(4, 4);
        assert_eq!(
            plan_adjustment(dec(3), AdjustmentKind::Delta(-tiny)),
            Err(LedgerViolation::TooPrecise(-tiny))
        );
        // Trailing zeros do not count
        let plan = plan_adjustment(dec(3), AdjustmentKind::Delta(Decimal::new(-15000, 4))).unwrap();
        assert_eq!(plan.new_quantity, Decimal::new(15, 1));
    }

    #[test]
    fn test_huge_change_is_out_of_range_not_overflow() {
        assert_eq!(
            plan_adjustment(dec(5), AdjustmentKind::Delta(Decimal::MAX)),
            Err(LedgerViolation::OutOfRange(Decimal::MAX))
        );
        assert_eq!(
            plan_adjustment(MAX_QUANTITY, AdjustmentKind::Delta(Decimal::new(1, 3))),
            Err(LedgerViolation::OutOfRange(MAX_QUANTITY + Decimal::new(1, 3)))
        );
        assert!(AdjustmentKind::SetTo(MAX_QUANTITY).validate().is_ok());
        assert!(AdjustmentKind::SetTo(dec(100_000_000_000)).validate().is_err());
    }

    #[test]
    fn test_reason_round_trips_through_str() {
        for reason in AdjustmentReason::ALL {
            assert_eq!(reason.as_str().parse::<AdjustmentReason>(), Ok(reason));
        }
        assert!("sale".parse::<AdjustmentReason>().is_err());
        assert!("EXPIRED".parse::<AdjustmentReason>().is_err());
    }

    #[test]
    fn test_reason_serde_matches_as_str() {
        let json = serde_json::to_string(&AdjustmentReason::Received).unwrap();
        assert_eq!(json, "\"RECEIVED\"");
    }

    #[test]
    fn test_low_stock_alert_only_below_minimum() {
        let mut level = StockLevel {
            item: InventoryItem {
                id: Uuid::nil(),
                product_id: Uuid::nil(),
                branch_id: Uuid::nil(),
                quantity: dec(4),
                min_stock_level: Some(dec(5)),
                max_stock_level: None,
                updated_at: Utc::now(),
            },
            product_name: "Espresso Beans".to_string(),
            sku: None,
            branch_name: "Main Street Cafe".to_string(),
        };

        let alert = LowStockAlert::from_level(&level).unwrap();
        assert_eq!(alert.shortfall(), dec(1));

        level.item.quantity = dec(5);
        assert!(LowStockAlert::from_level(&level).is_none());

        level.item.min_stock_level = None;
        level.item.quantity = Decimal::ZERO;
        assert!(LowStockAlert::from_level(&level).is_none());
        assert!(!level.is_below_minimum());
    }
}

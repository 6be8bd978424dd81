//! Cell values projected out of report rows

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Exported calendar date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One projected cell of a report row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Empty,
    Text(String),
    Integer(i64),
    Number(Decimal),
    /// Money; always rendered with two decimal places
    Currency(Decimal),
    Date(NaiveDate),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Numeric view of the cell, if it has one
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            CellValue::Integer(n) => Some(Decimal::from(*n)),
            CellValue::Number(n) | CellValue::Currency(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Text form used for export and facet matching
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Integer(n) => n.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Currency(n) => format_currency(*n),
            CellValue::Date(d) => d.format(DATE_FORMAT).to_string(),
        }
    }
}

/// Exactly two decimal places, half away from zero
pub fn format_currency(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Ascending comparison of two cells.
///
/// Numbers compare numerically, text with [`collate`], dates chronologically.
/// Cells of different kinds order by kind: empty, then numbers, then dates,
/// then text.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_number(), b.as_number()) {
        return x.cmp(&y);
    }
    match (a, b) {
        (CellValue::Text(x), CellValue::Text(y)) => collate(x, y),
        (CellValue::Date(x), CellValue::Date(y)) => x.cmp(y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(cell: &CellValue) -> u8 {
    match cell {
        CellValue::Empty => 0,
        CellValue::Integer(_) | CellValue::Number(_) | CellValue::Currency(_) => 1,
        CellValue::Date(_) => 2,
        CellValue::Text(_) => 3,
    }
}

/// Case-insensitive ordering; on a case-only tie lowercase sorts first.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

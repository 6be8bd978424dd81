//! HTTP handlers

pub mod health;
pub mod inventory;
pub mod reporting;

pub use health::health_check;
pub use inventory::{adjust_stock, list_adjustments, list_stock_levels, low_stock_alerts};
pub use reporting::get_sales_report;

//! Business logic services for the back-office

pub mod inventory;
pub mod reporting;

pub use inventory::StockLedger;
pub use reporting::ReportingService;

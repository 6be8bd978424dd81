//! Generic report table engine
//!
//! Sorting, column visibility, filtering and CSV export for any row type that
//! can project itself into [`CellValue`]s. Everything here is synchronous and
//! free of IO so the same code runs on the server and in the browser.

mod column;
mod export;
mod filter;
mod sort;
mod table;
mod value;

use std::fmt::Debug;

pub use column::{ColumnDescriptor, ColumnSet};
pub use export::{export_csv, ExportError};
pub use filter::{FacetSelection, RowFilter, ALL_SENTINEL};
pub use sort::{sort_rows, SortDirection, SortState};
pub use table::ReportTable;
pub use value::{collate, compare_cells, format_currency, CellValue, DATE_FORMAT};

/// A row that can be shown in a report table
pub trait ReportRow {
    /// Closed set of column keys for this row type
    type Column: Copy + Eq + Debug;

    fn cell(&self, column: Self::Column) -> CellValue;
}

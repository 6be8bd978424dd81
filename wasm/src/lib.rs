//! WebAssembly module for the Restaurant Back-Office dashboard
//!
//! Runs the sales report table in the browser: sorting, column visibility,
//! filtering, summary totals and CSV export all happen client-side on rows
//! fetched once from `/api/v1/reports/sales`.
//!
//! Every exported method takes and returns JSON strings. Bad input from
//! JavaScript, including unknown column keys, becomes a thrown `Error` rather
//! than a panic.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use shared::report::{ColumnDescriptor, ColumnSet, ReportTable, SortDirection};
use shared::{default_sales_columns, SalesColumn, SalesReportFilter, SalesReportRow, SalesSummary};

/// Sort state as seen from JavaScript
#[derive(Debug, Serialize, PartialEq, Eq)]
struct SortStateView {
    column: Option<SalesColumn>,
    direction: Option<SortDirection>,
}

/// Sales report grid owned by one page
#[wasm_bindgen]
pub struct SalesReportTable {
    inner: ReportTable<SalesReportRow>,
}

#[wasm_bindgen]
impl SalesReportTable {
    /// `rows_json` is an array of sales rows; `columns_json`, when given, is an
    /// ordered array of `{key, label, visible}` replacing the default columns.
    #[wasm_bindgen(constructor)]
    pub fn new(rows_json: &str, columns_json: Option<String>) -> Result<SalesReportTable, JsValue> {
        Self::try_new(rows_json, columns_json.as_deref()).map_err(js_error)
    }

    /// Cycle the sort for one column key
    pub fn request_sort(&mut self, key: &str) -> Result<(), JsValue> {
        self.try_request_sort(key).map_err(js_error)
    }

    pub fn sort_state(&self) -> Result<String, JsValue> {
        to_json(&self.sort_view()).map_err(js_error)
    }

    /// Flip a column's visibility; resolves to the new value
    pub fn toggle_column(&mut self, key: &str) -> Result<bool, JsValue> {
        self.try_toggle_column(key).map_err(js_error)
    }

    pub fn columns_json(&self) -> Result<String, JsValue> {
        to_json(self.inner.columns().descriptors()).map_err(js_error)
    }

    /// Replace the filter. Missing fields mean "no restriction".
    pub fn set_filter(&mut self, filter_json: &str) -> Result<(), JsValue> {
        self.try_set_filter(filter_json).map_err(js_error)
    }

    /// Replace the source rows, keeping sort, filter and column state
    pub fn set_rows(&mut self, rows_json: &str) -> Result<(), JsValue> {
        self.try_set_rows(rows_json).map_err(js_error)
    }

    /// Filtered rows in display order
    pub fn rows_json(&self) -> Result<String, JsValue> {
        to_json(&self.inner.view()).map_err(js_error)
    }

    pub fn summary_json(&self) -> Result<String, JsValue> {
        to_json(&self.summary()).map_err(js_error)
    }

    pub fn export_csv(&self) -> Result<String, JsValue> {
        self.inner.export_csv().map_err(|e| js_error(e.to_string()))
    }
}

impl SalesReportTable {
    fn try_new(rows_json: &str, columns_json: Option<&str>) -> Result<Self, String> {
        let rows = parse_rows(rows_json)?;
        let columns = match columns_json {
            Some(json) => parse_columns(json)?,
            None => default_sales_columns(),
        };
        Ok(Self {
            inner: ReportTable::new(rows, columns),
        })
    }

    fn try_request_sort(&mut self, key: &str) -> Result<(), String> {
        let column = self.known_column(key)?;
        self.inner.request_sort(column);
        Ok(())
    }

    fn try_toggle_column(&mut self, key: &str) -> Result<bool, String> {
        let column = self.known_column(key)?;
        Ok(self.inner.toggle_column(column))
    }

    fn try_set_filter(&mut self, filter_json: &str) -> Result<(), String> {
        let filter: SalesReportFilter =
            serde_json::from_str(filter_json).map_err(|e| format!("Invalid filter JSON: {}", e))?;
        self.inner.set_filter(filter.to_row_filter());
        Ok(())
    }

    fn try_set_rows(&mut self, rows_json: &str) -> Result<(), String> {
        self.inner.set_rows(parse_rows(rows_json)?);
        Ok(())
    }

    fn sort_view(&self) -> SortStateView {
        let active = self.inner.sort_state().active();
        SortStateView {
            column: active.map(|(column, _)| column),
            direction: active.map(|(_, direction)| direction),
        }
    }

    fn summary(&self) -> SalesSummary {
        SalesSummary::from_rows(self.inner.view())
    }

    /// A key that parses and is part of this table's column set
    fn known_column(&self, key: &str) -> Result<SalesColumn, String> {
        let column: SalesColumn = key.parse().map_err(|e: shared::UnknownValue| e.to_string())?;
        if !self.inner.columns().contains(column) {
            return Err(format!("column '{}' is not part of this table", key));
        }
        Ok(column)
    }
}

fn parse_rows(json: &str) -> Result<Vec<SalesReportRow>, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid rows JSON: {}", e))
}

fn parse_columns(json: &str) -> Result<ColumnSet<SalesColumn>, String> {
    let columns: Vec<ColumnDescriptor<SalesColumn>> =
        serde_json::from_str(json).map_err(|e| format!("Invalid columns JSON: {}", e))?;
    for (idx, column) in columns.iter().enumerate() {
        if columns[..idx].iter().any(|c| c.key == column.key) {
            return Err(format!("duplicate column '{}'", column.key.key()));
        }
    }
    Ok(ColumnSet::new(columns))
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn js_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    js_sys::Error::new(&message).into()
}

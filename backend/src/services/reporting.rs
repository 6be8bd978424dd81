//! Sales report: order lines from Postgres run through the shared report engine

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use shared::{
    default_sales_columns, ColumnDescriptor, DateRange, FacetSelection, OrderType, PaymentMethod,
    SalesColumn, SalesReportFilter, SalesReportRow, SalesReportTable, SalesSummary, SortDirection,
    SortState, DATE_FORMAT,
};

use crate::error::{AppError, AppResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Query string of `GET /reports/sales`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesReportParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub branch: Option<String>,
    pub payment_method: Option<String>,
    pub order_type: Option<String>,
    /// Column key to sort by
    pub sort: Option<String>,
    /// `asc` (default) or `desc`
    pub order: Option<SortDirection>,
    /// Comma-separated column keys to hide; replaces the default hidden set
    pub hidden: Option<String>,
    /// `json` (default) or `csv`
    pub format: Option<String>,
}

/// Active sort in a report response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortView {
    pub column: SalesColumn,
    pub direction: SortDirection,
}

/// JSON body of the sales report
#[derive(Debug, Serialize, Deserialize)]
pub struct SalesReport {
    pub range: DateRange,
    pub columns: Vec<ColumnDescriptor<SalesColumn>>,
    pub sort: Option<SortView>,
    pub rows: Vec<SalesReportRow>,
    pub summary: SalesSummary,
}

#[derive(Debug, FromRow)]
struct SalesRow {
    order_id: String,
    order_date: NaiveDate,
    branch: String,
    product_name: String,
    category: String,
    quantity: i32,
    unit_price: Decimal,
    total_sales: Decimal,
    payment_method: String,
    order_type: String,
}

impl TryFrom<SalesRow> for SalesReportRow {
    type Error = AppError;

    fn try_from(row: SalesRow) -> Result<Self, Self::Error> {
        let corrupt = |e: shared::UnknownValue| {
            AppError::Internal(format!("corrupt order {}: {}", row.order_id, e))
        };
        let payment_method: PaymentMethod = row.payment_method.parse().map_err(corrupt)?;
        let order_type: OrderType = row.order_type.parse().map_err(corrupt)?;

        Ok(Self {
            order_id: row.order_id,
            order_date: row.order_date,
            branch: row.branch,
            product_name: row.product_name,
            category: row.category,
            quantity: row.quantity,
            unit_price: row.unit_price,
            total_sales: row.total_sales,
            payment_method,
            order_type,
        })
    }
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Order lines whose order falls inside `range` (UTC calendar days)
    pub async fn sales_rows(&self, range: DateRange) -> AppResult<Vec<SalesReportRow>> {
        let rows = sqlx::query_as::<_, SalesRow>(
            r#"
            SELECT o.order_number AS order_id,
                   (o.created_at AT TIME ZONE 'UTC')::date AS order_date,
                   b.name AS branch,
                   p.name AS product_name,
                   c.name AS category,
                   oi.quantity,
                   oi.unit_price,
                   oi.total_price AS total_sales,
                   o.payment_method,
                   o.order_type
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN branches b ON b.id = o.branch_id
            JOIN products p ON p.id = oi.product_id
            JOIN categories c ON c.id = p.category_id
            WHERE (o.created_at AT TIME ZONE 'UTC')::date BETWEEN $1 AND $2
            ORDER BY o.created_at DESC, o.order_number ASC, p.name ASC
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(SalesReportRow::try_from).collect()
    }
}

/// Requested window, defaulting to the `default_days` days ending `today`
pub fn resolve_range(
    params: &SalesReportParams,
    today: NaiveDate,
    default_days: u32,
) -> AppResult<DateRange> {
    let fallback = DateRange::last_days(today, default_days);
    let start = parse_date("start_date", params.start_date.as_deref())?.unwrap_or(fallback.start);
    let end = parse_date("end_date", params.end_date.as_deref())?.unwrap_or(fallback.end);

    if start > end {
        return Err(AppError::validation(
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok(DateRange::new(start, end))
}

fn parse_date(field: &str, raw: Option<&str>) -> AppResult<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|_| AppError::validation(field, format!("expected YYYY-MM-DD, got '{}'", s))),
    }
}

fn parse_column(field: &str, raw: &str) -> AppResult<SalesColumn> {
    raw.trim()
        .parse()
        .map_err(|e: shared::UnknownValue| AppError::validation(field, e.to_string()))
}

fn facet(raw: &Option<String>) -> FacetSelection {
    raw.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(FacetSelection::from)
        .unwrap_or_default()
}

/// Configure a sales table from request parameters.
///
/// Unknown column keys in `sort` or `hidden` are validation errors.
pub fn build_sales_table(
    rows: Vec<SalesReportRow>,
    range: DateRange,
    params: &SalesReportParams,
) -> AppResult<SalesReportTable> {
    let mut table = SalesReportTable::new(rows, default_sales_columns());

    if let Some(hidden) = &params.hidden {
        let hidden: HashSet<SalesColumn> = hidden
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| parse_column("hidden", s))
            .collect::<AppResult<_>>()?;
        for column in SalesColumn::ALL {
            if table.columns().get(column).map(|c| c.visible) == Some(hidden.contains(&column)) {
                table.toggle_column(column);
            }
        }
    }

    if let Some(sort) = params.sort.as_deref().filter(|s| !s.trim().is_empty()) {
        let column = parse_column("sort", sort)?;
        let direction = params.order.unwrap_or(SortDirection::Asc);
        table.set_sort(SortState::by(column, direction));
    }

    let filter = SalesReportFilter {
        start_date: Some(range.start),
        end_date: Some(range.end),
        branch: facet(&params.branch),
        payment_method: facet(&params.payment_method),
        order_type: facet(&params.order_type),
    };
    table.set_filter(filter.to_row_filter());

    Ok(table)
}

/// JSON projection of a configured table
pub fn sales_report(table: &SalesReportTable, range: DateRange) -> SalesReport {
    let view = table.view();
    SalesReport {
        range,
        columns: table.columns().descriptors().to_vec(),
        sort: table
            .sort_state()
            .active()
            .map(|(column, direction)| SortView { column, direction }),
        summary: SalesSummary::from_rows(view.iter().copied()),
        rows: view.into_iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    #[test]
    fn test_default_range_is_thirty_days() {
        let range = resolve_range(&SalesReportParams::default(), day(30), 30).unwrap();
        assert_eq!(range, DateRange::new(day(1), day(30)));
    }

    #[test]
    fn test_range_rejects_bad_dates() {
        let params = SalesReportParams {
            start_date: Some("05/01/2025".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_range(&params, day(30), 30),
            Err(AppError::Validation { ref field, .. }) if field == "start_date"
        ));

        let params = SalesReportParams {
            start_date: Some("2025-05-10".to_string()),
            end_date: Some("2025-05-09".to_string()),
            ..Default::default()
        };
        assert!(resolve_range(&params, day(30), 30).is_err());
    }

    #[test]
    fn test_hidden_replaces_defaults() {
        let params = SalesReportParams {
            hidden: Some("category,unit_price".to_string()),
            ..Default::default()
        };
        let table = build_sales_table(vec![], DateRange::new(day(1), day(2)), &params).unwrap();
        let columns = table.columns();
        assert!(!columns.get(SalesColumn::Category).unwrap().visible);
        assert!(!columns.get(SalesColumn::UnitPrice).unwrap().visible);
        assert!(columns.get(SalesColumn::OrderType).unwrap().visible);
    }

    #[test]
    fn test_unknown_sort_key_is_validation_error() {
        let params = SalesReportParams {
            sort: Some("margin".to_string()),
            ..Default::default()
        };
        let err = build_sales_table(vec![], DateRange::new(day(1), day(2)), &params).unwrap_err();
        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "sort"));
    }
}

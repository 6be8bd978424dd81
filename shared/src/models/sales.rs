//! Sales report rows, columns and summary

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::{
    CellValue, ColumnDescriptor, ColumnSet, FacetSelection, ReportRow, ReportTable, RowFilter,
};
use crate::types::DateRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Online,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Online];

    pub fn key(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Online => "online",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Card => "Card",
            PaymentMethod::Online => "Online",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    DineIn,
    Delivery,
    Pickup,
}

impl OrderType {
    pub const ALL: [OrderType; 3] = [OrderType::DineIn, OrderType::Delivery, OrderType::Pickup];

    pub fn key(&self) -> &'static str {
        match self {
            OrderType::DineIn => "dine_in",
            OrderType::Delivery => "delivery",
            OrderType::Pickup => "pickup",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderType::DineIn => "Dine In",
            OrderType::Delivery => "Delivery",
            OrderType::Pickup => "Pickup",
        }
    }
}

macro_rules! labelled_enum_impls {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        /// Accepts the snake_case key or the display label
        impl FromStr for $ty {
            type Err = UnknownValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .into_iter()
                    .find(|v| v.key() == s || v.label() == s)
                    .ok_or_else(|| UnknownValue {
                        kind: $what,
                        value: s.to_string(),
                    })
            }
        }
    };
}

labelled_enum_impls!(PaymentMethod, "payment method");
labelled_enum_impls!(OrderType, "order type");

/// A string that does not name a member of a closed set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownValue {
    pub kind: &'static str,
    pub value: String,
}

/// One order line in the sales report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReportRow {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub branch: String,
    pub product_name: String,
    pub category: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_sales: Decimal,
    pub payment_method: PaymentMethod,
    pub order_type: OrderType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalesColumn {
    OrderId,
    OrderDate,
    Branch,
    ProductName,
    Category,
    Quantity,
    UnitPrice,
    TotalSales,
    PaymentMethod,
    OrderType,
}

impl SalesColumn {
    /// Display order
    pub const ALL: [SalesColumn; 10] = [
        SalesColumn::OrderId,
        SalesColumn::OrderDate,
        SalesColumn::Branch,
        SalesColumn::ProductName,
        SalesColumn::Category,
        SalesColumn::Quantity,
        SalesColumn::UnitPrice,
        SalesColumn::TotalSales,
        SalesColumn::PaymentMethod,
        SalesColumn::OrderType,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SalesColumn::OrderId => "order_id",
            SalesColumn::OrderDate => "order_date",
            SalesColumn::Branch => "branch",
            SalesColumn::ProductName => "product_name",
            SalesColumn::Category => "category",
            SalesColumn::Quantity => "quantity",
            SalesColumn::UnitPrice => "unit_price",
            SalesColumn::TotalSales => "total_sales",
            SalesColumn::PaymentMethod => "payment_method",
            SalesColumn::OrderType => "order_type",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SalesColumn::OrderId => "Order ID",
            SalesColumn::OrderDate => "Date",
            SalesColumn::Branch => "Branch",
            SalesColumn::ProductName => "Product",
            SalesColumn::Category => "Category",
            SalesColumn::Quantity => "Qty",
            SalesColumn::UnitPrice => "Unit Price",
            SalesColumn::TotalSales => "Total Sales",
            SalesColumn::PaymentMethod => "Payment",
            SalesColumn::OrderType => "Order Type",
        }
    }

    /// Hidden unless the user asks for it
    pub fn visible_by_default(&self) -> bool {
        !matches!(self, SalesColumn::OrderType)
    }
}

impl FromStr for SalesColumn {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SalesColumn::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| UnknownValue {
                kind: "sales column",
                value: s.to_string(),
            })
    }
}

/// Sales columns in display order with their default visibility
pub fn default_sales_columns() -> ColumnSet<SalesColumn> {
    ColumnSet::new(
        SalesColumn::ALL
            .into_iter()
            .map(|c| ColumnDescriptor::new(c, c.label(), c.visible_by_default()))
            .collect(),
    )
}

impl ReportRow for SalesReportRow {
    type Column = SalesColumn;

    fn cell(&self, column: SalesColumn) -> CellValue {
        match column {
            SalesColumn::OrderId => CellValue::text(&self.order_id),
            SalesColumn::OrderDate => CellValue::Date(self.order_date),
            SalesColumn::Branch => CellValue::text(&self.branch),
            SalesColumn::ProductName => CellValue::text(&self.product_name),
            SalesColumn::Category => CellValue::text(&self.category),
            SalesColumn::Quantity => CellValue::Integer(i64::from(self.quantity)),
            SalesColumn::UnitPrice => CellValue::Currency(self.unit_price),
            SalesColumn::TotalSales => CellValue::Currency(self.total_sales),
            SalesColumn::PaymentMethod => CellValue::text(self.payment_method.label()),
            SalesColumn::OrderType => CellValue::text(self.order_type.label()),
        }
    }
}

pub type SalesReportTable = ReportTable<SalesReportRow>;

/// User-facing sales report filter.
///
/// Facet values may be given as keys or labels; `"all"` disables a facet.
/// A single open date bound leaves the other side unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub branch: FacetSelection,
    pub payment_method: FacetSelection,
    pub order_type: FacetSelection,
}

impl SalesReportFilter {
    pub fn date_range(&self) -> Option<DateRange> {
        match (self.start_date, self.end_date) {
            (None, None) => None,
            (start, end) => Some(DateRange::new(
                start.unwrap_or(NaiveDate::MIN),
                end.unwrap_or(NaiveDate::MAX),
            )),
        }
    }

    /// Engine filter with facet values normalised to the cell labels
    pub fn to_row_filter(&self) -> RowFilter<SalesColumn> {
        let mut filter = RowFilter::new()
            .with_facet(SalesColumn::Branch, self.branch.clone())
            .with_facet(
                SalesColumn::PaymentMethod,
                normalise::<PaymentMethod>(&self.payment_method, PaymentMethod::label),
            )
            .with_facet(
                SalesColumn::OrderType,
                normalise::<OrderType>(&self.order_type, OrderType::label),
            );
        if let Some(range) = self.date_range() {
            filter = filter.with_date_range(SalesColumn::OrderDate, range);
        }
        filter
    }
}

fn normalise<E: FromStr>(selection: &FacetSelection, label: fn(&E) -> &'static str) -> FacetSelection {
    match selection {
        FacetSelection::Exactly(value) => match value.parse::<E>() {
            Ok(parsed) => FacetSelection::Exactly(label(&parsed).to_string()),
            Err(_) => selection.clone(),
        },
        FacetSelection::All => FacetSelection::All,
    }
}

/// Totals over a set of sales rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: Decimal,
    /// Distinct order ids
    pub order_count: usize,
    /// Sum of line quantities
    pub item_count: i64,
    /// Two decimal places; zero when there are no orders
    pub average_order_value: Decimal,
}

impl SalesSummary {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a SalesReportRow>) -> Self {
        let mut total_sales = Decimal::ZERO;
        let mut item_count = 0i64;
        let mut orders = HashSet::new();

        for row in rows {
            total_sales += row.total_sales;
            item_count += i64::from(row.quantity);
            orders.insert(row.order_id.as_str());
        }

        let average_order_value = if orders.is_empty() {
            Decimal::ZERO
        } else {
            (total_sales / Decimal::from(orders.len()))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };

        Self {
            total_sales,
            order_count: orders.len(),
            item_count,
            average_order_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SortDirection;

    fn row(order_id: &str, day: u32, branch: &str, qty: i32, total: &str, pay: PaymentMethod, kind: OrderType) -> SalesReportRow {
        let total: Decimal = total.parse().unwrap();
        SalesReportRow {
            order_id: order_id.to_string(),
            order_date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
            branch: branch.to_string(),
            product_name: "Espresso".to_string(),
            category: "Beverage".to_string(),
            quantity: qty,
            unit_price: total / Decimal::from(qty),
            total_sales: total,
            payment_method: pay,
            order_type: kind,
        }
    }

    fn sample() -> Vec<SalesReportRow> {
        vec![
            row("ORD001", 15, "Main Street Cafe", 2, "7.00", PaymentMethod::Card, OrderType::DineIn),
            row("ORD002", 15, "Downtown Diner", 1, "12.99", PaymentMethod::Cash, OrderType::Pickup),
            row("ORD003", 14, "Main Street Cafe", 1, "4.50", PaymentMethod::Online, OrderType::Delivery),
            row("ORD003", 14, "Main Street Cafe", 3, "8.25", PaymentMethod::Online, OrderType::Delivery),
        ]
    }

    #[test]
    fn test_default_columns_hide_order_type() {
        let columns = default_sales_columns();
        let labels: Vec<&str> = columns.visible().map(|c| c.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Order ID", "Date", "Branch", "Product", "Category", "Qty", "Unit Price", "Total Sales", "Payment"]
        );
        assert!(!columns.get(SalesColumn::OrderType).unwrap().visible);
    }

    #[test]
    fn test_labels_and_keys_parse() {
        assert_eq!("Dine In".parse::<OrderType>(), Ok(OrderType::DineIn));
        assert_eq!("dine_in".parse::<OrderType>(), Ok(OrderType::DineIn));
        assert_eq!("card".parse::<PaymentMethod>(), Ok(PaymentMethod::Card));
        assert!("cheque".parse::<PaymentMethod>().is_err());
        assert_eq!("total_sales".parse::<SalesColumn>(), Ok(SalesColumn::TotalSales));
        assert!("totalSales".parse::<SalesColumn>().is_err());
    }

    #[test]
    fn test_filter_normalises_facets() {
        let filter = SalesReportFilter {
            payment_method: FacetSelection::from("card"),
            order_type: FacetSelection::from("all"),
            ..Default::default()
        };
        let rows = sample();
        let mut table = SalesReportTable::new(rows, default_sales_columns());
        table.set_filter(filter.to_row_filter());
        let ids: Vec<&str> = table.view().iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(ids, vec!["ORD001"]);
    }

    #[test]
    fn test_filter_open_ended_dates() {
        let filter = SalesReportFilter {
            start_date: NaiveDate::from_ymd_opt(2025, 5, 15),
            ..Default::default()
        };
        let mut table = SalesReportTable::new(sample(), default_sales_columns());
        table.set_filter(filter.to_row_filter());
        assert_eq!(table.view().len(), 2);
    }

    #[test]
    fn test_summary_counts_distinct_orders() {
        let summary = SalesSummary::from_rows(&sample());
        assert_eq!(summary.total_sales, "32.74".parse::<Decimal>().unwrap());
        assert_eq!(summary.order_count, 3);
        assert_eq!(summary.item_count, 7);
        assert_eq!(summary.average_order_value, "10.91".parse::<Decimal>().unwrap());

        let empty = SalesSummary::from_rows(&[]);
        assert_eq!(empty.order_count, 0);
        assert_eq!(empty.average_order_value, Decimal::ZERO);
    }

    #[test]
    fn test_export_matches_dashboard_format() {
        let mut table = SalesReportTable::new(sample(), default_sales_columns());
        for column in [
            SalesColumn::OrderDate,
            SalesColumn::Branch,
            SalesColumn::ProductName,
            SalesColumn::Category,
            SalesColumn::Quantity,
            SalesColumn::UnitPrice,
            SalesColumn::PaymentMethod,
        ] {
            table.toggle_column(column);
        }
        table.request_sort(SalesColumn::TotalSales);
        table.request_sort(SalesColumn::TotalSales);
        assert_eq!(
            table.sort_state().direction_for(SalesColumn::TotalSales),
            Some(SortDirection::Desc)
        );
        assert_eq!(
            table.export_csv().unwrap(),
            "Order ID,Total Sales\nORD002,12.99\nORD003,8.25\nORD001,7.00\nORD003,4.50"
        );
    }

    #[test]
    fn test_row_json_uses_snake_case_enums() {
        let json = serde_json::to_value(&sample()[0]).unwrap();
        assert_eq!(json["payment_method"], "card");
        assert_eq!(json["order_type"], "dine_in");
        assert_eq!(json["order_date"], "2025-05-15");
    }
}

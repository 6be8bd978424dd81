//! Stateful report table: rows plus filter, sort and column state

use super::{export_csv, sort_rows, ColumnSet, ExportError, ReportRow, RowFilter, SortState};

/// A report grid owned by a single caller.
///
/// Source rows are never reordered or modified. The filtered index is
/// recomputed whenever rows or filter change; sorting and visibility are
/// applied on read.
#[derive(Debug, Clone)]
pub struct ReportTable<T: ReportRow> {
    rows: Vec<T>,
    columns: ColumnSet<T::Column>,
    sort: SortState<T::Column>,
    filter: RowFilter<T::Column>,
    filtered: Vec<usize>,
}

impl<T: ReportRow> ReportTable<T> {
    pub fn new(rows: Vec<T>, columns: ColumnSet<T::Column>) -> Self {
        let mut table = Self {
            rows,
            columns,
            sort: SortState::none(),
            filter: RowFilter::new(),
            filtered: Vec::new(),
        };
        table.refilter();
        table
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.refilter();
    }

    pub fn filter(&self) -> &RowFilter<T::Column> {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: RowFilter<T::Column>) {
        self.filter = filter;
        self.refilter();
    }

    pub fn columns(&self) -> &ColumnSet<T::Column> {
        &self.columns
    }

    /// Flip a column's visibility; returns the new value.
    ///
    /// # Panics
    /// If `key` is not one of the table's columns.
    pub fn toggle_column(&mut self, key: T::Column) -> bool {
        self.columns.toggle(key)
    }

    /// Advance the sort state machine for `key`.
    ///
    /// # Panics
    /// If `key` is not one of the table's columns.
    pub fn request_sort(&mut self, key: T::Column) {
        assert!(self.columns.contains(key), "unknown column key {:?}", key);
        self.sort.request(key);
    }

    /// Replace the sort state outright, e.g. from a saved view.
    ///
    /// # Panics
    /// If the state's key is not one of the table's columns.
    pub fn set_sort(&mut self, sort: SortState<T::Column>) {
        if let Some((key, _)) = sort.active() {
            assert!(self.columns.contains(key), "unknown column key {:?}", key);
        }
        self.sort = sort;
    }

    pub fn sort_state(&self) -> &SortState<T::Column> {
        &self.sort
    }

    /// Filtered rows in current sort order
    pub fn view(&self) -> Vec<&T> {
        sort_rows(self.filtered.iter().map(|&idx| &self.rows[idx]), &self.sort)
    }

    pub fn export_csv(&self) -> Result<String, ExportError> {
        export_csv(&self.columns, self.view())
    }

    fn refilter(&mut self) {
        self.filtered = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| self.filter.matches(*row))
            .map(|(idx, _)| idx)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CellValue, ColumnDescriptor, SortDirection};
    use crate::types::DateRange;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Col {
        Id,
        Day,
        Branch,
        Total,
    }

    #[derive(Debug, Clone)]
    struct Row {
        id: i64,
        day: NaiveDate,
        branch: &'static str,
        total: Decimal,
    }

    impl ReportRow for Row {
        type Column = Col;

        fn cell(&self, column: Col) -> CellValue {
            match column {
                Col::Id => CellValue::Integer(self.id),
                Col::Day => CellValue::Date(self.day),
                Col::Branch => CellValue::text(self.branch),
                Col::Total => CellValue::Currency(self.total),
            }
        }
    }

    fn may(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, day).unwrap()
    }

    fn row(id: i64, day: u32, branch: &'static str, total: i64) -> Row {
        Row {
            id,
            day: may(day),
            branch,
            total: Decimal::from(total),
        }
    }

    fn columns() -> ColumnSet<Col> {
        ColumnSet::new(vec![
            ColumnDescriptor::new(Col::Id, "ID", true),
            ColumnDescriptor::new(Col::Day, "Date", true),
            ColumnDescriptor::new(Col::Branch, "Branch", true),
            ColumnDescriptor::new(Col::Total, "Total", true),
        ])
    }

    fn ids(table: &ReportTable<Row>) -> Vec<i64> {
        table.view().iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_filter_then_sort() {
        let mut table = ReportTable::new(
            vec![
                row(1, 1, "Main", 10),
                row(2, 2, "Downtown", 30),
                row(3, 3, "Main", 20),
                row(4, 4, "Main", 5),
            ],
            columns(),
        );

        table.set_filter(RowFilter::new().with_facet(Col::Branch, "Main"));
        assert_eq!(ids(&table), vec![1, 3, 4]);

        table.request_sort(Col::Total);
        assert_eq!(ids(&table), vec![4, 1, 3]);

        // Changing the filter keeps the sort
        table.set_filter(RowFilter::new().with_date_range(Col::Day, DateRange::new(may(2), may(4))));
        assert_eq!(table.sort_state().active(), Some((Col::Total, SortDirection::Asc)));
        assert_eq!(ids(&table), vec![4, 3, 2]);
    }

    #[test]
    fn test_set_rows_reapplies_filter() {
        let mut table = ReportTable::new(vec![row(1, 1, "Main", 1)], columns());
        table.set_filter(RowFilter::new().with_facet(Col::Branch, "Downtown"));
        assert!(table.view().is_empty());

        table.set_rows(vec![row(2, 1, "Downtown", 1), row(3, 1, "Main", 1)]);
        assert_eq!(ids(&table), vec![2]);
        assert_eq!(table.rows().len(), 2);
    }

    #[test]
    fn test_export_follows_view_and_visibility() {
        let mut table = ReportTable::new(
            vec![row(1, 1, "Main", 7), row(2, 2, "Downtown", 3)],
            columns(),
        );
        table.toggle_column(Col::Day);
        table.toggle_column(Col::Branch);
        table.request_sort(Col::Total);

        assert_eq!(table.export_csv().unwrap(), "ID,Total\n2,3.00\n1,7.00");
    }

    #[test]
    fn test_set_sort_then_cycle() {
        let mut table = ReportTable::new(vec![row(1, 1, "Main", 1), row(3, 2, "Main", 2)], columns());
        table.set_sort(SortState::by(Col::Id, SortDirection::Desc));
        assert_eq!(ids(&table), vec![3, 1]);
        table.request_sort(Col::Id);
        assert_eq!(table.sort_state().active(), None);
        assert_eq!(ids(&table), vec![1, 3]);
    }

    #[test]
    #[should_panic(expected = "unknown column key")]
    fn test_sort_on_missing_column_panics() {
        let mut table = ReportTable::new(
            Vec::<Row>::new(),
            ColumnSet::new(vec![ColumnDescriptor::new(Col::Id, "ID", true)]),
        );
        table.request_sort(Col::Total);
    }
}

//! Row predicates: an inclusive date window plus exact-match facets

use serde::{Deserialize, Serialize};

use super::ReportRow;
use crate::types::DateRange;

/// Facet value meaning "do not filter on this dimension"
pub const ALL_SENTINEL: &str = "all";

/// Selection for one categorical facet
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FacetSelection {
    #[default]
    All,
    Exactly(String),
}

impl From<String> for FacetSelection {
    fn from(value: String) -> Self {
        if value == ALL_SENTINEL {
            FacetSelection::All
        } else {
            FacetSelection::Exactly(value)
        }
    }
}

impl From<&str> for FacetSelection {
    fn from(value: &str) -> Self {
        FacetSelection::from(value.to_string())
    }
}

impl From<FacetSelection> for String {
    fn from(value: FacetSelection) -> Self {
        match value {
            FacetSelection::All => ALL_SENTINEL.to_string(),
            FacetSelection::Exactly(v) => v,
        }
    }
}

/// Conjunction of an optional date window and any number of facets.
///
/// A missing dimension always passes. Rows whose date column does not hold a
/// date never pass a configured window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter<C> {
    date_range: Option<(C, DateRange)>,
    facets: Vec<(C, FacetSelection)>,
}

impl<C> Default for RowFilter<C> {
    fn default() -> Self {
        Self {
            date_range: None,
            facets: Vec::new(),
        }
    }
}

impl<C: Copy + Eq> RowFilter<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, column: C, range: DateRange) -> Self {
        self.date_range = Some((column, range));
        self
    }

    /// Adds a facet, replacing any earlier selection on the same column.
    pub fn with_facet(mut self, column: C, selection: impl Into<FacetSelection>) -> Self {
        let selection = selection.into();
        match self.facets.iter_mut().find(|(c, _)| *c == column) {
            Some(existing) => existing.1 = selection,
            None => self.facets.push((column, selection)),
        }
        self
    }

    pub fn date_range(&self) -> Option<DateRange> {
        self.date_range.map(|(_, range)| range)
    }

    pub fn facets(&self) -> &[(C, FacetSelection)] {
        &self.facets
    }

    pub fn matches<T: ReportRow<Column = C>>(&self, row: &T) -> bool {
        let in_range = self.date_range.map_or(true, |(column, range)| {
            row.cell(column).as_date().is_some_and(|d| range.contains(d))
        });

        in_range
            && self
                .facets
                .iter()
                .all(|(column, selection)| match selection {
                    FacetSelection::All => true,
                    FacetSelection::Exactly(wanted) => row.cell(*column).to_text() == *wanted,
                })
    }
}

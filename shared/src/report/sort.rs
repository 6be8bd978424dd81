//! Single-key sort state and the stable sort over report rows

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::value::{compare_cells, CellValue};
use super::ReportRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[serde(alias = "ascending")]
    Asc,
    #[serde(alias = "descending")]
    Desc,
}

/// At most one active sort key.
///
/// Requesting the same key cycles none -> asc -> desc -> none; requesting a
/// different key starts it at asc and drops the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState<C> {
    active: Option<(C, SortDirection)>,
}

impl<C> Default for SortState<C> {
    fn default() -> Self {
        Self { active: None }
    }
}

impl<C: Copy + Eq> SortState<C> {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn by(key: C, direction: SortDirection) -> Self {
        Self {
            active: Some((key, direction)),
        }
    }

    pub fn request(&mut self, key: C) {
        self.active = match self.active {
            Some((current, SortDirection::Asc)) if current == key => {
                Some((key, SortDirection::Desc))
            }
            Some((current, SortDirection::Desc)) if current == key => None,
            _ => Some((key, SortDirection::Asc)),
        };
    }

    pub fn active(&self) -> Option<(C, SortDirection)> {
        self.active
    }

    /// Direction shown for `key`'s header, if it is the active one
    pub fn direction_for(&self, key: C) -> Option<SortDirection> {
        self.active
            .and_then(|(current, direction)| (current == key).then_some(direction))
    }
}

/// Rows in sorted order. An inactive state keeps the input order.
pub fn sort_rows<'a, T: ReportRow>(
    rows: impl IntoIterator<Item = &'a T>,
    state: &SortState<T::Column>,
) -> Vec<&'a T> {
    let Some((key, direction)) = state.active() else {
        return rows.into_iter().collect();
    };

    let mut keyed: Vec<(CellValue, &'a T)> = rows.into_iter().map(|row| (row.cell(key), row)).collect();
    keyed.sort_by(|(a, _), (b, _)| apply_direction(compare_cells(a, b), direction));
    keyed.into_iter().map(|(_, row)| row).collect()
}

fn apply_direction(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Col {
        Id,
        Name,
    }

    #[derive(Debug, PartialEq)]
    struct Row {
        id: i64,
        name: &'static str,
    }

    impl ReportRow for Row {
        type Column = Col;

        fn cell(&self, column: Col) -> CellValue {
            match column {
                Col::Id => CellValue::Integer(self.id),
                Col::Name => CellValue::text(self.name),
            }
        }
    }

    fn ids(rows: &[&Row]) -> Vec<i64> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_same_key_cycles() {
        let mut state = SortState::none();
        state.request(Col::Id);
        assert_eq!(state.active(), Some((Col::Id, SortDirection::Asc)));
        state.request(Col::Id);
        assert_eq!(state.active(), Some((Col::Id, SortDirection::Desc)));
        state.request(Col::Id);
        assert_eq!(state.active(), None);
        state.request(Col::Id);
        assert_eq!(state.active(), Some((Col::Id, SortDirection::Asc)));
    }

    #[test]
    fn test_other_key_resets_to_asc() {
        let mut state = SortState::by(Col::Id, SortDirection::Desc);
        state.request(Col::Name);
        assert_eq!(state.active(), Some((Col::Name, SortDirection::Asc)));
        assert_eq!(state.direction_for(Col::Id), None);
        assert_eq!(state.direction_for(Col::Name), Some(SortDirection::Asc));
    }

    #[test]
    fn test_sort_cycle_on_rows() {
        let rows = vec![Row { id: 3, name: "b" }, Row { id: 1, name: "a" }];
        let mut state = SortState::none();

        state.request(Col::Id);
        assert_eq!(ids(&sort_rows(&rows, &state)), vec![1, 3]);

        state.request(Col::Id);
        assert_eq!(ids(&sort_rows(&rows, &state)), vec![3, 1]);

        state.request(Col::Id);
        assert_eq!(ids(&sort_rows(&rows, &state)), vec![3, 1]);
        // Source order untouched throughout
        assert_eq!(rows[0].id, 3);
    }

    #[test]
    fn test_sort_is_stable_both_directions() {
        let rows = vec![
            Row { id: 1, name: "x" },
            Row { id: 2, name: "y" },
            Row { id: 3, name: "x" },
            Row { id: 4, name: "y" },
        ];

        let asc = sort_rows(&rows, &SortState::by(Col::Name, SortDirection::Asc));
        assert_eq!(ids(&asc), vec![1, 3, 2, 4]);

        let desc = sort_rows(&rows, &SortState::by(Col::Name, SortDirection::Desc));
        assert_eq!(ids(&desc), vec![2, 4, 1, 3]);
    }
}

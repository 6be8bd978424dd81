//! Ordered column configuration with per-column visibility

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// One column of a report table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor<C> {
    pub key: C,
    pub label: String,
    pub visible: bool,
}

impl<C> ColumnDescriptor<C> {
    pub fn new(key: C, label: impl Into<String>, visible: bool) -> Self {
        Self {
            key,
            label: label.into(),
            visible,
        }
    }
}

/// Column descriptors in display order.
///
/// Keys are unique. Passing a key that is not part of the set is a programming
/// error and panics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSet<C> {
    columns: Vec<ColumnDescriptor<C>>,
}

impl<C: Copy + Eq + Debug> ColumnSet<C> {
    pub fn new(columns: Vec<ColumnDescriptor<C>>) -> Self {
        for (idx, column) in columns.iter().enumerate() {
            assert!(
                !columns[..idx].iter().any(|c| c.key == column.key),
                "duplicate column key {:?}",
                column.key
            );
        }
        Self { columns }
    }

    pub fn contains(&self, key: C) -> bool {
        self.columns.iter().any(|c| c.key == key)
    }

    pub fn get(&self, key: C) -> Option<&ColumnDescriptor<C>> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Flip one column's visibility and return the new value.
    pub fn toggle(&mut self, key: C) -> bool {
        let column = self.position_mut(key);
        column.visible = !column.visible;
        column.visible
    }

    pub fn set_visible(&mut self, key: C, visible: bool) {
        self.position_mut(key).visible = visible;
    }

    pub fn descriptors(&self) -> &[ColumnDescriptor<C>] {
        &self.columns
    }

    /// Visible columns, in display order
    pub fn visible(&self) -> impl Iterator<Item = &ColumnDescriptor<C>> + '_ {
        self.columns.iter().filter(|c| c.visible)
    }

    fn position_mut(&mut self, key: C) -> &mut ColumnDescriptor<C> {
        match self.columns.iter_mut().find(|c| c.key == key) {
            Some(column) => column,
            None => panic!("unknown column key {:?}", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Col {
        Id,
        Name,
        Price,
    }

    fn columns() -> ColumnSet<Col> {
        ColumnSet::new(vec![
            ColumnDescriptor::new(Col::Id, "ID", true),
            ColumnDescriptor::new(Col::Name, "Name", true),
            ColumnDescriptor::new(Col::Price, "Price", false),
        ])
    }

    #[test]
    fn test_toggle_flips_only_target() {
        let mut set = columns();
        let before = set.clone();

        assert!(!set.toggle(Col::Name));

        let after = set.descriptors();
        assert_eq!(after.len(), 3);
        assert_eq!(after[0], before.descriptors()[0]);
        assert_eq!(after[1].key, Col::Name);
        assert!(!after[1].visible);
        assert_eq!(after[2], before.descriptors()[2]);

        assert!(set.toggle(Col::Name));
        assert_eq!(set, before);
    }

    #[test]
    fn test_visible_keeps_order() {
        let mut set = columns();
        set.set_visible(Col::Price, true);
        set.set_visible(Col::Id, false);
        let labels: Vec<&str> = set.visible().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Name", "Price"]);
    }

    #[test]
    #[should_panic(expected = "duplicate column key")]
    fn test_duplicate_keys_panic() {
        ColumnSet::new(vec![
            ColumnDescriptor::new(Col::Id, "ID", true),
            ColumnDescriptor::new(Col::Id, "Again", true),
        ]);
    }

    #[test]
    #[should_panic(expected = "unknown column key")]
    fn test_toggle_unknown_key_panics() {
        let mut set = ColumnSet::new(vec![ColumnDescriptor::new(Col::Id, "ID", true)]);
        set.toggle(Col::Price);
    }
}

//! Table storage: columns, labels, names, and the label counter.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Result, TableError};

/// What drives a column's values.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    /// Values entered directly.
    Data,
    /// Values derived from an expression over columns to the left.
    /// The expression is stored with column *labels* as variable tokens,
    /// so renames never touch it.
    Calculated { expression: String, valid: bool },
}

/// One column of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Permanent identity, `col<N>`. Never reused, never changed.
    pub(crate) label: String,
    /// User-facing display name, always normalized to a valid identifier.
    pub(crate) name: String,
    /// One value per row; missing values are NaN.
    pub(crate) values: Vec<f64>,
    pub(crate) kind: ColumnKind,
}

impl Column {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn is_calculated(&self) -> bool {
        matches!(self.kind, ColumnKind::Calculated { .. })
    }

    /// Data columns are always valid; calculated columns only when their
    /// last evaluation succeeded.
    pub fn is_valid(&self) -> bool {
        match &self.kind {
            ColumnKind::Data => true,
            ColumnKind::Calculated { valid, .. } => *valid,
        }
    }
}

/// UI-agnostic columnar table with calculated-column support.
///
/// Column order is display order and carries the single dependency
/// invariant: a calculated column may only reference columns at a strictly
/// lower index, which makes recalculation a plain left-to-right pass.
pub struct DataTable {
    pub(crate) columns: Vec<Column>,
    pub(crate) num_rows: usize,
    /// Monotonic label counter. Incremented only when a column is created;
    /// reset only by a whole-table load.
    pub(crate) label_counter: u64,
}

fn non_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\W").expect("static regex"))
}

impl DataTable {
    /// Create an empty table with no rows and no columns.
    pub fn new() -> Self {
        DataTable {
            columns: Vec::new(),
            num_rows: 0,
            label_counter: 0,
        }
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// True when every cell is missing (or there are no cells at all).
    pub fn is_empty(&self) -> bool {
        self.columns
            .iter()
            .all(|c| c.values.iter().all(|v| v.is_nan()))
    }

    /// Value at (row, column index). Missing values come back as NaN.
    pub fn get_value(&self, row: usize, column: usize) -> Result<f64> {
        self.check_row(row)?;
        self.check_column(column)?;
        Ok(self.columns[column].values[row])
    }

    /// Label of the column at an index.
    pub fn column_label(&self, column: usize) -> Result<&str> {
        self.check_column(column)?;
        Ok(&self.columns[column].label)
    }

    /// Current index of a labeled column, if it exists.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.label == label)
    }

    /// Display name of a labeled column.
    pub fn column_name(&self, label: &str) -> Result<&str> {
        Ok(&self.column(label)?.name)
    }

    /// All display names in column order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// All labels in column order.
    pub fn column_labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    /// Values of a labeled column.
    pub fn get_column(&self, label: &str) -> Result<&[f64]> {
        Ok(&self.column(label)?.values)
    }

    pub fn is_calculated_column(&self, label: &str) -> bool {
        self.column(label).map(|c| c.is_calculated()).unwrap_or(false)
    }

    /// Whether a column holds valid values. Data columns always do; a
    /// calculated column only if its last evaluation succeeded.
    pub fn is_column_valid(&self, label: &str) -> bool {
        self.column(label).map(|c| c.is_valid()).unwrap_or(false)
    }

    /// Normalize a proposed column name into a valid expression
    /// identifier: every non-word character becomes `_`, and a leading
    /// digit gets a `_` prefix.
    pub fn normalize_column_name(name: &str) -> String {
        let replaced = non_word_re().replace_all(name, "_");
        if replaced.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            format!("_{replaced}")
        } else {
            replaced.into_owned()
        }
    }

    pub(crate) fn column(&self, label: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.label == label)
            .ok_or_else(|| TableError::UnknownLabel(label.to_string()))
    }

    pub(crate) fn column_mut(&mut self, label: &str) -> Result<&mut Column> {
        self.columns
            .iter_mut()
            .find(|c| c.label == label)
            .ok_or_else(|| TableError::UnknownLabel(label.to_string()))
    }

    pub(crate) fn check_column(&self, index: usize) -> Result<()> {
        if index >= self.columns.len() {
            return Err(TableError::ColumnIndexOutOfRange {
                index,
                len: self.columns.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_row(&self, index: usize) -> Result<()> {
        if index >= self.num_rows {
            return Err(TableError::RowIndexOutOfRange {
                index,
                len: self.num_rows,
            });
        }
        Ok(())
    }

    /// Mint a fresh, never-before-used column label.
    pub(crate) fn mint_label(&mut self) -> String {
        self.label_counter += 1;
        format!("col{}", self.label_counter)
    }
}

impl Default for DataTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_are_unique_and_monotonic() {
        let mut table = DataTable::new();
        let first = table.insert_columns(0, 2).unwrap();
        assert_eq!(first, vec!["col1", "col2"]);

        table.remove_columns(0, 2).unwrap();
        // Labels are never reused, even after removal.
        let second = table.insert_columns(0, 1).unwrap();
        assert_eq!(second, vec!["col3"]);
    }

    #[test]
    fn test_new_column_name_defaults_to_label() {
        let mut table = DataTable::new();
        let labels = table.insert_columns(0, 1).unwrap();
        assert_eq!(table.column_name(&labels[0]).unwrap(), labels[0]);
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(DataTable::normalize_column_name("1x"), "_1x");
        assert_eq!(DataTable::normalize_column_name("t x"), "t_x");
        assert_eq!(DataTable::normalize_column_name("U (V)"), "U__V_");
        assert_eq!(DataTable::normalize_column_name("ok_name"), "ok_name");
    }

    #[test]
    fn test_is_empty_treats_nan_as_absent() {
        let mut table = DataTable::new();
        table.insert_columns(0, 1).unwrap();
        table.insert_rows(0, 3).unwrap();
        assert!(table.is_empty());

        table.set_value(1, 0, 4.2).unwrap();
        assert!(!table.is_empty());
    }

    #[test]
    fn test_data_columns_are_always_valid() {
        let mut table = DataTable::new();
        let labels = table.insert_columns(0, 1).unwrap();
        assert!(table.is_column_valid(&labels[0]));
        assert!(!table.is_calculated_column(&labels[0]));
    }
}

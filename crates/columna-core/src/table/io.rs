//! Moving whole tables in and out: CSV import/merge/export and the
//! serializable snapshot used by project files.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::state::{Column, ColumnKind, DataTable};
use crate::error::Result;
use crate::storage::csv::{self, CsvFormat, ParsedCsv};

/// A whole-table snapshot suitable for embedding in a project file.
///
/// Values are stored as `Option<f64>` with `None` for missing cells, so
/// the snapshot survives JSON, which has no NaN literal. Calculated
/// columns carry their stored expressions (label tokens) separately; on
/// load they are re-evaluated rather than trusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableState {
    /// `(label, values)` per column, in display order.
    pub data: Vec<(String, Vec<Option<f64>>)>,
    /// `(label, expression)` for each calculated column.
    pub calculated_columns: Vec<(String, String)>,
    /// Label counter at save time, so loaded tables keep minting fresh
    /// labels.
    pub next_label_counter: u64,
}

impl DataTable {
    /// Build a new table from a CSV file. Column names come from the
    /// header (normalized) or are generated; labels are minted fresh.
    pub fn from_csv(path: &Path, format: &CsvFormat) -> Result<Self> {
        let mut table = DataTable::new();
        table.import_csv(path, format)?;
        Ok(table)
    }

    /// Replace the table's entire contents with a CSV file. The label
    /// counter keeps counting from where it was, so labels stay unique
    /// across the import. On error the table is left untouched.
    pub fn import_csv(&mut self, path: &Path, format: &CsvFormat) -> Result<()> {
        let parsed = csv::read_csv(path, format)?;
        self.columns.clear();
        self.num_rows = parsed.num_rows;
        self.append_imported(parsed, 0);
        Ok(())
    }

    /// Merge a CSV file into the table, keeping calculated columns.
    ///
    /// Imported columns land first, in file order, with fresh labels.
    /// An existing column whose name matches an imported one is replaced
    /// outright, calculated or not. The remaining columns follow in
    /// their old order, keeping their labels, truncated or padded with
    /// missing values to the imported row count. Everything is then
    /// recalculated; a calculated column that referenced a replaced
    /// column goes invalid and keeps its values.
    pub fn merge_csv(&mut self, path: &Path, format: &CsvFormat) -> Result<()> {
        let parsed = csv::read_csv(path, format)?;
        let num_rows = parsed.num_rows;

        let imported_names: Vec<String> = parsed
            .names
            .iter()
            .map(|n| Self::normalize_column_name(n))
            .collect();
        let survivors: Vec<Column> = self
            .columns
            .drain(..)
            .filter(|c| !imported_names.contains(&c.name))
            .collect();

        self.num_rows = num_rows;
        self.append_imported(parsed, 0);
        for mut column in survivors {
            column.values.resize(num_rows, f64::NAN);
            self.columns.push(column);
        }
        self.recalculate_all_columns();
        Ok(())
    }

    /// Export every column as canonical CSV, display names as the
    /// header. Calculated columns are written as plain values.
    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let names: Vec<String> = self.columns.iter().map(|c| c.name.clone()).collect();
        let columns: Vec<&[f64]> = self.columns.iter().map(|c| c.values()).collect();
        csv::write_csv(path, &names, &columns, self.num_rows)
    }

    /// Snapshot the table for persistence. Display names are not part of
    /// the snapshot; the caller persists its label-to-name mapping
    /// alongside and hands it back to [`DataTable::load_state`].
    pub fn save_state(&self) -> TableState {
        TableState {
            data: self
                .columns
                .iter()
                .map(|c| {
                    let values = c
                        .values
                        .iter()
                        .map(|v| if v.is_nan() { None } else { Some(*v) })
                        .collect();
                    (c.label.clone(), values)
                })
                .collect(),
            calculated_columns: self
                .columns
                .iter()
                .filter_map(|c| match &c.kind {
                    ColumnKind::Calculated { expression, .. } => {
                        Some((c.label.clone(), expression.clone()))
                    }
                    ColumnKind::Data => None,
                })
                .collect(),
            next_label_counter: self.label_counter,
        }
    }

    /// Replace the table's contents with a snapshot. `names` maps labels
    /// to display names; labels missing from it keep the label as name.
    /// This is the only place the label counter is ever wound back.
    /// Calculated columns are re-evaluated left to right.
    pub fn load_state(&mut self, state: TableState, names: &HashMap<String, String>) {
        let expressions: HashMap<String, String> =
            state.calculated_columns.into_iter().collect();

        self.num_rows = state.data.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        self.columns = state
            .data
            .into_iter()
            .map(|(label, stored)| {
                let mut values: Vec<f64> = stored
                    .into_iter()
                    .map(|v| v.unwrap_or(f64::NAN))
                    .collect();
                values.resize(self.num_rows, f64::NAN);
                let kind = match expressions.get(&label) {
                    Some(expression) => ColumnKind::Calculated {
                        expression: expression.clone(),
                        valid: false,
                    },
                    None => ColumnKind::Data,
                };
                let name = names.get(&label).cloned().unwrap_or_else(|| label.clone());
                Column {
                    label,
                    name,
                    values,
                    kind,
                }
            })
            .collect();
        self.label_counter = state.next_label_counter;
        self.recalculate_all_columns();
    }

    /// Append parsed CSV columns at `at`, minting a fresh label for each
    /// and normalizing its name.
    fn append_imported(&mut self, parsed: ParsedCsv, at: usize) {
        for (offset, (name, values)) in parsed
            .names
            .into_iter()
            .zip(parsed.columns)
            .enumerate()
        {
            let label = self.mint_label();
            let column = Column {
                name: Self::normalize_column_name(&name),
                label,
                values,
                kind: ColumnKind::Data,
            };
            self.columns.insert(at + offset, column);
        }
    }
}

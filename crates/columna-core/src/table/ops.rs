//! Structural edits, cell writes, and the name/label indirection.
//!
//! Every operation validates its bounds before touching anything, so a
//! rejected call leaves the table exactly as it was. Mutations that can
//! change what dependent expressions see end by triggering the
//! recalculation cascade described in `recalc.rs`.

use std::collections::HashMap;

use columna_engine::rename_variables;

use super::state::{Column, ColumnKind, DataTable};
use crate::error::Result;

impl DataTable {
    /// Insert `count` fresh data columns before position `at`.
    ///
    /// Each new column gets a newly minted label and a name equal to that
    /// label, and is filled with missing values. Returns the new labels in
    /// order. Fails only on out-of-range `at`.
    pub fn insert_columns(&mut self, at: usize, count: usize) -> Result<Vec<String>> {
        if at > self.columns.len() {
            self.check_column(at)?;
        }
        let mut labels = Vec::with_capacity(count);
        for offset in 0..count {
            let label = self.mint_label();
            let column = Column {
                label: label.clone(),
                name: label.clone(),
                values: vec![f64::NAN; self.num_rows],
                kind: ColumnKind::Data,
            };
            self.columns.insert(at + offset, column);
            labels.push(label);
        }
        Ok(labels)
    }

    /// Insert one calculated column before position `at`, with an empty
    /// expression and `valid = false`. Returns its label.
    pub fn insert_calculated_column(&mut self, at: usize) -> Result<String> {
        if at > self.columns.len() {
            self.check_column(at)?;
        }
        let label = self.mint_label();
        let column = Column {
            label: label.clone(),
            name: label.clone(),
            values: vec![f64::NAN; self.num_rows],
            kind: ColumnKind::Calculated {
                expression: String::new(),
                valid: false,
            },
        };
        self.columns.insert(at, column);
        Ok(label)
    }

    /// Remove `count` columns starting at `at`, along with their
    /// expression and validity bookkeeping, then recalculate everything:
    /// removed columns may have been referenced anywhere to the right.
    pub fn remove_columns(&mut self, at: usize, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        self.check_column(at)?;
        self.check_column(at + count - 1)?;
        self.columns.drain(at..at + count);
        self.recalculate_all_columns();
        Ok(())
    }

    /// Move one column so that it ends up at index `dest` in the final
    /// ordering (not "insert before dest"): on `[col1, col2, col3]`,
    /// `move_column(0, 2)` yields `[col2, col3, col1]`.
    pub fn move_column(&mut self, source: usize, dest: usize) -> Result<()> {
        self.check_column(source)?;
        self.check_column(dest)?;
        let column = self.columns.remove(source);
        self.columns.insert(dest, column);
        // Everything from the leftmost touched index rightwards may now
        // resolve a different set of dependencies.
        self.recalculate_from_index(source.min(dest));
        Ok(())
    }

    /// Insert `count` all-missing rows before row `at`. Triggers a full
    /// recalculation: fresh missing rows can flip an expression between
    /// scalar and per-row results.
    pub fn insert_rows(&mut self, at: usize, count: usize) -> Result<()> {
        if at > self.num_rows {
            self.check_row(at)?;
        }
        for column in &mut self.columns {
            column.values.splice(at..at, std::iter::repeat_n(f64::NAN, count));
        }
        self.num_rows += count;
        self.recalculate_all_columns();
        Ok(())
    }

    /// Remove `count` rows starting at `at`, re-compacting row indices.
    /// Values only disappear, so no recalculation is needed.
    pub fn remove_rows(&mut self, at: usize, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        self.check_row(at)?;
        self.check_row(at + count - 1)?;
        for column in &mut self.columns {
            column.values.drain(at..at + count);
        }
        self.num_rows -= count;
        Ok(())
    }

    /// Write a single cell, then recalculate the written column and
    /// everything to its right (they may depend on it by label).
    pub fn set_value(&mut self, row: usize, column: usize, value: f64) -> Result<()> {
        self.check_row(row)?;
        self.check_column(column)?;
        self.columns[column].values[row] = value;
        self.recalculate_from_index(column);
        Ok(())
    }

    /// Fill a rectangle of cells (inclusive corners) with one value. The
    /// corners may be given in any order, as with a selection dragged
    /// upward or leftward.
    pub fn set_values(
        &mut self,
        top: usize,
        left: usize,
        bottom: usize,
        right: usize,
        value: f64,
    ) -> Result<()> {
        let (top, bottom) = (top.min(bottom), top.max(bottom));
        let (left, right) = (left.min(right), left.max(right));
        self.check_row(top)?;
        self.check_row(bottom)?;
        self.check_column(left)?;
        self.check_column(right)?;
        for column in &mut self.columns[left..=right] {
            for cell in &mut column.values[top..=bottom] {
                *cell = value;
            }
        }
        self.recalculate_from_index(left);
        Ok(())
    }

    /// Paste a 2-D block of values with its top-left corner at
    /// (row, column). The whole block must fit; an overflowing paste is
    /// rejected without writing anything.
    pub fn set_values_from_array(
        &mut self,
        row: usize,
        column: usize,
        grid: &[Vec<f64>],
    ) -> Result<()> {
        let height = grid.len();
        let width = grid.iter().map(|r| r.len()).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return Ok(());
        }
        self.check_row(row)?;
        self.check_row(row + height - 1)?;
        self.check_column(column)?;
        self.check_column(column + width - 1)?;
        for (dr, grid_row) in grid.iter().enumerate() {
            for (dc, value) in grid_row.iter().enumerate() {
                self.columns[column + dc].values[row + dr] = *value;
            }
        }
        self.recalculate_from_index(column);
        Ok(())
    }

    /// Rename a column. The proposed name is normalized first and the
    /// normalized name is returned. Labels and stored expressions are
    /// untouched: expressions reference labels, not names.
    pub fn rename_column(&mut self, label: &str, proposed_name: &str) -> Result<String> {
        let name = Self::normalize_column_name(proposed_name);
        let column = self.column_mut(label)?;
        column.name = name.clone();
        Ok(name)
    }

    /// The display form of a calculated column's expression: stored label
    /// tokens are substituted with current names on the fly, without
    /// mutating the stored text. An empty stored expression is reported
    /// as no expression at all.
    pub fn get_column_expression(&self, label: &str) -> Option<String> {
        let column = self.column(label).ok()?;
        match &column.kind {
            ColumnKind::Calculated { expression, .. } if !expression.is_empty() => {
                Some(rename_variables(expression, &self.label_to_name()))
            }
            _ => None,
        }
    }

    /// Store a new expression for a calculated column, given in display
    /// form (name tokens). Name tokens are translated to labels for
    /// storage, then the column and everything to its right are
    /// recalculated. A non-calculated or unknown target is silently a
    /// no-op; returns whether the expression was applied.
    pub fn update_column_expression(&mut self, label: &str, display_expression: &str) -> bool {
        let Some(index) = self.column_index(label) else {
            return false;
        };
        if !self.columns[index].is_calculated() {
            return false;
        }
        let stored = rename_variables(display_expression, &self.name_to_label());
        if let ColumnKind::Calculated { expression, .. } = &mut self.columns[index].kind {
            *expression = stored;
        }
        self.recalculate_from_index(index);
        true
    }

    fn label_to_name(&self) -> HashMap<String, String> {
        self.columns
            .iter()
            .map(|c| (c.label.clone(), c.name.clone()))
            .collect()
    }

    pub(crate) fn name_to_label(&self) -> HashMap<String, String> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.label.clone()))
            .collect()
    }
}

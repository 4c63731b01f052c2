//! The recalculation cascade.
//!
//! Columns are recalculated in display order, left to right, in a single
//! pass. Each calculated column is evaluated against an environment built
//! from the columns strictly to its left that currently hold valid values.
//! An invalid dependency is simply absent from the environment, so the
//! dependent expression fails with an unknown name and the invalidity
//! propagates without any extra bookkeeping.

use std::collections::HashMap;

use columna_engine::{CompiledExpr, ExprError, Value, rename_variables};

use super::state::{Column, ColumnKind, DataTable};
use crate::error::{Result, TableError};

impl DataTable {
    /// Recalculate every calculated column, left to right.
    pub fn recalculate_all_columns(&mut self) {
        self.recalculate_from_index(0);
    }

    /// Recalculate the labeled column and every column to its right.
    pub fn recalculate_columns_from(&mut self, label: &str) -> Result<()> {
        let index = self
            .column_index(label)
            .ok_or_else(|| TableError::UnknownLabel(label.to_string()))?;
        self.recalculate_from_index(index);
        Ok(())
    }

    /// Recalculate one calculated column, optionally against a candidate
    /// expression instead of the stored one (the stored text is not
    /// replaced). The candidate arrives in display form, the same as
    /// `update_column_expression` input, and is translated to label
    /// tokens before evaluation. Returns whether evaluation succeeded;
    /// `false` for a data column or an unknown label.
    pub fn recalculate_column(&mut self, label: &str, expression: Option<&str>) -> bool {
        let Some(index) = self.column_index(label) else {
            return false;
        };
        let candidate = expression.map(|e| rename_variables(e, &self.name_to_label()));
        self.recalculate_index(index, candidate.as_deref())
    }

    pub(crate) fn recalculate_from_index(&mut self, start: usize) {
        for index in start..self.columns.len() {
            if self.columns[index].is_calculated() {
                self.recalculate_index(index, None);
            }
        }
    }

    /// Evaluate the column at `index` against everything valid to its
    /// left. On success the values are replaced and the column marked
    /// valid; on failure it is marked invalid and its previous values are
    /// kept so the caller still has something to display.
    fn recalculate_index(&mut self, index: usize, expression: Option<&str>) -> bool {
        let num_rows = self.num_rows;
        let (left, rest) = self.columns.split_at_mut(index);
        let target = &mut rest[0];
        let ColumnKind::Calculated {
            expression: stored,
            valid,
        } = &mut target.kind
        else {
            return false;
        };
        let source = expression.unwrap_or(stored.as_str());
        match evaluate_against(source, left, num_rows) {
            Ok(values) => {
                target.values = values;
                *valid = true;
                true
            }
            Err(_) => {
                *valid = false;
                false
            }
        }
    }
}

/// Compile and evaluate an expression against the valid columns in
/// `left`, keyed by label, and coerce the result to one value per row.
fn evaluate_against(
    expression: &str,
    left: &[Column],
    num_rows: usize,
) -> std::result::Result<Vec<f64>, ExprError> {
    let compiled = CompiledExpr::compile(expression)?;
    let env: HashMap<&str, &[f64]> = left
        .iter()
        .filter(|c| c.is_valid())
        .map(|c| (c.label(), c.values()))
        .collect();
    let value: Value = compiled.evaluate(&env)?;
    value.into_rows(num_rows)
}

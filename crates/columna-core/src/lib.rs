//! columna-core - UI-agnostic tabular data engine.
//!
//! A [`DataTable`] holds columns of f64 values keyed two ways: a
//! permanent label used inside expressions, and a user-facing display
//! name. Calculated columns derive their values from expressions over
//! columns to their left and are kept up to date by a left-to-right
//! recalculation pass after every relevant edit. CSV import/merge/export
//! and a serializable snapshot round out the model; rendering, undo, and
//! selection logic belong to the caller.

pub mod error;
pub mod storage;
pub mod table;

pub use error::{Result, TableError};
pub use storage::CsvFormat;
pub use table::{Column, ColumnKind, DataTable, TableState};

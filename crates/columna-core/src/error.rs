//! Error types for the table model.
//!
//! Only structural and I/O failures surface here. Expression failures are
//! deliberately absent: they are absorbed into per-column validity flags
//! during recalculation and polled by the caller.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV file is empty")]
    EmptyCsv,

    #[error("column index {index} out of range (table has {len} columns)")]
    ColumnIndexOutOfRange { index: usize, len: usize },

    #[error("row index {index} out of range (table has {len} rows)")]
    RowIndexOutOfRange { index: usize, len: usize },

    #[error("no column with label '{0}'")]
    UnknownLabel(String),
}

pub type Result<T> = std::result::Result<T, TableError>;

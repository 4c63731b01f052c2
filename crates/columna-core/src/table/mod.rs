//! The table model: storage, edits, recalculation, and I/O.

mod io;
mod ops;
mod recalc;
mod state;

pub use io::TableState;
pub use state::{Column, ColumnKind, DataTable};

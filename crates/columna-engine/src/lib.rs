//! columna-engine - sandboxed expression engine for columnar data.
//!
//! Compiles single arithmetic expressions over f64 scalars and per-row
//! series into a restricted AST of numbers, names, unary/binary arithmetic,
//! and allow-listed calls (nothing else parses), then evaluates them against
//! an explicit environment of named columns with numpy-style scalar/series
//! broadcasting.

pub mod builtins;
pub mod error;
pub mod expr;
pub mod value;

pub use builtins::{Func, constant};
pub use error::{ExprError, Result};
pub use expr::{CompiledExpr, rename_variables, variable_names};
pub use value::Value;

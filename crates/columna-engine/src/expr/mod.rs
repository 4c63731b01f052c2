//! Expression language: tokenizer, restricted parser, evaluator, and
//! variable-token translation.

mod eval;
mod names;
mod parse;
mod token;

pub use eval::CompiledExpr;
pub use names::{rename_variables, variable_names};
pub use parse::{BinOp, Expr, parse};

//! Error types for the expression engine.

use thiserror::Error;

/// Errors raised while compiling or evaluating an expression.
///
/// All of these are "soft" from the table's point of view: the table model
/// absorbs them into a per-column validity flag instead of propagating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error("unknown name '{0}'")]
    UnknownName(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{name}() takes {expected} argument(s), got {got}")]
    WrongArity {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("series length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("gradient() requires a series of at least two values")]
    GradientDomain,
}

pub type Result<T> = std::result::Result<T, ExprError>;

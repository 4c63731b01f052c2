//! Value model for expression evaluation.
//!
//! Every expression evaluates to either a scalar or a per-row series.
//! Operators and elementwise functions broadcast scalars across series,
//! so `x * 2` and `2 * x` both produce a series when `x` is a column.

use crate::error::{ExprError, Result};

/// Result of evaluating an expression (or a subexpression).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Series(Vec<f64>),
}

impl Value {
    /// Apply a unary function elementwise.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Value {
        match self {
            Value::Scalar(x) => Value::Scalar(f(x)),
            Value::Series(mut xs) => {
                for x in xs.iter_mut() {
                    *x = f(*x);
                }
                Value::Series(xs)
            }
        }
    }

    /// Combine two values elementwise, broadcasting scalars.
    ///
    /// Two series must have equal length; in practice both come from the
    /// same table so they always do, but a mismatch is still an error
    /// rather than a panic.
    pub fn zip_with(self, other: Value, f: impl Fn(f64, f64) -> f64) -> Result<Value> {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(f(a, b))),
            (Value::Series(mut xs), Value::Scalar(b)) => {
                for x in xs.iter_mut() {
                    *x = f(*x, b);
                }
                Ok(Value::Series(xs))
            }
            (Value::Scalar(a), Value::Series(mut ys)) => {
                for y in ys.iter_mut() {
                    *y = f(a, *y);
                }
                Ok(Value::Series(ys))
            }
            (Value::Series(mut xs), Value::Series(ys)) => {
                if xs.len() != ys.len() {
                    return Err(ExprError::LengthMismatch {
                        left: xs.len(),
                        right: ys.len(),
                    });
                }
                for (x, y) in xs.iter_mut().zip(ys.iter()) {
                    *x = f(*x, *y);
                }
                Ok(Value::Series(xs))
            }
        }
    }

    /// Materialize as a per-row vector of length `rows`, broadcasting a
    /// scalar across every row. A series must already have that length.
    pub fn into_rows(self, rows: usize) -> Result<Vec<f64>> {
        match self {
            Value::Scalar(x) => Ok(vec![x; rows]),
            Value::Series(xs) => {
                if xs.len() != rows {
                    return Err(ExprError::LengthMismatch {
                        left: xs.len(),
                        right: rows,
                    });
                }
                Ok(xs)
            }
        }
    }
}

//! Expression compilation and evaluation.
//!
//! A [`CompiledExpr`] is a parsed, validated AST plus the list of variable
//! names it references. Evaluation resolves names against an explicit
//! environment (column label -> value slice) and falls back to the builtin
//! constants; nothing else is reachable. Division and modulo between two
//! scalars raise on an exact-zero denominator (Python semantics); as soon
//! as a series is involved the operation follows IEEE like numpy.

use std::collections::HashMap;

use crate::builtins::constant;
use crate::error::{ExprError, Result};
use crate::value::Value;

use super::parse::{BinOp, Expr, parse};

/// A parsed expression ready for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpr {
    ast: Expr,
    /// Variable names referenced, ordered by first occurrence.
    variables: Vec<String>,
}

impl CompiledExpr {
    /// Parse and validate an expression string.
    pub fn compile(input: &str) -> Result<CompiledExpr> {
        let ast = parse(input)?;
        let mut variables = Vec::new();
        collect_names(&ast, &mut variables);
        Ok(CompiledExpr { ast, variables })
    }

    /// Variable names referenced by the expression, in first-use order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Evaluate against an environment of named value columns.
    pub fn evaluate(&self, env: &HashMap<&str, &[f64]>) -> Result<Value> {
        eval_expr(&self.ast, env)
    }
}

fn collect_names(e: &Expr, out: &mut Vec<String>) {
    match e {
        Expr::Name(name) => {
            if !out.iter().any(|n| n == name) {
                out.push(name.clone());
            }
        }
        Expr::Number(_) => {}
        Expr::Neg(a) => collect_names(a, out),
        Expr::Binary(_, a, b) => {
            collect_names(a, out);
            collect_names(b, out);
        }
        Expr::Call(_, args) => {
            for a in args {
                collect_names(a, out);
            }
        }
    }
}

fn check_scalar_zero_division(lhs: &Value, rhs: &Value) -> Result<()> {
    if let (Value::Scalar(_), Value::Scalar(d)) = (lhs, rhs) {
        if *d == 0.0 {
            return Err(ExprError::DivisionByZero);
        }
    }
    Ok(())
}

fn eval_expr(e: &Expr, env: &HashMap<&str, &[f64]>) -> Result<Value> {
    match e {
        Expr::Number(n) => Ok(Value::Scalar(*n)),
        Expr::Name(name) => {
            // Environment first: a column named like a constant shadows it.
            if let Some(values) = env.get(name.as_str()) {
                Ok(Value::Series(values.to_vec()))
            } else if let Some(c) = constant(name) {
                Ok(Value::Scalar(c))
            } else {
                Err(ExprError::UnknownName(name.clone()))
            }
        }
        Expr::Neg(a) => Ok(eval_expr(a, env)?.map(|x| -x)),
        Expr::Binary(op, a, b) => {
            let lhs = eval_expr(a, env)?;
            let rhs = eval_expr(b, env)?;
            match op {
                BinOp::Add => lhs.zip_with(rhs, |x, y| x + y),
                BinOp::Sub => lhs.zip_with(rhs, |x, y| x - y),
                BinOp::Mul => lhs.zip_with(rhs, |x, y| x * y),
                BinOp::Div => {
                    check_scalar_zero_division(&lhs, &rhs)?;
                    lhs.zip_with(rhs, |x, y| x / y)
                }
                BinOp::Mod => {
                    check_scalar_zero_division(&lhs, &rhs)?;
                    lhs.zip_with(rhs, |x, y| x % y)
                }
                BinOp::Pow => lhs.zip_with(rhs, f64::powf),
            }
        }
        Expr::Call(func, args) => {
            let mut evaluated = Vec::with_capacity(args.len());
            for a in args {
                evaluated.push(eval_expr(a, env)?);
            }
            func.apply(evaluated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &[(&'a str, &'a [f64])]) -> HashMap<&'a str, &'a [f64]> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_scalar_arithmetic() {
        let e = CompiledExpr::compile("1 + 2 * 3 - 4 / 8").unwrap();
        assert_eq!(e.evaluate(&env(&[])).unwrap(), Value::Scalar(6.5));
    }

    #[test]
    fn test_series_broadcast() {
        let x: &[f64] = &[0.0, 1.0, 2.0, 3.0, 4.0];
        let e = CompiledExpr::compile("x ** 2").unwrap();
        assert_eq!(
            e.evaluate(&env(&[("x", x)])).unwrap(),
            Value::Series(vec![0.0, 1.0, 4.0, 9.0, 16.0])
        );
    }

    #[test]
    fn test_unknown_name() {
        let e = CompiledExpr::compile("1 * foo").unwrap();
        assert_eq!(
            e.evaluate(&env(&[])).unwrap_err(),
            ExprError::UnknownName("foo".into())
        );
    }

    #[test]
    fn test_constants_shadowed_by_environment() {
        let e = CompiledExpr::compile("e").unwrap();
        assert_eq!(
            e.evaluate(&env(&[])).unwrap(),
            Value::Scalar(std::f64::consts::E)
        );

        let col: &[f64] = &[1.0, 2.0];
        assert_eq!(
            e.evaluate(&env(&[("e", col)])).unwrap(),
            Value::Series(vec![1.0, 2.0])
        );
    }

    #[test]
    fn test_scalar_division_by_zero_raises() {
        let e = CompiledExpr::compile("1 / 0").unwrap();
        assert_eq!(e.evaluate(&env(&[])).unwrap_err(), ExprError::DivisionByZero);

        let e = CompiledExpr::compile("1 % 0").unwrap();
        assert_eq!(e.evaluate(&env(&[])).unwrap_err(), ExprError::DivisionByZero);
    }

    #[test]
    fn test_series_division_by_zero_is_ieee() {
        let x: &[f64] = &[1.0, -1.0];
        let e = CompiledExpr::compile("x / 0").unwrap();
        match e.evaluate(&env(&[("x", x)])).unwrap() {
            Value::Series(v) => {
                assert_eq!(v[0], f64::INFINITY);
                assert_eq!(v[1], f64::NEG_INFINITY);
            }
            other => panic!("expected series, got {other:?}"),
        }
    }

    #[test]
    fn test_function_over_environment_column() {
        let x: &[f64] = &[0.0, std::f64::consts::FRAC_PI_2];
        let e = CompiledExpr::compile("sin(x)").unwrap();
        match e.evaluate(&env(&[("x", x)])).unwrap() {
            Value::Series(v) => {
                assert!(v[0].abs() < 1e-12);
                assert!((v[1] - 1.0).abs() < 1e-12);
            }
            other => panic!("expected series, got {other:?}"),
        }
    }

    #[test]
    fn test_variables_in_first_use_order() {
        let e = CompiledExpr::compile("b + a * b - sin(c)").unwrap();
        assert_eq!(e.variables(), ["b", "a", "c"]);
    }

    #[test]
    fn test_evaluation_is_pure() {
        let x: &[f64] = &[1.0, 2.0];
        let e = CompiledExpr::compile("x + 1").unwrap();
        let first = e.evaluate(&env(&[("x", x)])).unwrap();
        let second = e.evaluate(&env(&[("x", x)])).unwrap();
        assert_eq!(first, second);
    }
}

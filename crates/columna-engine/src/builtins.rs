//! Allow-listed builtin functions and constants.
//!
//! This is the entire surface an expression can reach besides its column
//! environment: a fixed set of math functions and numeric constants. There
//! is no way to name anything else, which is what makes evaluation a
//! sandbox rather than a scripting engine.

use crate::error::{ExprError, Result};
use crate::value::Value;

/// Builtin functions callable from expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Func {
    Sin,
    Cos,
    Tan,
    Arcsin,
    Arccos,
    Arctan,
    Sinh,
    Cosh,
    Tanh,
    Sqrt,
    Abs,
    Exp,
    Log,
    Log10,
    Gradient,
}

impl Func {
    /// Look up a function by its expression-language name.
    pub fn from_name(name: &str) -> Option<Func> {
        Some(match name {
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tan" => Func::Tan,
            "arcsin" => Func::Arcsin,
            "arccos" => Func::Arccos,
            "arctan" => Func::Arctan,
            "sinh" => Func::Sinh,
            "cosh" => Func::Cosh,
            "tanh" => Func::Tanh,
            "sqrt" => Func::Sqrt,
            "abs" => Func::Abs,
            "exp" => Func::Exp,
            "log" => Func::Log,
            "log10" => Func::Log10,
            "gradient" => Func::Gradient,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tan => "tan",
            Func::Arcsin => "arcsin",
            Func::Arccos => "arccos",
            Func::Arctan => "arctan",
            Func::Sinh => "sinh",
            Func::Cosh => "cosh",
            Func::Tanh => "tanh",
            Func::Sqrt => "sqrt",
            Func::Abs => "abs",
            Func::Exp => "exp",
            Func::Log => "log",
            Func::Log10 => "log10",
            Func::Gradient => "gradient",
        }
    }

    /// Number of arguments the function takes. All current builtins are
    /// unary; arity still lives here so the parser stays generic.
    pub fn arity(&self) -> usize {
        1
    }

    /// Apply the function to already-evaluated arguments.
    pub fn apply(&self, args: Vec<Value>) -> Result<Value> {
        let [arg]: [Value; 1] = args.try_into().map_err(|args: Vec<Value>| {
            ExprError::WrongArity {
                name: self.name(),
                expected: self.arity(),
                got: args.len(),
            }
        })?;
        match self {
            Func::Sin => Ok(arg.map(f64::sin)),
            Func::Cos => Ok(arg.map(f64::cos)),
            Func::Tan => Ok(arg.map(f64::tan)),
            Func::Arcsin => Ok(arg.map(f64::asin)),
            Func::Arccos => Ok(arg.map(f64::acos)),
            Func::Arctan => Ok(arg.map(f64::atan)),
            Func::Sinh => Ok(arg.map(f64::sinh)),
            Func::Cosh => Ok(arg.map(f64::cosh)),
            Func::Tanh => Ok(arg.map(f64::tanh)),
            Func::Sqrt => Ok(arg.map(f64::sqrt)),
            Func::Abs => Ok(arg.map(f64::abs)),
            Func::Exp => Ok(arg.map(f64::exp)),
            Func::Log => Ok(arg.map(f64::ln)),
            Func::Log10 => Ok(arg.map(f64::log10)),
            Func::Gradient => gradient(arg),
        }
    }
}

/// Numeric constants available in expressions. Column names shadow these,
/// so a column called `e` hides Euler's number rather than clashing.
pub fn constant(name: &str) -> Option<f64> {
    Some(match name {
        "pi" => std::f64::consts::PI,
        "e" => std::f64::consts::E,
        "tau" => std::f64::consts::TAU,
        "inf" => f64::INFINITY,
        "nan" => f64::NAN,
        _ => return None,
    })
}

/// Second-order central differences with one-sided differences at the
/// boundaries. Needs at least two samples; a scalar has no gradient.
fn gradient(arg: Value) -> Result<Value> {
    let ys = match arg {
        Value::Series(ys) if ys.len() >= 2 => ys,
        _ => return Err(ExprError::GradientDomain),
    };
    let n = ys.len();
    let mut out = Vec::with_capacity(n);
    out.push(ys[1] - ys[0]);
    for i in 1..n - 1 {
        out.push((ys[i + 1] - ys[i - 1]) / 2.0);
    }
    out.push(ys[n - 1] - ys[n - 2]);
    Ok(Value::Series(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elementwise_function_over_series() {
        let out = Func::Sqrt
            .apply(vec![Value::Series(vec![1.0, 4.0, 9.0])])
            .unwrap();
        assert_eq!(out, Value::Series(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_function_arity_is_checked() {
        let err = Func::Sin
            .apply(vec![Value::Scalar(1.0), Value::Scalar(2.0)])
            .unwrap_err();
        assert_eq!(
            err,
            ExprError::WrongArity {
                name: "sin",
                expected: 1,
                got: 2
            }
        );

        assert_eq!(
            Func::Sin.apply(vec![]).unwrap_err(),
            ExprError::WrongArity {
                name: "sin",
                expected: 1,
                got: 0
            }
        );
    }

    #[test]
    fn test_gradient_central_differences() {
        // y = x^2 sampled at 0..=4: exact central differences are 2x at
        // interior points and one-sided at the ends.
        let out = Func::Gradient
            .apply(vec![Value::Series(vec![0.0, 1.0, 4.0, 9.0, 16.0])])
            .unwrap();
        assert_eq!(out, Value::Series(vec![1.0, 2.0, 4.0, 6.0, 7.0]));
    }

    #[test]
    fn test_gradient_rejects_scalars_and_short_series() {
        assert_eq!(
            Func::Gradient.apply(vec![Value::Scalar(1.0)]).unwrap_err(),
            ExprError::GradientDomain
        );
        assert_eq!(
            Func::Gradient
                .apply(vec![Value::Series(vec![1.0])])
                .unwrap_err(),
            ExprError::GradientDomain
        );
    }

    #[test]
    fn test_constants() {
        assert_eq!(constant("pi"), Some(std::f64::consts::PI));
        assert_eq!(constant("tau"), Some(std::f64::consts::TAU));
        assert!(constant("nan").unwrap().is_nan());
        assert_eq!(constant("phi"), None);
    }
}

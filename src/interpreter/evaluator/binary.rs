use std::{cmp::Ordering, rc::Rc};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::EvalResult,
            utils::{check_finite, operand_error},
        },
        lexer::Position,
        operator::NativeOp,
        value::core::Value,
    },
};

/// Evaluates a built-in infix operator.
///
/// Arithmetic works on numbers and must produce a finite result; division
/// and remainder by zero are domain errors. `+` also concatenates two
/// strings. Ordering works on two numbers or two strings, equality on any
/// pair of values, and `&&`/`||` on two booleans.
///
/// # Parameters
/// - `op`: The built-in to apply.
/// - `symbol`: The symbol it was applied through, for error messages.
/// - `left`, `right`: The operands, already evaluated.
/// - `position`: Position of the operator.
///
/// # Returns
/// The computed `Value`.
///
/// # Example
/// ```
/// use opera::interpreter::{
///     evaluator::binary::eval_native_binary,
///     lexer::Position,
///     operator::NativeOp,
///     value::core::Value,
/// };
///
/// let at = Position::default();
/// let sum = eval_native_binary(NativeOp::Add, "+", &Value::from("ab"), &Value::from("c"), at);
/// assert_eq!(sum.unwrap(), Value::from("abc"));
/// assert!(eval_native_binary(NativeOp::Div, "/", &1.0.into(), &0.0.into(), at).is_err());
/// ```
pub fn eval_native_binary(op: NativeOp,
                          symbol: &str,
                          left: &Value,
                          right: &Value,
                          position: Position)
                          -> EvalResult<Value> {
    use Value::{Bool, Number, Str};

    let describe = |a: f64, b: f64| format!("{a} {symbol} {b}");

    match (op, left, right) {
        (NativeOp::Equal, a, b) => Ok(Bool(a == b)),
        (NativeOp::NotEqual, a, b) => Ok(Bool(a != b)),
        (NativeOp::And, Bool(a), Bool(b)) => Ok(Bool(*a && *b)),
        (NativeOp::Or, Bool(a), Bool(b)) => Ok(Bool(*a || *b)),
        (NativeOp::Less | NativeOp::LessEqual | NativeOp::Greater | NativeOp::GreaterEqual,
         a,
         b) => {
            let ordering = compare(a, b).ok_or_else(|| {
                                            operand_error(symbol, &[a.clone(), b.clone()], position)
                                        })?;
            Ok(Bool(match op {
                        NativeOp::Less => ordering == Ordering::Less,
                        NativeOp::LessEqual => ordering != Ordering::Greater,
                        NativeOp::Greater => ordering == Ordering::Greater,
                        _ => ordering != Ordering::Less,
                    }))
        },
        (NativeOp::Add, Str(a), Str(b)) => Ok(Str(Rc::from(format!("{a}{b}")))),
        (NativeOp::Add, Number(a), Number(b)) => check_finite(a + b, &describe(*a, *b), position),
        (NativeOp::Sub, Number(a), Number(b)) => check_finite(a - b, &describe(*a, *b), position),
        (NativeOp::Mul, Number(a), Number(b)) => check_finite(a * b, &describe(*a, *b), position),
        (NativeOp::Div | NativeOp::Rem, Number(_), Number(b)) if *b == 0.0 => {
            Err(RuntimeError::Domain { details: "division by zero".to_string(),
                                       position })
        },
        (NativeOp::Div, Number(a), Number(b)) => check_finite(a / b, &describe(*a, *b), position),
        (NativeOp::Rem, Number(a), Number(b)) => check_finite(a % b, &describe(*a, *b), position),
        (NativeOp::Pow, Number(a), Number(b)) => {
            check_finite(a.powf(*b), &describe(*a, *b), position)
        },
        _ => Err(operand_error(symbol, &[left.clone(), right.clone()], position)),
    }
}

/// Orders two numbers or two strings. Other pairs are unordered.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(op: NativeOp, left: Value, right: Value) -> EvalResult<Value> {
        eval_native_binary(op, "op", &left, &right, Position::default())
    }

    #[test]
    fn arithmetic() {
        assert_eq!(apply(NativeOp::Sub, 2.0.into(), 5.0.into()).unwrap(), Value::Number(-3.0));
        assert_eq!(apply(NativeOp::Rem, 7.0.into(), 3.0.into()).unwrap(), Value::Number(1.0));
        assert_eq!(apply(NativeOp::Pow, 2.0.into(), 10.0.into()).unwrap(),
                   Value::Number(1024.0));
    }

    #[test]
    fn domain_errors() {
        for op in [NativeOp::Div, NativeOp::Rem] {
            assert!(matches!(apply(op, 1.0.into(), 0.0.into()),
                             Err(RuntimeError::Domain { .. })));
        }
        assert!(matches!(apply(NativeOp::Mul, 1e308.into(), 10.0.into()),
                         Err(RuntimeError::Domain { .. })));
        assert!(matches!(apply(NativeOp::Pow, (-8.0).into(), (1.0 / 3.0).into()),
                         Err(RuntimeError::Domain { .. })));
    }

    #[test]
    fn comparisons() {
        assert_eq!(apply(NativeOp::LessEqual, 2.0.into(), 2.0.into()).unwrap(), Value::Bool(true));
        assert_eq!(apply(NativeOp::Greater, "b".into(), "a".into()).unwrap(), Value::Bool(true));
        assert_eq!(apply(NativeOp::Equal, "1".into(), 1.0.into()).unwrap(), Value::Bool(false));
        assert_eq!(apply(NativeOp::NotEqual, Value::Unit, Value::Unit).unwrap(),
                   Value::Bool(false));
        assert!(matches!(apply(NativeOp::Less, "a".into(), 1.0.into()),
                         Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn booleans_and_strings() {
        assert_eq!(apply(NativeOp::And, true.into(), false.into()).unwrap(), Value::Bool(false));
        assert_eq!(apply(NativeOp::Or, true.into(), false.into()).unwrap(), Value::Bool(true));
        assert!(matches!(apply(NativeOp::And, true.into(), 1.0.into()),
                         Err(RuntimeError::TypeError { .. })));
        assert!(matches!(apply(NativeOp::Add, "a".into(), 1.0.into()),
                         Err(RuntimeError::TypeError { .. })));
    }
}

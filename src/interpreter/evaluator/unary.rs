use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{core::EvalResult, utils::operand_error},
        lexer::Position,
        operator::NativeOp,
        value::core::Value,
    },
    util::num::factorial,
};

/// Evaluates a built-in prefix or postfix operator.
///
/// Supported operators:
/// - `Negate`: numeric negation.
/// - `Not`: boolean negation.
/// - `Factorial`: `n!` for whole `n` from 0 to 170.
///
/// # Parameters
/// - `op`: The built-in to apply.
/// - `symbol`: The symbol it was applied through, for error messages.
/// - `value`: The operand.
/// - `position`: Position of the operator.
///
/// # Returns
/// The computed `Value`.
///
/// # Example
/// ```
/// use opera::interpreter::{
///     evaluator::unary::eval_native_unary,
///     lexer::Position,
///     operator::NativeOp,
///     value::core::Value,
/// };
///
/// let v = eval_native_unary(NativeOp::Factorial, "!", &Value::Number(4.0), Position::default());
/// assert_eq!(v.unwrap(), Value::Number(24.0));
///
/// let v = eval_native_unary(NativeOp::Not, "!", &Value::Bool(false), Position::default());
/// assert_eq!(v.unwrap(), Value::Bool(true));
/// ```
pub fn eval_native_unary(op: NativeOp,
                         symbol: &str,
                         value: &Value,
                         position: Position)
                         -> EvalResult<Value> {
    match (op, value) {
        (NativeOp::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
        (NativeOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (NativeOp::Factorial, Value::Number(n)) => {
            factorial(*n).map(Value::Number).ok_or_else(|| {
                RuntimeError::Domain { details: format!("factorial of {n} is undefined"),
                                       position }
            })
        },
        _ => Err(operand_error(symbol, std::slice::from_ref(value), position)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(op: NativeOp, value: Value) -> EvalResult<Value> {
        eval_native_unary(op, "op", &value, Position::default())
    }

    #[test]
    fn negation_and_not() {
        assert_eq!(apply(NativeOp::Negate, Value::Number(2.0)).unwrap(), Value::Number(-2.0));
        assert_eq!(apply(NativeOp::Not, Value::Bool(true)).unwrap(), Value::Bool(false));
        assert!(matches!(apply(NativeOp::Negate, Value::Bool(true)),
                         Err(RuntimeError::TypeError { .. })));
        assert!(matches!(apply(NativeOp::Not, Value::Number(0.0)),
                         Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn factorial_domain() {
        assert_eq!(apply(NativeOp::Factorial, Value::Number(0.0)).unwrap(), Value::Number(1.0));
        for bad in [-1.0, 2.5, 171.0] {
            assert!(matches!(apply(NativeOp::Factorial, Value::Number(bad)),
                             Err(RuntimeError::Domain { .. })));
        }
    }
}

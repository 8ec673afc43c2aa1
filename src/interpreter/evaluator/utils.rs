use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, lexer::Position, value::core::Value},
};

/// Ensures that a call passes exactly as many arguments as expected.
///
/// # Example
/// ```
/// use opera::interpreter::{evaluator::utils::check_arity, lexer::Position};
///
/// assert!(check_arity("f", 2, 2, Position::default()).is_ok());
/// assert!(check_arity("f", 2, 3, Position::default()).is_err());
/// ```
pub fn check_arity(callee: &str,
                   expected: usize,
                   found: usize,
                   position: Position)
                   -> EvalResult<()> {
    if expected == found {
        return Ok(());
    }
    Err(RuntimeError::Arity { callee: callee.to_string(),
                              expected,
                              found,
                              position })
}

/// Unwraps a boolean value.
pub fn expect_bool(value: &Value, context: &str, position: Position) -> EvalResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => {
            let details = format!("{context} must be a bool, found {}", other.type_name());
            Err(RuntimeError::TypeError { details, position })
        },
    }
}

/// Rejects infinite and NaN results of arithmetic.
pub fn check_finite(result: f64, operation: &str, position: Position) -> EvalResult<Value> {
    if result.is_finite() {
        return Ok(Value::Number(result));
    }
    Err(RuntimeError::Domain { details: format!("{operation} has no finite result"),
                               position })
}

/// Builds the type error for an operator applied to operands it does not
/// accept.
pub fn operand_error(symbol: &str, operands: &[Value], position: Position) -> RuntimeError {
    let kinds = operands.iter()
                        .map(Value::type_name)
                        .collect::<Vec<_>>()
                        .join(" and ");
    RuntimeError::TypeError { details: format!("operator '{symbol}' cannot be applied to {kinds}"),
                              position }
}

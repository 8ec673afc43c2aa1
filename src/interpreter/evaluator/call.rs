use std::rc::Rc;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::eval_native_binary,
            core::{EvalResult, Interpreter},
            environment::Scope,
            unary::eval_native_unary,
            utils::{check_arity, operand_error},
        },
        lexer::Position,
        operator::{Fixity, Implementation, NativeOp},
        value::{
            closure::Closure,
            core::{Callable, Value},
        },
    },
};

/// Maximum number of nested closure calls.
pub const MAX_CALL_DEPTH: usize = 1000;

impl Interpreter {
    /// Applies the operator `symbol` of the given fixity to evaluated operands.
    ///
    /// The operator is looked up in the live operator table, so a body
    /// installed for a symbol affects every later application of it.
    ///
    /// # Errors
    /// `UndefinedOperator` if the table has no entry for the symbol and fixity
    /// or only a declared signature without a body, plus whatever the
    /// implementation raises.
    pub fn apply_operator(&mut self,
                          symbol: &str,
                          fixity: Fixity,
                          operands: Vec<Value>,
                          position: Position)
                          -> EvalResult<Value> {
        let undefined = |detail| RuntimeError::UndefinedOperator { symbol: symbol.to_string(),
                                                                   fixity,
                                                                   detail,
                                                                   position };

        let implementation = self.operators
                                 .lookup(symbol, fixity)
                                 .map(|entry| entry.implementation.clone())
                                 .ok_or_else(|| undefined(""))?;

        match implementation {
            Implementation::Native(op) => eval_native(op, symbol, &operands, position),
            Implementation::Closure(closure) => self.call_closure(&closure, operands, position),
            Implementation::Declared => {
                Err(undefined(" (declared but its body has not been evaluated)"))
            },
        }
    }

    /// Calls a function or operator value with evaluated arguments.
    ///
    /// # Errors
    /// `Arity` if the argument count is wrong, plus whatever the callee
    /// raises.
    pub fn call_value(&mut self,
                      callee: &Callable,
                      arguments: Vec<Value>,
                      position: Position)
                      -> EvalResult<Value> {
        check_arity(&callee.describe(), callee.arity(), arguments.len(), position)?;
        match callee {
            Callable::Native { def, op } => eval_native(*op, &def.symbol, &arguments, position),
            Callable::Closure(closure) => self.call_closure(closure, arguments, position),
        }
    }

    /// Runs a closure body in a fresh scope nested in its captured scope,
    /// with each parameter bound to the matching argument.
    ///
    /// # Errors
    /// - `Arity` if the argument count is wrong.
    /// - `RecursionLimit` if more than [`MAX_CALL_DEPTH`] calls are active.
    pub fn call_closure(&mut self,
                        closure: &Rc<Closure>,
                        arguments: Vec<Value>,
                        position: Position)
                        -> EvalResult<Value> {
        check_arity(&closure.describe(), closure.params.len(), arguments.len(), position)?;
        if self.depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::RecursionLimit { limit: MAX_CALL_DEPTH,
                                                      position });
        }

        let scope = Scope::child(&closure.env);
        for (param, argument) in closure.params.iter().zip(arguments) {
            scope.define(param, argument);
        }

        self.depth += 1;
        let result = self.eval(&closure.body, &scope);
        self.depth -= 1;
        result
    }
}

/// Runs a built-in with the operand count its fixity implies.
fn eval_native(op: NativeOp,
               symbol: &str,
               operands: &[Value],
               position: Position)
               -> EvalResult<Value> {
    match operands {
        [value] => eval_native_unary(op, symbol, value, position),
        [left, right] => eval_native_binary(op, symbol, left, right, position),
        _ => Err(operand_error(symbol, operands, position)),
    }
}

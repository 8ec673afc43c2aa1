use std::rc::Rc;

use tracing::trace;

use crate::{
    ast::Expr,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            environment::{Env, Scope},
            utils::{check_arity, expect_bool},
        },
        lexer::Position,
        operator::{Fixity, Implementation, OperatorConflict, OperatorDef, OperatorTable},
        value::{
            closure::Closure,
            core::{Callable, Value},
        },
    },
    util::{STACK_GROW_SIZE, STACK_RED_ZONE},
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// A tree-walking evaluator.
///
/// Holds the interpreter's own operator table, which is extended by merging
/// the signatures a parser reports and by evaluating operator declarations,
/// and the global scope that top-level expressions run in.
///
/// ## Usage
///
/// An `Interpreter` is created once per session and reused for every parsed
/// program, so variables and operators defined by earlier programs stay
/// visible to later ones.
#[derive(Debug)]
pub struct Interpreter {
    pub(super) operators: OperatorTable,
    pub(super) globals:   Env,
    pub(super) depth:     usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter that knows the built-in operators and has an
    /// empty global scope.
    #[must_use]
    pub fn new() -> Self {
        Self { operators: OperatorTable::builtin(),
               globals:   Scope::global(),
               depth:     0, }
    }

    /// Creates an interpreter and registers the signatures in `delta`.
    ///
    /// # Errors
    /// Returns the first signature the operator table refuses.
    pub fn with_operators(delta: &[OperatorDef]) -> Result<Self, OperatorConflict> {
        let mut interpreter = Self::new();
        interpreter.add_operators(delta)?;
        Ok(interpreter)
    }

    /// Registers operator signatures reported by a parser.
    ///
    /// New signatures are known but have no implementation until their
    /// declaration is evaluated; redeclared ones keep their implementation.
    ///
    /// # Errors
    /// Returns the first signature the operator table refuses. Earlier
    /// signatures stay registered.
    pub fn add_operators(&mut self, delta: &[OperatorDef]) -> Result<(), OperatorConflict> {
        self.operators.merge(delta)
    }

    /// The live operator table.
    #[must_use]
    pub const fn operators(&self) -> &OperatorTable {
        &self.operators
    }

    /// The global scope.
    #[must_use]
    pub const fn globals(&self) -> &Env {
        &self.globals
    }

    /// Evaluates a top-level expression in the global scope.
    ///
    /// # Example
    /// ```
    /// use opera::interpreter::{
    ///     evaluator::core::Interpreter, lexer::lex, parser::core::Parser, value::core::Value,
    /// };
    ///
    /// let parsed = Parser::new().parse(&lex("2 - 3 - 4").unwrap()).unwrap();
    /// let mut interpreter = Interpreter::new();
    /// assert_eq!(interpreter.evaluate(&parsed.exprs[0]).unwrap(), Value::Number(-5.0));
    /// ```
    pub fn evaluate(&mut self, expr: &Expr) -> EvalResult<Value> {
        trace!(%expr, "evaluating");
        let globals = Rc::clone(&self.globals);
        self.eval(expr, &globals)
    }

    /// Evaluates top-level expressions in order.
    ///
    /// # Returns
    /// The value of the last expression, or `None` if there were none.
    pub fn evaluate_all(&mut self, exprs: &[Expr]) -> EvalResult<Option<Value>> {
        let mut last = None;
        for expr in exprs {
            last = Some(self.evaluate(expr)?);
        }
        Ok(last)
    }

    /// Evaluates an expression in the given scope.
    ///
    /// The evaluator dispatches on the expression variant. Operands and
    /// arguments are evaluated left to right, and effects committed before an
    /// error are kept.
    ///
    /// # Parameters
    /// - `expr`: Expression to evaluate.
    /// - `env`: The innermost scope.
    ///
    /// # Returns
    /// The resulting `Value`; forms that produce nothing yield `Value::Unit`.
    pub fn eval(&mut self, expr: &Expr, env: &Env) -> EvalResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(expr, env))
    }

    fn eval_inner(&mut self, expr: &Expr, env: &Env) -> EvalResult<Value> {
        match expr {
            Expr::Literal { value, .. } => Ok(value.clone()),
            Expr::Identifier { name, position } => {
                env.get(name)
                   .ok_or_else(|| RuntimeError::UnboundName { name:     name.clone(),
                                                              position: *position, })
            },
            Expr::Unary { op,
                          fixity,
                          operand,
                          position, } => {
                let value = self.eval(operand, env)?;
                self.apply_operator(op, *fixity, vec![value], *position)
            },
            Expr::Binary { op,
                           left,
                           right,
                           position, } => {
                let left = self.eval(left, env)?;
                let right = self.eval(right, env)?;
                self.apply_operator(op, Fixity::Infix, vec![left, right], *position)
            },
            Expr::Call { callee,
                         arguments,
                         position, } => self.eval_call(callee, arguments, *position, env),
            Expr::Assignment { target,
                               value,
                               declare,
                               .. } => {
                let value = self.eval(value, env)?;
                if *declare {
                    env.define(target, value.clone());
                } else {
                    env.assign_or_define(target, value.clone());
                }
                Ok(value)
            },
            Expr::Block { body, .. } => {
                let scope = Scope::child(env);
                let mut last = Value::Unit;
                for statement in body {
                    last = self.eval(statement, &scope)?;
                }
                Ok(last)
            },
            Expr::Conditional { condition,
                                then_branch,
                                else_branch,
                                position, } => {
                let condition = self.eval(condition, env)?;
                if expect_bool(&condition, "condition", *position)? {
                    self.eval(then_branch, env)
                } else if let Some(else_branch) = else_branch {
                    self.eval(else_branch, env)
                } else {
                    Ok(Value::Unit)
                }
            },
            Expr::OperatorDecl { def,
                                 params,
                                 body,
                                 position, } => {
                let closure = Closure { operator: Some(def.clone()),
                                        params:   params.clone(),
                                        body:     Rc::clone(body),
                                        env:      Rc::clone(env), };
                self.operators
                    .install(Rc::new(closure))
                    .map_err(|conflict| RuntimeError::OperatorConflict { conflict,
                                                                         position: *position, })?;
                Ok(Value::Unit)
            },
            Expr::Lambda { params, body, .. } => {
                let closure = Closure { operator: None,
                                        params:   params.clone(),
                                        body:     Rc::clone(body),
                                        env:      Rc::clone(env), };
                Ok(Value::Callable(Callable::Closure(Rc::new(closure))))
            },
            Expr::OperatorRef { symbol,
                                fixity,
                                position, } => self.operator_value(symbol, *fixity, *position),
        }
    }

    /// Evaluates a call: the callee first, then the arity check, then the
    /// arguments from left to right.
    fn eval_call(&mut self,
                 callee: &Expr,
                 arguments: &[Expr],
                 position: Position,
                 env: &Env)
                 -> EvalResult<Value> {
        let callee = match self.eval(callee, env)? {
            Value::Callable(callable) => callable,
            other => {
                let details = format!("a {} is not callable", other.type_name());
                return Err(RuntimeError::TypeError { details,
                                                     position: callee.position() });
            },
        };
        check_arity(&callee.describe(), callee.arity(), arguments.len(), position)?;

        let values = arguments.iter()
                              .map(|argument| self.eval(argument, env))
                              .collect::<EvalResult<Vec<_>>>()?;
        self.call_value(&callee, values, position)
    }

    /// Turns an operator table entry into a first-class value.
    fn operator_value(&self,
                      symbol: &str,
                      fixity: Fixity,
                      position: Position)
                      -> EvalResult<Value> {
        let entry = self.operators.lookup(symbol, fixity);
        match entry.map(|entry| (&entry.def, &entry.implementation)) {
            Some((def, Implementation::Native(op))) => {
                Ok(Value::Callable(Callable::Native { def: def.clone(),
                                                      op:  *op, }))
            },
            Some((_, Implementation::Closure(closure))) => {
                Ok(Value::Callable(Callable::Closure(Rc::clone(closure))))
            },
            Some((_, Implementation::Declared)) | None => {
                Err(RuntimeError::UndefinedOperator { symbol: symbol.to_string(),
                                                      fixity,
                                                      detail: "",
                                                      position })
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{lexer::lex, parser::core::Parser};

    /// Parses and evaluates `source` with a fresh parser, merging the parsed
    /// declarations into `interpreter` first.
    fn run(interpreter: &mut Interpreter, source: &str) -> EvalResult<Option<Value>> {
        let mut parser = Parser::with_operators(interpreter.operators().clone());
        let parsed = parser.parse(&lex(source).unwrap()).unwrap();
        interpreter.add_operators(&parsed.operators).unwrap();
        interpreter.evaluate_all(&parsed.exprs)
    }

    fn value(source: &str) -> Value {
        run(&mut Interpreter::new(), source).unwrap().unwrap()
    }

    fn error(source: &str) -> RuntimeError {
        run(&mut Interpreter::new(), source).unwrap_err()
    }

    #[test]
    fn arithmetic_follows_the_table() {
        assert_eq!(value("2 - 3 - 4"), Value::Number(-5.0));
        assert_eq!(value("2 ^ 3 ^ 2"), Value::Number(512.0));
        assert_eq!(value("-3! + 1"), Value::Number(-5.0));
        assert_eq!(value("\"a\" + \"b\""), Value::from("ab"));
    }

    #[test]
    fn assignment_is_right_associative_and_returns_the_value() {
        let mut interpreter = Interpreter::new();
        assert_eq!(run(&mut interpreter, "a = b = 5").unwrap(), Some(Value::Number(5.0)));
        assert_eq!(interpreter.globals().get("a"), Some(Value::Number(5.0)));
        assert_eq!(interpreter.globals().get("b"), Some(Value::Number(5.0)));
    }

    #[test]
    fn blocks_scope_let_but_not_plain_assignment() {
        let mut interpreter = Interpreter::new();
        run(&mut interpreter, "x = 1; { let x = 10; y = x }; { x = 2 }").unwrap();
        assert_eq!(interpreter.globals().get("x"), Some(Value::Number(2.0)));
        assert_eq!(interpreter.globals().get("y"), None);
        assert_eq!(value("{}"), Value::Unit);
    }

    #[test]
    fn conditionals_evaluate_one_branch() {
        assert_eq!(value("x = 0; if true then x = 1 else x = 2; x"), Value::Number(1.0));
        assert_eq!(value("if false then 1"), Value::Unit);
        assert!(matches!(error("if 1 then 2 else 3"), RuntimeError::TypeError { .. }));
    }

    #[test]
    fn closures_capture_their_scope() {
        assert_eq!(value("let make = fn(n) fn(x) x + n; let add2 = make(2); add2(40)"),
                   Value::Number(42.0));
        assert_eq!(value("let fact = fn(n) if n < 2 then 1 else n * fact(n - 1); fact(10)"),
                   Value::Number(3_628_800.0));
    }

    #[test]
    fn declared_operators_dispatch_to_their_body() {
        assert_eq!(value("infixl 6 <+> (a, b) = a * 10 + b; 1 <+> 2 <+> 3"),
                   Value::Number(123.0));
        assert_eq!(value("prefix 9 ~ (x) = 0 - x; ~ ~ 2"), Value::Number(2.0));
    }

    #[test]
    fn operators_are_values() {
        assert_eq!(value("(+)(1, 2)"), Value::Number(3.0));
        assert_eq!(value("let apply = fn(f, a, b) f(a, b); apply((*), 6, 7)"),
                   Value::Number(42.0));
        assert_eq!(value("(+)").to_string(), "<operator +>");
        assert_eq!(value("fn(a, b) a").to_string(), "<fn/2>");
    }

    #[test]
    fn redeclared_builtins_take_effect_for_later_evaluations() {
        let mut interpreter = Interpreter::new();
        assert_eq!(run(&mut interpreter, "1 + 1").unwrap(), Some(Value::Number(2.0)));
        run(&mut interpreter, "infixl 6 + (a, b) = a * b").unwrap();
        assert_eq!(run(&mut interpreter, "3 + 4").unwrap(), Some(Value::Number(12.0)));
    }

    #[test]
    fn declared_but_unevaluated_operators_are_undefined() {
        let mut interpreter = Interpreter::new();
        let parsed = Parser::new().parse(&lex("infixl 6 <+> (a, b) = a; 1 <+> 2").unwrap())
                                  .unwrap();
        interpreter.add_operators(&parsed.operators).unwrap();
        assert!(matches!(interpreter.evaluate(&parsed.exprs[1]),
                         Err(RuntimeError::UndefinedOperator { .. })));
    }

    #[test]
    fn failures_leave_the_environment_unchanged() {
        let mut interpreter = Interpreter::new();
        assert!(matches!(run(&mut interpreter, "y = x + 1"),
                         Err(RuntimeError::UnboundName { .. })));
        assert!(!interpreter.globals().contains("y"));

        run(&mut interpreter, "let f = fn(a) a").unwrap();
        assert!(matches!(run(&mut interpreter, "f(z = 1, 2)"),
                         Err(RuntimeError::Arity { expected: 1, found: 2, .. })));
        assert!(!interpreter.globals().contains("z"));
        assert!(matches!(run(&mut interpreter, "let n = 1; n(2)"),
                         Err(RuntimeError::TypeError { .. })));
    }

    #[test]
    fn calling_a_non_callable_points_at_the_callee() {
        let err = error("let n = 1;\n  n(2)");
        assert_eq!(err.position(), Position::new(2, 3));
        assert_eq!(err.to_string(),
                   "Error on line 2, column 3: Type error: a number is not callable.");
    }

    #[test]
    fn runaway_recursion_hits_the_limit() {
        assert!(matches!(error("let f = fn(n) f(n + 1); f(0)"),
                         RuntimeError::RecursionLimit { .. }));
        assert_eq!(value("let down = fn(n) if n == 0 then 0 else down(n - 1); down(900)"),
                   Value::Number(0.0));
    }

    #[test]
    fn empty_programs_have_no_value() {
        assert_eq!(run(&mut Interpreter::new(), "").unwrap(), None);
        assert_eq!(run(&mut Interpreter::new(), ";;").unwrap(), None);
    }
}

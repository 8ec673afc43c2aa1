//! # opera
//!
//! opera is an expression language whose operators are part of the program.
//! Source text is preprocessed, tokenized and parsed by a Pratt parser that
//! reads binding powers from an operator table, and declarations such as
//! `infixl 6 <+> (a, b) = a + b` extend that table while the program is
//! being read. A tree-walking interpreter then evaluates the result.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{
    error::Error,
    interpreter::{
        evaluator::core::Interpreter,
        lexer::{Token, lex},
        operator::OperatorTable,
        parser::core::{Parsed, Parser},
        value::core::Value,
    },
};

/// The abstract syntax tree.
///
/// Declares the `Expr` enum built by the parser and walked by the evaluator.
/// Every node carries its source position and renders back to canonical
/// source text.
pub mod ast;
/// Batch execution of source files and the configuration that drives it.
pub mod driver;
/// Unified error types for preprocessing, parsing and evaluation.
///
/// Every error names where it happened: a file and line for the
/// preprocessor, a line and column for the parser and the evaluator.
pub mod error;
/// The language pipeline: preprocessor, lexer, operator table, parser,
/// evaluator and runtime values.
pub mod interpreter;
/// The interactive read-eval-print loop.
pub mod repl;
/// Numeric helpers and stack sizing constants shared by the parser and the
/// evaluator.
pub mod util;

/// A parser and an interpreter that live as long as a program or a REPL
/// session.
///
/// Operators declared and variables bound by one call to [`Session::run`]
/// remain visible to later calls.
#[derive(Debug, Default)]
pub struct Session {
    parser:      Parser,
    interpreter: Interpreter,
}

impl Session {
    /// Creates a session that knows only the built-in operators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses tokens with the session's parser.
    ///
    /// On failure the parser's operator table is left as it was.
    pub fn parse(&mut self, tokens: &[Token]) -> Result<Parsed, Error> {
        Ok(self.parser.parse(tokens)?)
    }

    /// Registers the operators a parse declared and evaluates its
    /// expressions in order.
    ///
    /// # Returns
    /// The value of the last expression, or `None` if there were none.
    pub fn execute(&mut self, parsed: &Parsed) -> Result<Option<Value>, Error> {
        self.interpreter.add_operators(&parsed.operators)?;
        Ok(self.interpreter.evaluate_all(&parsed.exprs)?)
    }

    /// Lexes, parses and evaluates source text that has already been
    /// preprocessed.
    ///
    /// # Example
    /// ```
    /// use opera::{Session, interpreter::value::core::Value};
    ///
    /// let mut session = Session::new();
    /// session.run("infixr 8 ** (a, b) = a ^ b").unwrap();
    /// assert_eq!(session.run("2 ** 3 ** 2").unwrap(), Some(Value::Number(512.0)));
    /// ```
    pub fn run(&mut self, source: &str) -> Result<Option<Value>, Error> {
        let parsed = self.parse(&lex(source)?)?;
        self.execute(&parsed)
    }

    /// The operator table as the interpreter currently sees it.
    #[must_use]
    pub const fn operators(&self) -> &OperatorTable {
        self.interpreter.operators()
    }
}

/// Evaluates a complete program in a fresh session.
///
/// # Returns
/// The value of the last expression, or `None` for an empty program.
///
/// # Examples
/// ```
/// use opera::{evaluate_source, interpreter::value::core::Value};
///
/// let value = evaluate_source("let x = 2 + 2; x * 10").unwrap();
/// assert_eq!(value, Some(Value::Number(40.0)));
///
/// // `x` is not defined.
/// assert!(evaluate_source("x + 1").is_err());
/// ```
pub fn evaluate_source(source: &str) -> Result<Option<Value>, Error> {
    Session::new().run(source)
}

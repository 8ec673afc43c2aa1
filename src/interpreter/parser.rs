/// Infix and postfix operators: the Pratt loop.
///
/// Looks operator symbols up in the parser's operator table to decide how
/// tightly they bind, how equal-precedence chains group, and whether a symbol
/// that is both infix and postfix is being used as one or the other.
pub mod binary;
/// Block parsing.
///
/// Parses `{ ... }` sequences of `;`-separated statements.
pub mod block;
/// The parser state and its entry points.
///
/// Contains `Parser`, the `Parsed` result, and the table rollback performed
/// when a parse fails.
pub mod core;
/// Statements and operator declarations.
///
/// Parses the top-level statement sequence and the `infixl`, `infixr`,
/// `infix`, `prefix` and `postfix` declarations that extend the operator
/// table while parsing.
pub mod statement;
/// Prefix position.
///
/// Parses everything that can start an expression: literals, identifiers,
/// groups, operator sections, blocks, conditionals, lambdas, `let`, prefix
/// operator applications, and the call syntax that may follow them.
pub mod unary;
/// Utility functions for parsing.
///
/// Shared helpers for expecting tokens, building error values and reading
/// parameter lists.
pub mod utils;

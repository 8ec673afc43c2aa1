/// Tree-walking evaluation of parsed programs.
///
/// Walks the AST produced by the parser, dispatching operator applications
/// through the interpreter's own operator table and binding names in chained
/// scopes.
///
/// # Responsibilities
/// - Evaluates every expression form, including operator declarations.
/// - Calls native operators and user closures with arity and depth checks.
/// - Reports runtime errors with the position of the failing expression.
pub mod evaluator;
/// Converts preprocessed source text into positioned tokens.
pub mod lexer;
/// Operator signatures and the table both the parser and the interpreter
/// consult.
///
/// The table is seeded with the built-in operators and grows as programs
/// declare new ones.
pub mod operator;
/// Builds the abstract syntax tree from tokens.
///
/// A Pratt parser whose binding powers come from an operator table that is
/// extended while parsing, so a declaration changes how the rest of the
/// program is read.
pub mod parser;
/// Textual `#include` and `#define` expansion, run before lexing.
pub mod preprocessor;
/// Runtime values: numbers, booleans, strings, callables and unit.
pub mod value;

/// Core evaluation logic.
///
/// Contains the `Interpreter`, its operator table and global scope, and the
/// dispatch over every expression form.
pub mod core;

/// Variable scopes.
///
/// Defines the chained `Scope` type that holds variable bindings and is
/// captured by closures.
pub mod environment;

/// Built-in unary operators.
///
/// Negation, boolean not and factorial.
pub mod unary;

/// Built-in binary operators.
///
/// Arithmetic, comparisons, equality, string concatenation and the eager
/// boolean connectives.
pub mod binary;

/// Calls.
///
/// Operator dispatch through the operator table and the invocation of
/// closures and operator values, including the recursion limit.
pub mod call;

/// Utility functions for the evaluator.
///
/// Shared checks for arity, operand kinds and numeric results.
pub mod utils;

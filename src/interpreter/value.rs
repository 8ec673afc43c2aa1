/// User-defined callables.
///
/// Defines the `Closure` type shared by lambdas and declared operators: a
/// parameter list, a body and the environment it was created in.
pub mod closure;

/// Runtime values.
///
/// Defines the `Value` enum produced by evaluation, the `Callable` wrapper
/// used for first-class functions and operators, and the textual form used
/// for program output.
pub mod core;

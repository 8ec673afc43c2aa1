/// Numeric helpers.
///
/// Checked conversions between `f64` and the integer types the interpreter
/// needs, plus the factorial used by the postfix `!` operator.
pub mod num;

/// Deepest expression nesting the parser accepts.
///
/// Counts both recursive constructs and chains such as `1 + 1 + 1` or
/// `f()()`, so every tree handed to the evaluator is at most this tall.
pub const MAX_NESTING: usize = 512;

/// Remaining stack space below which recursive descent grows the stack.
pub const STACK_RED_ZONE: usize = 128 * 1024;
/// Size of each freshly allocated stack segment.
pub const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

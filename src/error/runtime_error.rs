use thiserror::Error;

use crate::interpreter::{
    lexer::Position,
    operator::{Fixity, OperatorConflict},
};

/// Represents all errors that can occur during evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// An identifier is not bound in any enclosing scope.
    #[error("Error on {position}: Unbound name '{name}'.")]
    UnboundName {
        /// The identifier.
        name:     String,
        /// Where it was used.
        position: Position,
    },
    /// The operator table has no usable entry for an operator.
    #[error("Error on {position}: Undefined {fixity} operator '{symbol}'{detail}.")]
    UndefinedOperator {
        /// The operator symbol.
        symbol:   String,
        /// The fixity that was looked up.
        fixity:   Fixity,
        /// Extra context, empty or starting with a separator.
        detail:   &'static str,
        /// Where the operator was applied.
        position: Position,
    },
    /// A callable received the wrong number of arguments.
    #[error("Error on {position}: {callee} expects {expected} argument(s), but {found} were given.")]
    Arity {
        /// A description of the callee.
        callee:   String,
        /// The declared parameter count.
        expected: usize,
        /// The number of arguments in the call.
        found:    usize,
        /// Where the call happened.
        position: Position,
    },
    /// A value had an unexpected or incompatible kind.
    #[error("Error on {position}: Type error: {details}.")]
    TypeError {
        /// Details about the kind mismatch.
        details:  String,
        /// Where the mismatch was detected.
        position: Position,
    },
    /// A numeric operation is undefined for its operands.
    #[error("Error on {position}: Domain error: {details}.")]
    Domain {
        /// What went wrong, such as a division by zero.
        details:  String,
        /// Where the operation was applied.
        position: Position,
    },
    /// Nested calls exceeded the recursion limit.
    #[error("Error on {position}: Recursion limit of {limit} nested calls exceeded.")]
    RecursionLimit {
        /// The configured limit.
        limit:    usize,
        /// The call that crossed the limit.
        position: Position,
    },
    /// An operator declaration could not be installed.
    #[error("Error on {position}: {conflict}.")]
    OperatorConflict {
        /// Why the declaration was refused.
        conflict: OperatorConflict,
        /// Where the declaration was evaluated.
        position: Position,
    },
}

impl RuntimeError {
    /// The source position the error refers to.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::UnboundName { position, .. }
            | Self::UndefinedOperator { position, .. }
            | Self::Arity { position, .. }
            | Self::TypeError { position, .. }
            | Self::Domain { position, .. }
            | Self::RecursionLimit { position, .. }
            | Self::OperatorConflict { position, .. } => *position,
        }
    }
}

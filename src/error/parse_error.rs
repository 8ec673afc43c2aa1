use thiserror::Error;

use crate::interpreter::{
    lexer::Position,
    operator::{Fixity, OperatorConflict},
};

/// Represents all errors that can occur during lexing or parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// The lexer found a character it does not recognise.
    #[error("Error on {position}: Unexpected character '{text}'.")]
    UnexpectedCharacter {
        /// The offending source text.
        text:     String,
        /// Where it was found.
        position: Position,
    },
    /// A string literal has no closing quote.
    #[error("Error on {position}: Unterminated string literal.")]
    UnterminatedString {
        /// Where the literal starts.
        position: Position,
    },
    /// A number literal does not fit in a finite `f64`.
    #[error("Error on {position}: Number literal '{text}' is out of range.")]
    InvalidNumber {
        /// The literal as written.
        text:     String,
        /// Where the literal starts.
        position: Position,
    },
    /// Found an unexpected token while parsing.
    #[error("Error on {position}: Unexpected token '{token}', expected {expected}.")]
    UnexpectedToken {
        /// The token encountered.
        token:    String,
        /// A description of what would have been accepted.
        expected: &'static str,
        /// Where the token starts.
        position: Position,
    },
    /// Reached the end of input unexpectedly.
    #[error("Error on {position}: Unexpected end of input, expected {expected}.")]
    UnexpectedEndOfInput {
        /// A description of what would have been accepted.
        expected: &'static str,
        /// The position just past the last token.
        position: Position,
    },
    /// An operator symbol is not defined with the fixity its position needs.
    #[error("Error on {position}: Unknown {fixity} operator '{symbol}'.")]
    UnknownOperator {
        /// The operator symbol.
        symbol:   String,
        /// The fixity the parser was looking for.
        fixity:   Fixity,
        /// Where the symbol was found.
        position: Position,
    },
    /// The left side of `=` is not a plain identifier.
    #[error("Error on {position}: Cannot assign to '{target}'.")]
    InvalidAssignmentTarget {
        /// The rendered left-hand side.
        target:   String,
        /// Where the `=` was found.
        position: Position,
    },
    /// The assignment symbol was used as an operator value.
    #[error("Error on {position}: '{symbol}' is not an operator value.")]
    InvalidOperatorSection {
        /// The symbol inside the parentheses.
        symbol:   String,
        /// Where the symbol was found.
        position: Position,
    },
    /// Two non-associative operators of equal precedence were chained.
    #[error("Error on {position}: Non-associative operator '{symbol}' cannot be chained.")]
    NonAssociativeChain {
        /// The second operator of the chain.
        symbol:   String,
        /// Where it was found.
        position: Position,
    },
    /// An operator declaration lists the wrong number of parameters.
    #[error("Error on {position}: {fixity} operator '{symbol}' takes {expected} parameter(s), but {found} were declared.")]
    DeclarationArity {
        /// The declared symbol.
        symbol:   String,
        /// The declared fixity.
        fixity:   Fixity,
        /// The number of parameters the fixity requires.
        expected: usize,
        /// The number of parameters written.
        found:    usize,
        /// Where the parameter list starts.
        position: Position,
    },
    /// A parameter name appears twice in one parameter list.
    #[error("Error on {position}: Duplicate parameter '{name}'.")]
    DuplicateParameter {
        /// The repeated name.
        name:     String,
        /// Where the repetition was found.
        position: Position,
    },
    /// An operator precedence is not a whole number.
    #[error("Error on {position}: Invalid precedence '{text}', expected a whole number.")]
    InvalidPrecedence {
        /// The precedence as written.
        text:     String,
        /// Where the precedence was found.
        position: Position,
    },
    /// Expressions are nested deeper than the parser allows.
    #[error("Error on {position}: Expression is nested more than {limit} levels deep.")]
    NestingTooDeep {
        /// The deepest nesting accepted.
        limit:    usize,
        /// Where the limit was crossed.
        position: Position,
    },
    /// An operator declaration is incompatible with the operator table.
    #[error("Error on {position}: {conflict}.")]
    OperatorConflict {
        /// Why the declaration was refused.
        conflict: OperatorConflict,
        /// Where the declared symbol was found.
        position: Position,
    },
}

impl ParseError {
    /// The source position the error refers to.
    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::UnexpectedCharacter { position, .. }
            | Self::UnterminatedString { position }
            | Self::InvalidNumber { position, .. }
            | Self::UnexpectedToken { position, .. }
            | Self::UnexpectedEndOfInput { position, .. }
            | Self::UnknownOperator { position, .. }
            | Self::InvalidAssignmentTarget { position, .. }
            | Self::InvalidOperatorSection { position, .. }
            | Self::NonAssociativeChain { position, .. }
            | Self::DeclarationArity { position, .. }
            | Self::DuplicateParameter { position, .. }
            | Self::InvalidPrecedence { position, .. }
            | Self::NestingTooDeep { position, .. }
            | Self::OperatorConflict { position, .. } => *position,
        }
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Parsing errors.
///
/// Defines all error types that can occur during lexing and parsing of source
/// code: malformed tokens, unexpected or missing tokens, unknown operator
/// symbols and conflicting operator declarations. Every variant carries the
/// source position of the offending token.
pub mod parse_error;
/// Preprocessing errors.
///
/// Raised while expanding `#include` and `#define` directives, before the
/// source ever reaches the lexer. Errors are reported in file and line terms.
pub mod preprocess_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during evaluation: unbound
/// names, undefined operators, arity and type mismatches, domain errors and
/// the recursion limit.
pub mod runtime_error;

pub use parse_error::ParseError;
pub use preprocess_error::PreprocessError;
pub use runtime_error::RuntimeError;

use crate::interpreter::{lexer::Position, operator::OperatorConflict};

/// Any failure of the text-to-value pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The preprocessor rejected the source.
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    /// The source could not be tokenized or parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Evaluation failed.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    /// The interpreter refused an operator signature reported by the parser.
    #[error(transparent)]
    Conflict(#[from] OperatorConflict),
    /// A source file could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        /// The file that was requested.
        path:   PathBuf,
        /// The underlying failure.
        source: std::io::Error,
    },
}

impl Error {
    /// The source position the error points at, if it has one.
    ///
    /// Preprocessor errors name a file and line instead, and I/O errors and
    /// operator conflicts have no position.
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::Parse(e) => Some(e.position()),
            Self::Runtime(e) => Some(e.position()),
            Self::Preprocess(_) | Self::Conflict(_) | Self::Io { .. } => None,
        }
    }
}

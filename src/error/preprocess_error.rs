use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while expanding preprocessor directives.
#[derive(Debug, Error)]
pub enum PreprocessError {
    /// An `#include` names a file that does not exist.
    #[error("{}:{line}: Include file '{}' not found.", file.display(), path.display())]
    FileNotFound {
        /// The path as resolved against the including file.
        path: PathBuf,
        /// The file containing the directive.
        file: PathBuf,
        /// The line of the directive.
        line: usize,
    },
    /// A file includes itself, directly or through other files.
    #[error("{}:{line}: Circular include of '{}'.", file.display(), path.display())]
    CircularInclude {
        /// The file that is already being expanded.
        path: PathBuf,
        /// The file containing the directive.
        file: PathBuf,
        /// The line of the directive.
        line: usize,
    },
    /// A directive is malformed.
    #[error("{}:{line}: Invalid directive: {details}.", file.display())]
    InvalidDirective {
        /// What is wrong with the directive.
        details: String,
        /// The file containing the directive.
        file:    PathBuf,
        /// The line of the directive.
        line:    usize,
    },
    /// An included file could not be read.
    #[error("{}: {source}", path.display())]
    Io {
        /// The file being read.
        path:   PathBuf,
        /// The underlying failure.
        source: std::io::Error,
    },
}

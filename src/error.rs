//! Error types for htmlpack.
//!
//! Parse errors are the only fatal failures in the pipeline: if the input
//! cannot be turned into a tree there is nothing to bundle. Resource-level
//! failures (missing files, unreadable files) are deliberately *not* errors
//! at this layer: the inliner degrades per node and records an
//! [`InlineDiagnostic`](crate::inline::InlineDiagnostic) instead.
//!
//! All errors use the `thiserror` crate for minimal boilerplate and proper
//! error trait implementations.

use thiserror::Error;

/// Result type alias for htmlpack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for htmlpack.
#[derive(Error, Debug)]
pub enum Error {
  /// HTML parsing error
  #[error("parse error: {0}")]
  Parse(#[from] ParseError),

  /// I/O error (reading the input document, writing output)
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

/// Unrecoverable structural breaks in the input markup.
///
/// The parser is otherwise permissive: unknown tags, unclosed tags, stray
/// close tags and valueless attributes all recover the way a browser would.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
  /// A `<!--` comment never reached its `-->` terminator.
  #[error("unterminated comment starting on line {line}")]
  UnterminatedComment { line: usize },

  /// A quoted attribute value never reached its closing quote.
  #[error("unterminated quoted value for attribute '{name}' on line {line}")]
  UnterminatedAttributeValue { name: String, line: usize },
}

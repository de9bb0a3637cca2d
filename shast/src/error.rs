//! Error types for shast

use chumsky::error::{Simple, SimpleReason};
use thiserror::Error;

/// Result type alias for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Ways a parse can fail. None are recovered locally: a partially built
/// tree has no meaning, so every failure aborts the whole parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The grammar rejected the input. `offset` counts characters.
    #[error("Syntax error at offset {offset}: {message}")]
    Syntax { message: String, offset: usize },

    /// Subshells, compound statements and substitutions nested deeper than
    /// the configured bound.
    #[error("Maximum nesting depth of {limit} exceeded")]
    MaxNestingExceeded { limit: usize },

    /// Input rejected before parsing.
    #[error("Input of {size} bytes exceeds the limit of {limit} bytes")]
    InputTooLarge { size: usize, limit: usize },

    /// The grammar handed the builders a shape they cannot accept. This is
    /// a bug in the parser, never a property of the input.
    #[error("Internal error: {0}")]
    InternalInvariantViolation(String),
}

impl ParseError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::InternalInvariantViolation(message.into())
    }

    /// Collapse the grammar's errors into the one that got furthest.
    pub(crate) fn from_syntax(errors: Vec<Simple<char>>) -> Self {
        errors
            .into_iter()
            .max_by_key(|e| e.span().start)
            .map_or_else(
                || Self::Syntax {
                    message: "unrecognised input".to_string(),
                    offset: 0,
                },
                |e| Self::Syntax {
                    message: syntax_message(&e),
                    offset: e.span().start,
                },
            )
    }
}

/// Text of a grammar error. Custom reasons carry their own message, which
/// `Simple`'s `Display` does not print.
fn syntax_message(error: &Simple<char>) -> String {
    match error.reason() {
        SimpleReason::Custom(message) => message.clone(),
        _ => error.to_string(),
    }
}

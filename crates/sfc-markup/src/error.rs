//! Parse error types.

use crate::Span;
use thiserror::Error;

/// An error that occurred during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The location in the source where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Creates a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// An element was never closed.
    #[error("unclosed tag: <{tag_name}>")]
    UnclosedTag {
        /// The name of the unclosed tag.
        tag_name: String,
    },

    /// A closing tag matched no open element.
    #[error("unexpected closing tag: </{found}>")]
    UnexpectedClosingTag {
        /// The name found in the closing tag.
        found: String,
    },

    /// A start tag ended before `>`.
    #[error("unterminated start tag: <{tag_name}")]
    UnterminatedStartTag {
        /// The name of the element.
        tag_name: String,
    },

    /// A quoted attribute value was never closed.
    #[error("unterminated value for attribute `{name}`")]
    UnterminatedAttributeValue {
        /// The attribute name.
        name: String,
    },

    /// A comment was never closed.
    #[error("unterminated comment")]
    UnterminatedComment,
}

//! Conversion errors.

use crate::script::NodeId;
use thiserror::Error;

/// An error that stops a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    /// The `<script>` content is not valid JavaScript/TypeScript.
    #[error("failed to parse script: {message}")]
    ScriptParse {
        /// The parser's message.
        message: String,
    },

    /// The accessor rewrite broke one of its own invariants.
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

/// An internal invariant violation in the accessor rewrite.
///
/// These indicate a bug in the rewriter rather than bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// A classified access was never reached by the rewrite traversal.
    #[error("replacement for node {0} was never applied")]
    UnconsumedReplacement(NodeId),

    /// A classified access was reached twice.
    #[error("replacement for node {0} was applied twice")]
    DuplicateReplacement(NodeId),

    /// A classified node no longer has the shape it was classified with.
    #[error("node {0} does not match its classification")]
    ShapeMismatch(NodeId),

    /// An access chain without segments.
    #[error("access chain has no segments")]
    EmptyChain,
}

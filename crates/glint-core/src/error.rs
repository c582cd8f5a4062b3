//! Error types for the analysis core.
//!
//! The core has exactly one failure mode: the input it was handed does not
//! describe the file it claims to describe. Attachment and matching never fail
//! on well-formed input.

use thiserror::Error;

use crate::ast::NodeId;
use crate::span::SourceSpan;

/// What the malformed input element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputElement {
    Node(NodeId),
    /// Index into the token stream.
    Token(usize),
}

impl std::fmt::Display for InputElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputElement::Node(id) => write!(f, "node {}", id.0),
            InputElement::Token(index) => write!(f, "token #{}", index),
        }
    }
}

/// Errors raised by the analysis core.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    /// The provider handed over a malformed AST or token stream.
    #[error("invalid input at {element} ({span}): {reason}")]
    InvalidInput {
        element: InputElement,
        span: SourceSpan,
        reason: String,
    },
}

impl AnalysisError {
    pub fn invalid_node(id: NodeId, span: SourceSpan, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidInput {
            element: InputElement::Node(id),
            span,
            reason: reason.into(),
        }
    }

    pub fn invalid_token(index: usize, span: SourceSpan, reason: impl Into<String>) -> Self {
        AnalysisError::InvalidInput {
            element: InputElement::Token(index),
            span,
            reason: reason.into(),
        }
    }

    /// The offending node, when the error is about a node.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            AnalysisError::InvalidInput {
                element: InputElement::Node(id),
                ..
            } => Some(*id),
            AnalysisError::InvalidInput { .. } => None,
        }
    }
}

/// Result alias for core operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_the_node() {
        let err = AnalysisError::invalid_node(
            NodeId(7),
            SourceSpan::new(3, 1, 9, 1),
            "span ends past end of file",
        );
        assert_eq!(
            err.to_string(),
            "invalid input at node 7 (3:1-9:1): span ends past end of file"
        );
        assert_eq!(err.node(), Some(NodeId(7)));
    }

    #[test]
    fn token_errors_have_no_node() {
        let err = AnalysisError::invalid_token(2, SourceSpan::new(1, 1, 1, 2), "bad");
        assert_eq!(err.node(), None);
        assert!(err.to_string().starts_with("invalid input at token #2"));
    }
}

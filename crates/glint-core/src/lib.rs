//! Core data model for glint.
//!
//! This crate provides the language-agnostic contract between a syntax
//! provider and the analyses:
//! - Source positions and spans
//! - The comment-preserving token stream
//! - The AST node model and its visitor
//! - Line bookkeeping and input validation
//! - Error types

pub mod ast;
pub mod error;
pub mod source;
pub mod span;
pub mod text;
pub mod token;
pub mod visitor;

pub use ast::{AstNode, LiteralKind, NodeId, NodeKind, NodeRef, NodeTag};
pub use error::{AnalysisError, AnalysisResult, InputElement};
pub use source::ParsedSource;
pub use span::{Position, SourceSpan};
pub use text::LineIndex;
pub use token::{CommentPlacement, CommentToken, Token};
pub use visitor::{walk, VisitResult, Visitor};

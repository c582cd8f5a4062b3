//! Token stream types consumed from the syntax provider.
//!
//! The analysis does not need the full lexical detail of the source language.
//! It needs to know where code sits (to find blank lines and the first token of
//! a line) and where comments sit. Everything else is the provider's concern.

use serde::{Deserialize, Serialize};

use crate::span::{Position, SourceSpan};

/// Where a comment sits relative to code on its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentPlacement {
    /// The comment is the only token on its line.
    OwnLine,
    /// The comment follows code on the same line.
    Trailing,
}

/// A comment preserved by the provider as an out-of-grammar leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentToken {
    pub span: SourceSpan,
    /// Comment text including the leading marker (e.g. `# note`).
    pub text: String,
    pub placement: CommentPlacement,
}

impl CommentToken {
    pub fn new(span: SourceSpan, text: impl Into<String>, placement: CommentPlacement) -> Self {
        CommentToken {
            span,
            text: text.into(),
            placement,
        }
    }

    pub fn line(&self) -> u32 {
        self.span.start.line
    }

    pub fn start(&self) -> Position {
        self.span.start
    }

    pub fn is_own_line(&self) -> bool {
        self.placement == CommentPlacement::OwnLine
    }

    pub fn is_trailing(&self) -> bool {
        self.placement == CommentPlacement::Trailing
    }
}

/// One element of the ordered token stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Token {
    /// Any code token. Multi-line tokens (triple-quoted strings) cover every
    /// line they touch.
    Code { span: SourceSpan },
    Comment(CommentToken),
}

impl Token {
    pub fn code(span: SourceSpan) -> Self {
        Token::Code { span }
    }

    pub fn span(&self) -> SourceSpan {
        match self {
            Token::Code { span } => *span,
            Token::Comment(comment) => comment.span,
        }
    }

    pub fn as_comment(&self) -> Option<&CommentToken> {
        match self {
            Token::Comment(comment) => Some(comment),
            Token::Code { .. } => None,
        }
    }
}

// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

use std::ops::Range;

use glint_core::Position;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParserError {
    #[error("failed to load the Python grammar: {message}")]
    Language { message: String },
    #[error("tree-sitter produced no tree")]
    NoTree,
    #[error("syntax error at {position}: unexpected {found}")]
    Unexpected {
        found: String,
        position: Position,
        range: Range<usize>,
    },
    #[error("syntax error at {position}: missing {expected}")]
    Missing {
        expected: String,
        position: Position,
        range: Range<usize>,
    },
}

impl ParserError {
    /// Where the error was detected, for syntax errors.
    pub fn position(&self) -> Option<Position> {
        match self {
            ParserError::Unexpected { position, .. } | ParserError::Missing { position, .. } => {
                Some(*position)
            }
            ParserError::Language { .. } | ParserError::NoTree => None,
        }
    }

    /// Byte range of the offending source text.
    pub fn range(&self) -> Option<Range<usize>> {
        match self {
            ParserError::Unexpected { range, .. } | ParserError::Missing { range, .. } => {
                Some(range.clone())
            }
            ParserError::Language { .. } | ParserError::NoTree => None,
        }
    }

    /// The error without its position prefix.
    pub fn message(&self) -> String {
        match self {
            ParserError::Unexpected { found, .. } => format!("unexpected {}", found),
            ParserError::Missing { expected, .. } => format!("missing {}", expected),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;

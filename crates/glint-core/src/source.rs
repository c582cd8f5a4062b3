//! The parsed-source bundle handed over by a syntax provider, and its
//! validation.
//!
//! Validation is fail-fast: the first violation found is returned and the core
//! makes no attempt to repair the input.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ast::{AstNode, NodeKind};
use crate::error::{AnalysisError, AnalysisResult};
use crate::text::LineIndex;
use crate::token::{CommentToken, Token};

/// Everything the analysis consumes for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSource {
    /// Line lengths of the source, for bounds checks.
    pub lines: LineIndex,
    /// Code and comment tokens in source order.
    pub tokens: Vec<Token>,
    /// The root `Module` node.
    pub module: AstNode,
}

impl ParsedSource {
    pub fn new(lines: LineIndex, tokens: Vec<Token>, module: AstNode) -> Self {
        ParsedSource {
            lines,
            tokens,
            module,
        }
    }

    /// Comment tokens in source order.
    pub fn comments(&self) -> impl Iterator<Item = &CommentToken> {
        self.tokens.iter().filter_map(Token::as_comment)
    }

    /// Check the input contract.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidInput`] naming the first offending node
    /// or token when:
    /// - the root is not a `Module`
    /// - a span starts after it ends or reaches outside the file
    /// - a child's span is not contained in its parent's span
    /// - a definition header lies outside its definition
    /// - two nodes share an id
    /// - tokens are out of source order
    pub fn validate(&self) -> AnalysisResult<()> {
        if !matches!(self.module.kind, NodeKind::Module) {
            return Err(AnalysisError::invalid_node(
                self.module.id,
                self.module.span,
                format!("root must be a module, found {}", self.module.tag()),
            ));
        }

        let mut seen = HashSet::with_capacity(self.module.node_count());
        self.validate_node(&self.module, None, &mut seen)?;
        self.validate_tokens()
    }

    fn validate_node(
        &self,
        node: &AstNode,
        parent: Option<&AstNode>,
        seen: &mut HashSet<u32>,
    ) -> AnalysisResult<()> {
        if !seen.insert(node.id.0) {
            return Err(AnalysisError::invalid_node(
                node.id,
                node.span,
                "duplicate node id",
            ));
        }
        if !node.span.is_well_formed() {
            return Err(AnalysisError::invalid_node(
                node.id,
                node.span,
                "span starts after it ends",
            ));
        }
        if !self.lines.contains_span(&node.span) {
            return Err(AnalysisError::invalid_node(
                node.id,
                node.span,
                format!(
                    "span reaches outside the file ({} lines)",
                    self.lines.line_count()
                ),
            ));
        }
        if let Some(parent) = parent {
            if !parent.span.contains(&node.span) {
                return Err(AnalysisError::invalid_node(
                    node.id,
                    node.span,
                    format!("span is not contained in parent {}", parent.id.0),
                ));
            }
        }
        if let Some(header) = node.kind.header() {
            if !header.is_well_formed() || !node.span.contains(&header) {
                return Err(AnalysisError::invalid_node(
                    node.id,
                    header,
                    "definition header lies outside the definition",
                ));
            }
        }
        for child in &node.children {
            self.validate_node(child, Some(node), seen)?;
        }
        Ok(())
    }

    fn validate_tokens(&self) -> AnalysisResult<()> {
        let mut previous = None;
        for (index, token) in self.tokens.iter().enumerate() {
            let span = token.span();
            if !span.is_well_formed() {
                return Err(AnalysisError::invalid_token(
                    index,
                    span,
                    "span starts after it ends",
                ));
            }
            if !self.lines.contains_span(&span) {
                return Err(AnalysisError::invalid_token(
                    index,
                    span,
                    "span reaches outside the file",
                ));
            }
            if let Some(previous) = previous {
                if span.start < previous {
                    return Err(AnalysisError::invalid_token(
                        index,
                        span,
                        "token stream is out of source order",
                    ));
                }
            }
            previous = Some(span.start);
        }
        Ok(())
    }
}

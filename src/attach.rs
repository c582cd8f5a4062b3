//! Comment attachment.
//!
//! Every comment token is assigned exactly one owner. Rules apply in order:
//!
//! 1. **Same-line trailing.** A comment after code attaches to the
//!    comment-bearing node whose trailing anchor (header end for definitions,
//!    span end otherwise) is on the comment's line at or before it. The
//!    closest anchor wins; ties go to the outermost node.
//! 2. **Leading block.** A run of own-line comments on consecutive lines
//!    attaches as a unit to the outermost comment-bearing node whose lead
//!    token is the first code token on the line right after the run.
//!    Definitions lead with `def`/`class`, so a run above a decorator belongs
//!    to the decorator and a run between decorator and `def` to the function.
//!    A run above the first decorator therefore attaches to that `Decorator`,
//!    not to the decorated definition.
//! 3. **Interior.** Otherwise the smallest interior container (or
//!    definition header) strictly containing the comment owns it.
//! 4. **Orphan.** Otherwise the comment is detached, recording the innermost
//!    enclosing block as context. A class or function body extends past its
//!    last code token up to the next code token, for comments indented deeper
//!    than its `def`/`class` line.
//!
//! ```text
//! class One:
//!     two: int = 52  # rule 1 -> field `two`
//!     # rule 2 -> field `three`
//!     three: int
//!
//!     # rule 4 -> orphan in `One`
//! ```

use std::fmt;

use glint_core::{
    walk, AstNode, CommentToken, NodeRef, NodeTag, ParsedSource, Position, SourceSpan,
    VisitResult, Visitor,
};
use serde::Serialize;
use tracing::trace;

/// How a comment relates to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachRelation {
    SameLineTrailing,
    LeadingBlock,
    /// Inside a construct, not next to any documented child.
    Enclosed,
    /// No owner; see [`AttachTarget::Orphan`].
    Detached,
}

impl AttachRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachRelation::SameLineTrailing => "same_line_trailing",
            AttachRelation::LeadingBlock => "leading_block",
            AttachRelation::Enclosed => "enclosed",
            AttachRelation::Detached => "detached",
        }
    }
}

impl fmt::Display for AttachRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The owner of a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttachTarget {
    Node(NodeRef),
    /// `context` is the innermost module, class or function around the comment.
    Orphan { context: NodeRef },
}

impl AttachTarget {
    /// The owning node, unless orphaned.
    pub fn node(&self) -> Option<&NodeRef> {
        match self {
            AttachTarget::Node(node) => Some(node),
            AttachTarget::Orphan { .. } => None,
        }
    }

    pub fn is_orphan(&self) -> bool {
        matches!(self, AttachTarget::Orphan { .. })
    }
}

/// One comment and its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentAttachment {
    pub comment: CommentToken,
    pub target: AttachTarget,
    pub relation: AttachRelation,
}

// ============================================================================
// Node index
// ============================================================================

struct Entry<'a> {
    node: &'a AstNode,
    depth: usize,
}

/// Flat pre-order list of nodes with their depth.
struct NodeIndex<'a> {
    entries: Vec<Entry<'a>>,
    depth: usize,
}

impl<'a> Visitor<'a> for NodeIndex<'a> {
    fn visit_node(&mut self, node: &'a AstNode) -> VisitResult {
        self.entries.push(Entry {
            node,
            depth: self.depth,
        });
        self.depth += 1;
        VisitResult::Continue
    }

    fn leave_node(&mut self, _node: &'a AstNode) {
        self.depth -= 1;
    }
}

impl<'a> NodeIndex<'a> {
    fn build(module: &'a AstNode) -> Self {
        let mut index = NodeIndex {
            entries: Vec::with_capacity(module.node_count()),
            depth: 0,
        };
        walk(&mut index, module);
        index
    }

    fn bearing(&self) -> impl Iterator<Item = &Entry<'a>> {
        self.entries
            .iter()
            .filter(|entry| entry.node.tag().is_comment_bearing())
    }

    /// Rule 1.
    fn trailing_owner(&self, comment: &CommentToken) -> Option<&'a AstNode> {
        let at = comment.start();
        self.bearing()
            .filter(|entry| {
                let anchor = entry.node.trailing_anchor();
                anchor.line == at.line && anchor.col <= at.col
            })
            // Closest anchor first, then outermost.
            .min_by_key(|entry| (at.col - entry.node.trailing_anchor().col, entry.depth))
            .map(|entry| entry.node)
    }

    /// Rule 2.
    fn leading_owner(&self, lead: Position) -> Option<&'a AstNode> {
        self.bearing()
            .filter(|entry| entry.node.lead() == lead)
            .min_by_key(|entry| entry.depth)
            .map(|entry| entry.node)
    }

    /// Rule 3.
    fn interior_owner(&self, span: &SourceSpan) -> Option<&'a AstNode> {
        self.entries
            .iter()
            .filter(|entry| {
                let node = entry.node;
                let container = if node.tag().is_interior_container() {
                    Some(node.span)
                } else {
                    node.kind.header()
                };
                container.is_some_and(|c| c.strictly_contains(span))
            })
            .max_by_key(|entry| entry.depth)
            .map(|entry| entry.node)
    }

    /// Rule 4 context.
    fn enclosing_block(
        &self,
        comment: &CommentToken,
        source: &ParsedSource,
    ) -> Option<&'a AstNode> {
        self.entries
            .iter()
            .filter(|entry| {
                entry.node.tag().is_block() && block_holds(entry.node, comment, source)
            })
            .max_by_key(|entry| entry.depth)
            .map(|entry| entry.node)
    }
}

/// True if `comment` lies in the body of `block`, counting the indented tail
/// between the block's last code token and the next code token.
fn block_holds(block: &AstNode, comment: &CommentToken, source: &ParsedSource) -> bool {
    if block.span.contains(&comment.span) {
        return true;
    }
    if block.tag() == NodeTag::Module {
        return false;
    }
    let at = comment.start();
    if at < block.span.end || at.col <= block.lead().col {
        return false;
    }
    next_code_at_or_after(source, block.span.end).is_none_or(|dedent| at < dedent)
}

// ============================================================================
// Attachment
// ============================================================================

/// Attach every comment in `source` to its owner.
///
/// The result has one entry per comment token, in token order. Attachment
/// cannot fail; the input is expected to have passed
/// [`ParsedSource::validate`].
pub fn attach_comments(source: &ParsedSource) -> Vec<CommentAttachment> {
    let index = NodeIndex::build(&source.module);
    let comments: Vec<&CommentToken> = source.comments().collect();
    let mut owners: Vec<Option<(NodeRef, AttachRelation)>> = vec![None; comments.len()];

    // Rule 1.
    for (slot, comment) in owners.iter_mut().zip(&comments) {
        if comment.is_trailing() {
            *slot = index
                .trailing_owner(comment)
                .map(|node| (node.to_ref(), AttachRelation::SameLineTrailing));
        }
    }

    // Rule 2, one run of own-line comments at a time.
    for run in own_line_runs(&comments) {
        let last_line = comments[run.end - 1].line();
        let Some(lead) = first_code_on_line(source, last_line + 1) else {
            continue;
        };
        if let Some(node) = index.leading_owner(lead) {
            let owner = node.to_ref();
            for slot in &mut owners[run] {
                *slot = Some((owner.clone(), AttachRelation::LeadingBlock));
            }
        }
    }

    // Rules 3 and 4.
    comments
        .iter()
        .zip(owners)
        .map(|(comment, owner)| {
            let (target, relation) = match owner {
                Some((node, relation)) => (AttachTarget::Node(node), relation),
                None => match index.interior_owner(&comment.span) {
                    Some(node) => (AttachTarget::Node(node.to_ref()), AttachRelation::Enclosed),
                    None => {
                        let context = index
                            .enclosing_block(comment, source)
                            .unwrap_or(&source.module)
                            .to_ref();
                        (AttachTarget::Orphan { context }, AttachRelation::Detached)
                    }
                },
            };
            trace!(
                line = comment.line(),
                relation = relation.as_str(),
                target = ?target.node().map(|n| n.id.0),
                "attached comment"
            );
            CommentAttachment {
                comment: (*comment).clone(),
                target,
                relation,
            }
        })
        .collect()
}

/// Index ranges of maximal runs of own-line comments on consecutive lines.
fn own_line_runs(comments: &[&CommentToken]) -> Vec<std::ops::Range<usize>> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for (i, comment) in comments.iter().enumerate() {
        let continues = start.is_some()
            && comment.is_own_line()
            && comments[i - 1].line() + 1 == comment.line();
        if continues {
            continue;
        }
        if let Some(s) = start.take() {
            runs.push(s..i);
        }
        if comment.is_own_line() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        runs.push(s..comments.len());
    }
    runs
}

fn code_starts(source: &ParsedSource) -> impl Iterator<Item = Position> + '_ {
    source
        .tokens
        .iter()
        .filter(|token| token.as_comment().is_none())
        .map(|token| token.span().start)
}

/// Start of the first code token on `line`, if that line starts with code.
fn first_code_on_line(source: &ParsedSource, line: u32) -> Option<Position> {
    code_starts(source)
        .find(|start| start.line >= line)
        .filter(|start| start.line == line)
}

fn next_code_at_or_after(source: &ParsedSource, at: Position) -> Option<Position> {
    code_starts(source).find(|start| *start >= at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{CommentPlacement, LineIndex, NodeId, NodeKind, Token};

    fn comment(line: u32, col: u32, placement: CommentPlacement) -> CommentToken {
        CommentToken::new(SourceSpan::new(line, col, line, col + 3), "# c", placement)
    }

    #[test]
    fn runs_split_on_gaps_and_trailing() {
        let a = comment(1, 1, CommentPlacement::OwnLine);
        let b = comment(2, 1, CommentPlacement::OwnLine);
        let c = comment(4, 1, CommentPlacement::OwnLine);
        let d = comment(5, 9, CommentPlacement::Trailing);
        let e = comment(6, 1, CommentPlacement::OwnLine);
        let comments = [&a, &b, &c, &d, &e];
        assert_eq!(own_line_runs(&comments), vec![0..2, 2..3, 4..5]);
    }

    /// `x = 1  # c` with a hand-built tree.
    #[test]
    fn trailing_comment_on_assignment() {
        let target = AstNode::new(
            NodeId(2),
            NodeKind::Identifier {
                name: "x".to_string(),
            },
            SourceSpan::new(1, 1, 1, 2),
        );
        let assign = AstNode::new(
            NodeId(1),
            NodeKind::Assignment {
                target: "x".to_string(),
            },
            SourceSpan::new(1, 1, 1, 6),
        )
        .with_children(vec![target]);
        let module = AstNode::new(NodeId(0), NodeKind::Module, SourceSpan::new(1, 1, 2, 1))
            .with_children(vec![assign]);
        let source = ParsedSource::new(
            LineIndex::from_source("x = 1  # c\n"),
            vec![
                Token::code(SourceSpan::new(1, 1, 1, 2)),
                Token::code(SourceSpan::new(1, 3, 1, 4)),
                Token::code(SourceSpan::new(1, 5, 1, 6)),
                Token::Comment(comment(1, 8, CommentPlacement::Trailing)),
            ],
            module,
        );

        let attachments = attach_comments(&source);
        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].relation, AttachRelation::SameLineTrailing);
        assert_eq!(attachments[0].target.node().map(|n| n.id), Some(NodeId(1)));
    }

    #[test]
    fn comment_only_file_is_orphaned_in_module() {
        let module = AstNode::new(NodeId(0), NodeKind::Module, SourceSpan::new(1, 1, 2, 1));
        let source = ParsedSource::new(
            LineIndex::from_source("# c\n"),
            vec![Token::Comment(comment(1, 1, CommentPlacement::OwnLine))],
            module,
        );
        let attachments = attach_comments(&source);
        assert_eq!(attachments[0].relation, AttachRelation::Detached);
        match &attachments[0].target {
            AttachTarget::Orphan { context } => assert_eq!(context.id, NodeId(0)),
            other => panic!("expected orphan, got {:?}", other),
        }
    }
}

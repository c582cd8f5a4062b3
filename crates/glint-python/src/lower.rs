// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Lowering from the tree-sitter concrete tree to the glint AST.
//!
//! Nodes are built with placeholder ids and numbered in pre-order once the
//! tree is complete. A node's span runs from its first to its last code
//! token, so comments tree-sitter folds into a block never widen it.
//!
//! tree-sitter reports columns in bytes; glint positions count chars.

use glint_core::{
    AstNode, CommentPlacement, CommentToken, LiteralKind, NodeId, NodeKind, Position, SourceSpan,
    Token,
};
use tree_sitter::Node;

use crate::errors::ParserError;
use crate::node_kinds as kinds;

pub(crate) fn make_node(kind: NodeKind, span: SourceSpan, children: Vec<AstNode>) -> AstNode {
    AstNode::new(NodeId(0), kind, span).with_children(children)
}

/// Number nodes in pre-order starting at `next`.
pub(crate) fn assign_ids(node: &mut AstNode, next: &mut u32) {
    node.id = NodeId(*next);
    *next += 1;
    for child in &mut node.children {
        assign_ids(child, next);
    }
}

/// Named children, extras (comments, line continuations) excluded.
fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

/// Visit `root` and its descendants in pre-order. `f` returns false to skip a
/// node's children.
fn preorder<'t>(root: Node<'t>, mut f: impl FnMut(Node<'t>) -> bool) {
    let mut cursor = root.walk();
    'walk: loop {
        if f(cursor.node()) && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
}

pub(crate) struct Lowerer<'s> {
    source: &'s str,
}

impl<'s> Lowerer<'s> {
    pub(crate) fn new(source: &'s str) -> Self {
        Lowerer { source }
    }

    // ------------------------------------------------------------------
    // Positions
    // ------------------------------------------------------------------

    fn text(&self, node: Node<'_>) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    fn position(&self, byte: usize, row: usize, column: usize) -> Position {
        let line_start = byte.saturating_sub(column);
        let col = self
            .source
            .get(line_start..byte)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(column);
        Position::new(row as u32 + 1, col as u32 + 1)
    }

    fn start(&self, node: Node<'_>) -> Position {
        let point = node.start_position();
        self.position(node.start_byte(), point.row, point.column)
    }

    fn end(&self, node: Node<'_>) -> Position {
        let point = node.end_position();
        self.position(node.end_byte(), point.row, point.column)
    }

    /// Position just past the last character of the file.
    pub(crate) fn eof(&self) -> Position {
        let line = self.source.matches('\n').count() + 1;
        let last = self.source.rsplit('\n').next().unwrap_or("");
        Position::new(line as u32, last.chars().count() as u32 + 1)
    }

    fn code_start(&self, node: Node<'_>) -> Option<Position> {
        if node.is_extra() {
            return None;
        }
        if node.child_count() == 0 {
            return (node.start_byte() < node.end_byte()).then(|| self.start(node));
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        children.into_iter().find_map(|child| self.code_start(child))
    }

    fn code_end(&self, node: Node<'_>) -> Option<Position> {
        if node.is_extra() {
            return None;
        }
        if node.child_count() == 0 {
            return (node.start_byte() < node.end_byte()).then(|| self.end(node));
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        children.into_iter().rev().find_map(|child| self.code_end(child))
    }

    fn span(&self, node: Node<'_>) -> SourceSpan {
        match (self.code_start(node), self.code_end(node)) {
            (Some(start), Some(end)) => SourceSpan::between(start, end),
            _ => SourceSpan::between(self.start(node), self.end(node)),
        }
    }

    // ------------------------------------------------------------------
    // Tokens and errors
    // ------------------------------------------------------------------

    /// The analysis token stream: one code token per leaf (strings whole) and
    /// one comment token per comment.
    ///
    /// A comment is trailing when a code token already ended on its line.
    pub(crate) fn tokens(&self, root: Node<'_>) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut last_code_line = None;
        preorder(root, |node| {
            let atomic = node.child_count() == 0 || node.kind() == kinds::STRING;
            if !atomic {
                return true;
            }
            let span = SourceSpan::between(self.start(node), self.end(node));
            match node.kind() {
                kinds::COMMENT => {
                    let placement = if last_code_line == Some(span.start.line) {
                        CommentPlacement::Trailing
                    } else {
                        CommentPlacement::OwnLine
                    };
                    tokens.push(Token::Comment(CommentToken::new(
                        span,
                        self.text(node),
                        placement,
                    )));
                }
                kinds::LINE_CONTINUATION => {}
                _ if node.start_byte() < node.end_byte() => {
                    last_code_line = Some(span.end.line);
                    tokens.push(Token::code(span));
                }
                _ => {}
            }
            false
        });
        tokens
    }

    /// The first error or missing node in the tree, as a [`ParserError`].
    pub(crate) fn syntax_error(&self, root: Node<'_>) -> Option<ParserError> {
        let mut found = None;
        preorder(root, |node| {
            if found.is_some() {
                return false;
            }
            if node.is_missing() || node.is_error() {
                found = Some(node);
                return false;
            }
            node.has_error()
        });
        let node = found?;
        let position = self.start(node);
        let range = node.byte_range();
        if node.is_missing() {
            let expected = if node.is_named() {
                node.kind().to_string()
            } else {
                format!("'{}'", node.kind())
            };
            return Some(ParserError::Missing {
                expected,
                position,
                range,
            });
        }
        let mut leaf = node;
        while let Some(child) = leaf.child(0) {
            leaf = child;
        }
        let found = match self.text(leaf) {
            "" => "end of file".to_string(),
            text => format!("'{}'", text.lines().next().unwrap_or(text)),
        };
        Some(ParserError::Unexpected {
            found,
            position,
            range,
        })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    /// Lower the statements (or clause contents) under `node`.
    ///
    /// `in_class` is true directly inside a class body, including nested
    /// compound statements, and turns assignments into field declarations.
    pub(crate) fn lower_children(&self, node: Node<'_>, in_class: bool) -> Vec<AstNode> {
        named_children(node)
            .into_iter()
            .flat_map(|child| self.lower(child, in_class))
            .collect()
    }

    fn lower(&self, node: Node<'_>, in_class: bool) -> Vec<AstNode> {
        let kind = node.kind();
        match kind {
            kinds::DECORATED_DEFINITION => self.decorated(node).into_iter().collect(),
            kinds::FUNCTION_DEFINITION => vec![self.function_def(node, node, Vec::new())],
            kinds::CLASS_DEFINITION => vec![self.class_def(node, node, Vec::new())],
            kinds::EXPRESSION_STATEMENT => vec![self.expression_statement(node, in_class)],
            kinds::IMPORT_STATEMENT
            | kinds::IMPORT_FROM_STATEMENT
            | kinds::FUTURE_IMPORT_STATEMENT => {
                vec![make_node(NodeKind::Statement, self.span(node), Vec::new())]
            }
            _ if kinds::STATEMENTS.contains(&kind) => vec![make_node(
                NodeKind::Statement,
                self.span(node),
                self.lower_children(node, in_class),
            )],
            _ if kinds::CLAUSES.contains(&kind) => self.lower_children(node, in_class),
            _ => vec![self.expression(node)],
        }
    }

    fn decorated(&self, node: Node<'_>) -> Option<AstNode> {
        let decorators: Vec<AstNode> = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == kinds::DECORATOR)
            .map(|decorator| {
                make_node(
                    NodeKind::Decorator,
                    self.span(decorator),
                    self.expressions(decorator),
                )
            })
            .collect();
        let definition = node.child_by_field_name("definition")?;
        Some(if definition.kind() == kinds::CLASS_DEFINITION {
            self.class_def(node, definition, decorators)
        } else {
            self.function_def(node, definition, decorators)
        })
    }

    /// `def`/`class` keyword (or `async`) through the colon before the body.
    fn header(&self, definition: Node<'_>) -> SourceSpan {
        let mut cursor = definition.walk();
        let colon = definition
            .children(&mut cursor)
            .find(|child| child.kind() == ":");
        let end = colon
            .or_else(|| definition.child_by_field_name("name"))
            .map(|node| self.end(node))
            .unwrap_or_else(|| self.end(definition));
        SourceSpan::between(self.start(definition), end)
    }

    fn name_of(&self, definition: Node<'_>) -> String {
        definition
            .child_by_field_name("name")
            .map(|name| self.text(name).to_string())
            .unwrap_or_default()
    }

    /// `outer` is the decorated definition when there are decorators.
    fn function_def(
        &self,
        outer: Node<'_>,
        definition: Node<'_>,
        decorators: Vec<AstNode>,
    ) -> AstNode {
        let mut children = decorators;
        if let Some(parameters) = definition.child_by_field_name("parameters") {
            children.extend(self.parameters(parameters));
        }
        if let Some(returns) = definition.child_by_field_name("return_type") {
            children.push(self.expression(returns));
        }
        if let Some(body) = definition.child_by_field_name("body") {
            children.extend(self.lower_children(body, false));
        }
        let kind = NodeKind::FunctionDef {
            name: self.name_of(definition),
            header: self.header(definition),
        };
        make_node(kind, self.span(outer), children)
    }

    fn class_def(&self, outer: Node<'_>, definition: Node<'_>, decorators: Vec<AstNode>) -> AstNode {
        let mut children = decorators;
        if let Some(bases) = definition.child_by_field_name("superclasses") {
            children.extend(self.arguments(bases));
        }
        if let Some(body) = definition.child_by_field_name("body") {
            children.extend(self.lower_children(body, true));
        }
        let kind = NodeKind::ClassDef {
            name: self.name_of(definition),
            header: self.header(definition),
        };
        make_node(kind, self.span(outer), children)
    }

    /// Parameters of a `def` or `lambda`. Bare `*` and `/` markers produce no
    /// node.
    fn parameters(&self, node: Node<'_>) -> Vec<AstNode> {
        named_children(node)
            .into_iter()
            .filter_map(|param| self.parameter(param))
            .collect()
    }

    fn parameter(&self, node: Node<'_>) -> Option<AstNode> {
        let children = match node.kind() {
            kinds::IDENTIFIER | kinds::LIST_SPLAT_PATTERN | kinds::DICTIONARY_SPLAT_PATTERN => {
                Vec::new()
            }
            kinds::TYPED_PARAMETER | kinds::DEFAULT_PARAMETER | kinds::TYPED_DEFAULT_PARAMETER => {
                ["type", "value"]
                    .iter()
                    .filter_map(|field| node.child_by_field_name(field))
                    .map(|part| self.expression(part))
                    .collect()
            }
            _ => return None,
        };
        let name = self.parameter_name(node)?;
        Some(make_node(
            NodeKind::Parameter { name },
            self.span(node),
            children,
        ))
    }

    fn parameter_name(&self, node: Node<'_>) -> Option<String> {
        if node.kind() == kinds::IDENTIFIER {
            return Some(self.text(node).to_string());
        }
        let target = node
            .child_by_field_name("name")
            .or_else(|| named_children(node).into_iter().next())?;
        self.parameter_name(target)
    }

    /// Expression statements and every assignment form.
    fn expression_statement(&self, node: Node<'_>, in_class: bool) -> AstNode {
        let children = named_children(node);
        if let [inner] = children.as_slice() {
            if matches!(
                inner.kind(),
                kinds::ASSIGNMENT | kinds::AUGMENTED_ASSIGNMENT
            ) {
                let target = inner
                    .child_by_field_name("left")
                    .map(|left| self.text(left).to_string())
                    .unwrap_or_default();
                let mut parts = Vec::new();
                self.assignment_parts(*inner, &mut parts);
                let kind = if in_class {
                    NodeKind::FieldDecl { name: target }
                } else {
                    NodeKind::Assignment { target }
                };
                return make_node(kind, self.span(node), parts);
            }
        }
        make_node(
            NodeKind::Statement,
            self.span(node),
            children
                .into_iter()
                .map(|child| self.expression(child))
                .collect(),
        )
    }

    /// Targets, annotation and value, with chained assignments flattened.
    fn assignment_parts(&self, node: Node<'_>, parts: &mut Vec<AstNode>) {
        for field in ["left", "type", "right"] {
            let Some(part) = node.child_by_field_name(field) else {
                continue;
            };
            if matches!(
                part.kind(),
                kinds::ASSIGNMENT | kinds::AUGMENTED_ASSIGNMENT
            ) {
                self.assignment_parts(part, parts);
            } else {
                parts.push(self.expression(part));
            }
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn expressions(&self, node: Node<'_>) -> Vec<AstNode> {
        named_children(node)
            .into_iter()
            .map(|child| self.expression(child))
            .collect()
    }

    /// Arguments of a call or class header.
    fn arguments(&self, node: Node<'_>) -> Vec<AstNode> {
        self.expressions(node)
    }

    /// Lower an expression. Constructs the analysis does not model become an
    /// `Other` node labelled with the tree-sitter kind.
    fn expression(&self, node: Node<'_>) -> AstNode {
        let span = self.span(node);
        let literal = |literal| make_node(NodeKind::Literal { literal }, span, Vec::new());
        let field = |name: &str| node.child_by_field_name(name);
        match node.kind() {
            kinds::IDENTIFIER => make_node(
                NodeKind::Identifier {
                    name: self.text(node).to_string(),
                },
                span,
                Vec::new(),
            ),
            kinds::ATTRIBUTE => {
                let attr = field("attribute")
                    .map(|attr| self.text(attr).to_string())
                    .unwrap_or_default();
                let value = field("object").map(|value| self.expression(value));
                make_node(
                    NodeKind::Attribute { attr },
                    span,
                    value.into_iter().collect(),
                )
            }
            kinds::CALL => {
                let mut children: Vec<AstNode> = field("function")
                    .map(|callee| self.expression(callee))
                    .into_iter()
                    .collect();
                match field("arguments") {
                    Some(args) if args.kind() == kinds::ARGUMENT_LIST => {
                        children.extend(self.arguments(args))
                    }
                    // `f(x for x in xs)`
                    Some(generator) => children.push(self.expression(generator)),
                    None => {}
                }
                make_node(NodeKind::CallExpr, span, children)
            }
            kinds::KEYWORD_ARGUMENT => {
                let name = field("name")
                    .map(|name| self.text(name).to_string())
                    .unwrap_or_default();
                let value = field("value").map(|value| self.expression(value));
                make_node(
                    NodeKind::Keyword { name },
                    span,
                    value.into_iter().collect(),
                )
            }
            kinds::LIST_SPLAT | kinds::DICTIONARY_SPLAT => {
                make_node(NodeKind::Starred, span, self.expressions(node))
            }
            kinds::DICTIONARY => {
                let entries = named_children(node)
                    .into_iter()
                    .map(|entry| self.dict_entry(entry))
                    .collect();
                make_node(NodeKind::DictLiteral, span, entries)
            }
            kinds::PAIR => self.dict_entry(node),
            kinds::YIELD => make_node(NodeKind::YieldExpr, span, self.expressions(node)),
            kinds::PARENTHESIZED_EXPRESSION | kinds::TYPE => match named_children(node).as_slice() {
                [inner] => self.expression(*inner),
                _ => self.other(node, span),
            },
            kinds::STRING | kinds::CONCATENATED_STRING => literal(self.string_kind(node)),
            kinds::INTEGER | kinds::FLOAT => literal(LiteralKind::Number),
            kinds::TRUE | kinds::FALSE => literal(LiteralKind::Bool),
            kinds::NONE => literal(LiteralKind::None),
            kinds::ELLIPSIS => literal(LiteralKind::Ellipsis),
            _ => self.other(node, span),
        }
    }

    fn other(&self, node: Node<'_>, span: SourceSpan) -> AstNode {
        let children = named_children(node)
            .into_iter()
            .flat_map(|child| {
                if child.kind() == kinds::LAMBDA_PARAMETERS {
                    self.parameters(child)
                } else {
                    vec![self.expression(child)]
                }
            })
            .collect();
        let kind = NodeKind::Other {
            label: node.kind().to_string(),
        };
        make_node(kind, span, children)
    }

    /// `key: value`, or `**mapping` wrapped as a single starred child.
    fn dict_entry(&self, node: Node<'_>) -> AstNode {
        let span = self.span(node);
        match node.kind() {
            kinds::PAIR => make_node(NodeKind::DictEntry, span, self.expressions(node)),
            kinds::DICTIONARY_SPLAT => {
                make_node(NodeKind::DictEntry, span, vec![self.expression(node)])
            }
            _ => self.expression(node),
        }
    }

    /// Bytes when the first piece carries a `b` prefix.
    fn string_kind(&self, node: Node<'_>) -> LiteralKind {
        let first = if node.kind() == kinds::CONCATENATED_STRING {
            named_children(node).into_iter().next().unwrap_or(node)
        } else {
            node
        };
        if string_prefix(self.text(first)).contains(['b', 'B']) {
            LiteralKind::Bytes
        } else {
            LiteralKind::String
        }
    }
}

/// The alphabetic prefix of a string literal (`rb` in `rb'x'`).
fn string_prefix(text: &str) -> &str {
    let end = text.find(['\'', '"']).unwrap_or(0);
    &text[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_prefix() {
        assert_eq!(string_prefix("rb'x'"), "rb");
        assert_eq!(string_prefix("'x'"), "");
        assert_eq!(string_prefix("F\"{x}\""), "F");
    }

    #[test]
    fn test_eof_position() {
        assert_eq!(Lowerer::new("").eof(), Position::new(1, 1));
        assert_eq!(Lowerer::new("x = 1\n").eof(), Position::new(2, 1));
        assert_eq!(Lowerer::new("x = 'é'").eof(), Position::new(1, 8));
    }
}

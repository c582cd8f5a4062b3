//! The AST contract consumed from a syntax provider.
//!
//! # Node Identity
//!
//! [`NodeId`] provides stable identity for nodes. Providers assign ids in
//! pre-order (parent before children, left-to-right), so the same source
//! always produces the same ids:
//!
//! ```text
//! Given code: x = f(1)
//!   NodeId(0) -> Module
//!   NodeId(1) -> Assignment "x"
//!   NodeId(2) -> Identifier "x"
//!   NodeId(3) -> CallExpr
//!   NodeId(4) -> Identifier "f"
//!   NodeId(5) -> Literal 1
//! ```
//!
//! # Ownership
//!
//! Parents own their children outright. There are no parent pointers; analyses
//! that need ancestry keep a stack while walking (see [`crate::visitor`]).
//!
//! # Child Layout
//!
//! Some kinds give their children positional meaning:
//!
//! - `CallExpr`: `[callee, arg0, arg1, ...]`
//! - `Attribute`: `[value]` (the expression before the dot)
//! - `Keyword`, `Starred`: `[value]`
//! - `DictEntry`: `[key, value]`, or `[Starred]` for `**mapping`
//! - `ClassDef` / `FunctionDef`: decorators first, then header children, then body

use serde::{Deserialize, Serialize};

use crate::span::{Position, SourceSpan};

/// A stable, unique identifier for an AST node within one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// The flavor of a literal constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    String,
    Bytes,
    Number,
    /// `True` / `False`.
    Bool,
    None,
    Ellipsis,
}

/// Node kind with kind-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Module,
    /// `header` covers `class Name(...):`, decorators excluded.
    ClassDef { name: String, header: SourceSpan },
    /// An assignment or annotated declaration directly in a class body.
    FieldDecl { name: String },
    /// `header` covers `def name(...) -> T:`, decorators excluded.
    FunctionDef { name: String, header: SourceSpan },
    Parameter { name: String },
    Decorator,
    /// `target` is the source rendering of the first assignment target.
    Assignment { target: String },
    DictLiteral,
    DictEntry,
    CallExpr,
    Attribute { attr: String },
    Identifier { name: String },
    Literal { literal: LiteralKind },
    /// A keyword argument `name=value`.
    Keyword { name: String },
    /// `*value` or `**value` in an argument list or display.
    Starred,
    YieldExpr,
    /// Any statement without a more specific kind.
    Statement,
    /// A construct the analysis does not model. Children are still walked.
    Other { label: String },
}

impl NodeKind {
    /// The fieldless tag for this kind.
    pub fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Module => NodeTag::Module,
            NodeKind::ClassDef { .. } => NodeTag::ClassDef,
            NodeKind::FieldDecl { .. } => NodeTag::FieldDecl,
            NodeKind::FunctionDef { .. } => NodeTag::FunctionDef,
            NodeKind::Parameter { .. } => NodeTag::Parameter,
            NodeKind::Decorator => NodeTag::Decorator,
            NodeKind::Assignment { .. } => NodeTag::Assignment,
            NodeKind::DictLiteral => NodeTag::DictLiteral,
            NodeKind::DictEntry => NodeTag::DictEntry,
            NodeKind::CallExpr => NodeTag::CallExpr,
            NodeKind::Attribute { .. } => NodeTag::Attribute,
            NodeKind::Identifier { .. } => NodeTag::Identifier,
            NodeKind::Literal { .. } => NodeTag::Literal,
            NodeKind::Keyword { .. } => NodeTag::Keyword,
            NodeKind::Starred => NodeTag::Starred,
            NodeKind::YieldExpr => NodeTag::YieldExpr,
            NodeKind::Statement => NodeTag::Statement,
            NodeKind::Other { .. } => NodeTag::Other,
        }
    }

    /// The name carried by the kind, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            NodeKind::ClassDef { name, .. }
            | NodeKind::FieldDecl { name }
            | NodeKind::FunctionDef { name, .. }
            | NodeKind::Parameter { name }
            | NodeKind::Identifier { name }
            | NodeKind::Keyword { name } => Some(name),
            NodeKind::Assignment { target } => Some(target),
            NodeKind::Attribute { attr } => Some(attr),
            NodeKind::Other { label } => Some(label),
            _ => None,
        }
    }

    /// Definition header, for kinds that have one.
    pub fn header(&self) -> Option<SourceSpan> {
        match self {
            NodeKind::ClassDef { header, .. } | NodeKind::FunctionDef { header, .. } => {
                Some(*header)
            }
            _ => None,
        }
    }
}

/// Fieldless mirror of [`NodeKind`], used in reports and for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeTag {
    Module,
    ClassDef,
    FieldDecl,
    FunctionDef,
    Parameter,
    Decorator,
    Assignment,
    DictLiteral,
    DictEntry,
    CallExpr,
    Attribute,
    Identifier,
    Literal,
    Keyword,
    Starred,
    YieldExpr,
    Statement,
    Other,
}

impl NodeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeTag::Module => "module",
            NodeTag::ClassDef => "class_def",
            NodeTag::FieldDecl => "field_decl",
            NodeTag::FunctionDef => "function_def",
            NodeTag::Parameter => "parameter",
            NodeTag::Decorator => "decorator",
            NodeTag::Assignment => "assignment",
            NodeTag::DictLiteral => "dict_literal",
            NodeTag::DictEntry => "dict_entry",
            NodeTag::CallExpr => "call_expr",
            NodeTag::Attribute => "attribute",
            NodeTag::Identifier => "identifier",
            NodeTag::Literal => "literal",
            NodeTag::Keyword => "keyword",
            NodeTag::Starred => "starred",
            NodeTag::YieldExpr => "yield_expr",
            NodeTag::Statement => "statement",
            NodeTag::Other => "other",
        }
    }

    /// Kinds a comment can document.
    pub fn is_comment_bearing(&self) -> bool {
        matches!(
            self,
            NodeTag::ClassDef
                | NodeTag::FieldDecl
                | NodeTag::FunctionDef
                | NodeTag::Parameter
                | NodeTag::Decorator
                | NodeTag::Assignment
                | NodeTag::DictEntry
                | NodeTag::Statement
        )
    }

    /// Kinds that own an indented body of statements.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeTag::Module | NodeTag::ClassDef | NodeTag::FunctionDef
        )
    }

    /// Kinds that can hold interior comments between their own tokens.
    pub fn is_interior_container(&self) -> bool {
        matches!(
            self,
            NodeTag::CallExpr
                | NodeTag::DictLiteral
                | NodeTag::DictEntry
                | NodeTag::Statement
                | NodeTag::Assignment
                | NodeTag::FieldDecl
                | NodeTag::Parameter
        )
    }
}

impl std::fmt::Display for NodeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node in the provider's AST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AstNode {
    pub id: NodeId,
    pub span: SourceSpan,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(id: NodeId, kind: NodeKind, span: SourceSpan) -> Self {
        AstNode {
            id,
            span,
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<AstNode>) -> Self {
        self.children = children;
        self
    }

    pub fn tag(&self) -> NodeTag {
        self.kind.tag()
    }

    pub fn name(&self) -> Option<&str> {
        self.kind.name()
    }

    /// The token a leading comment block must sit directly above.
    ///
    /// For definitions this is the `def`/`class` keyword rather than the first
    /// decorator, which is what makes decorators transparent for attachment.
    pub fn lead(&self) -> Position {
        self.kind
            .header()
            .map(|header| header.start)
            .unwrap_or(self.span.start)
    }

    /// The position a same-line trailing comment is measured against.
    pub fn trailing_anchor(&self) -> Position {
        self.kind
            .header()
            .map(|header| header.end)
            .unwrap_or(self.span.end)
    }

    /// Callee and arguments of a `CallExpr`.
    pub fn call_parts(&self) -> Option<(&AstNode, &[AstNode])> {
        match self.kind {
            NodeKind::CallExpr => self.children.split_first(),
            _ => None,
        }
    }

    /// The expression before the dot of an `Attribute`.
    pub fn attribute_value(&self) -> Option<&AstNode> {
        match self.kind {
            NodeKind::Attribute { .. } => self.children.first(),
            _ => None,
        }
    }

    /// True for literal constants.
    pub fn is_literal(&self) -> bool {
        matches!(self.kind, NodeKind::Literal { .. })
    }

    /// Find a node by id, depth-first.
    pub fn find(&self, id: NodeId) -> Option<&AstNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(AstNode::node_count).sum::<usize>()
    }

    /// Summarize this node for a report.
    pub fn to_ref(&self) -> NodeRef {
        NodeRef {
            id: self.id,
            kind: self.tag(),
            name: self.name().map(str::to_string),
            span: self.span,
        }
    }

    /// Render an indented outline of the subtree, one node per line.
    ///
    /// ```text
    /// module 1:1-3:1
    ///   assignment "x" 1:1-1:6
    ///     identifier "x" 1:1-1:2
    /// ```
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        use std::fmt::Write;

        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(self.tag().as_str());
        if let NodeKind::Literal { literal } = &self.kind {
            let _ = write!(out, " {:?}", literal);
        } else if let Some(name) = self.name() {
            let _ = write!(out, " {:?}", name);
        }
        let _ = writeln!(out, " {}", self.span);
        for child in &self.children {
            child.dump_into(out, depth + 1);
        }
    }
}

/// A serializable reference to a node, detached from the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: NodeId,
    pub kind: NodeTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub span: SourceSpan,
}

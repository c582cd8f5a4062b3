// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Python syntax provider for glint.
//!
//! Turns Python source text into the [`ParsedSource`] bundle the analysis
//! consumes: a line index, the full token stream with comments, and an AST
//! whose nodes carry stable pre-order ids.
//!
//! Parsing is done by tree-sitter with the `tree-sitter-python` grammar, so
//! every construct of current Python parses. The lowering pass models the
//! forms the analysis cares about (definitions, decorators, assignments,
//! calls, attribute chains, literals, dict displays) and keeps the rest as
//! generic nodes so that spans stay accurate.
//!
//! # Quick Start
//!
//! ```
//! use glint_python::parse_module;
//!
//! let parsed = parse_module("x = f(1)  # note\n").expect("parse error");
//! assert_eq!(parsed.comments().count(), 1);
//! assert_eq!(parsed.module.children.len(), 1);
//! ```

use std::cmp::{max, min};

mod errors;
mod lower;
mod node_kinds;

pub use errors::{ParserError, Result};

use glint_core::{AstNode, LineIndex, NodeId, NodeKind, ParsedSource, Position, SourceSpan};
use tracing::debug;
use tree_sitter::{Parser, Tree};

use lower::{assign_ids, Lowerer};

/// Parse Python source into a tree-sitter tree.
///
/// The tree may contain error nodes; [`parse_module`] rejects those.
///
/// # Errors
///
/// Returns a [`ParserError::Language`] if the grammar cannot be loaded.
pub fn parse_tree(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ParserError::Language {
            message: e.to_string(),
        })?;
    parser.parse(source, None).ok_or(ParserError::NoTree)
}

/// Parse a Python module.
///
/// A leading UTF-8 byte order mark is ignored.
///
/// # Errors
///
/// Returns a [`ParserError`] if the source does not parse.
pub fn parse_module(mut source: &str) -> Result<ParsedSource> {
    if let Some(stripped) = source.strip_prefix('\u{feff}') {
        source = stripped;
    }
    let tree = parse_tree(source)?;
    let root = tree.root_node();
    let lowerer = Lowerer::new(source);
    if root.has_error() {
        if let Some(error) = lowerer.syntax_error(root) {
            return Err(error);
        }
    }

    let tokens = lowerer.tokens(root);
    let mut module = AstNode::new(
        NodeId(0),
        NodeKind::Module,
        SourceSpan::between(Position::new(1, 1), lowerer.eof()),
    )
    .with_children(lowerer.lower_children(root, false));
    let mut next = 0;
    assign_ids(&mut module, &mut next);

    debug!(
        tokens = tokens.len(),
        nodes = next,
        "parsed python module"
    );
    Ok(ParsedSource::new(
        LineIndex::from_source(source),
        tokens,
        module,
    ))
}

// ============================================================================
// Error formatting
// ============================================================================

/// Returns the byte offset of the beginning of line `n` (1-indexed).
fn bol_offset(source: &str, n: i64) -> usize {
    if n <= 1 {
        return 0;
    }
    source
        .match_indices('\n')
        .nth((n - 2) as usize)
        .map(|(index, _)| index + 1)
        .unwrap_or(source.len())
}

/// Formats a parser error into a human-readable string with source context.
///
/// # Arguments
///
/// * `err` - The parser error to format.
/// * `source` - The text that failed to parse.
/// * `label` - A label for the error (e.g., file name).
///
/// # Example
///
/// ```
/// use glint_python::{parse_module, prettify_error};
///
/// let source = "def";
/// if let Err(e) = parse_module(source) {
///     let formatted = prettify_error(&e, source, "example.py");
///     assert!(formatted.contains("example.py"));
/// }
/// ```
pub fn prettify_error(err: &ParserError, source: &str, label: &str) -> String {
    use annotate_snippets::{Level, Renderer, Snippet};

    let (Some(position), Some(range)) = (err.position(), err.range()) else {
        return format!("{}: {}", label, err);
    };
    let message = format!("{} at {}", err.message(), position);

    let context = 1;
    let line = i64::from(position.line);
    let line_start = max(1, line - context) as usize;
    let start_offset = bol_offset(source, line - context);
    let end_offset = bol_offset(source, line + context + 1);
    let snippet = source.get(start_offset..end_offset).unwrap_or("");
    let start = range.start.saturating_sub(start_offset).min(snippet.len());
    let end = range.end.saturating_sub(start_offset).min(snippet.len());
    let end = if start == end {
        min(end + 1, snippet.len() + 1)
    } else {
        end
    };
    // The rendered message borrows `message`; finish rendering before it drops.
    #[allow(clippy::let_and_return)]
    let rendered = Renderer::plain()
        .render(
            Level::Error.title(label).snippet(
                Snippet::source(snippet)
                    .line_start(line_start)
                    .fold(false)
                    .annotations(vec![Level::Error.span(start..end).label(&message)]),
            ),
        )
        .to_string();
    rendered
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod test {
    use super::*;
    use glint_core::{CommentPlacement, LiteralKind, NodeTag};

    fn kinds(node: &AstNode) -> Vec<NodeTag> {
        node.children.iter().map(AstNode::tag).collect()
    }

    #[test]
    fn test_unterminated_string() {
        let err = parse_module("x = 'abc").unwrap_err();
        assert_eq!(err.position().map(|p| p.line), Some(1));
    }

    #[test]
    fn test_bare_minimum_funcdef() {
        parse_module("def f(): ...").expect("parse error");
    }

    #[test]
    fn test_single_statement_with_no_newline() {
        for src in &[
            "(\n \\\n)",
            "del _",
            "if _:\n    '''\n)'''",
            "if _:\n    ('''\n''')",
            "x = [i for i in range(3) if i]",
            "async def f():\n    await g()",
            "with open(p) as f, lock:\n    pass",
            "try:\n    pass\nexcept (A, B) as e:\n    raise\nfinally:\n    pass",
            "from . import (a as b, c,)",
            "lambda x, *a, k=1, **kw: x",
            "a[1:2, ::3] = b if c else d",
            "print(*args, sep='', **kw)",
            "def g():\n    yield\n    yield x, y\n    z = yield from h()",
        ] {
            let parsed =
                parse_module(src).unwrap_or_else(|e| panic!("'{}' doesn't parse: {}", src, e));
            assert_eq!(parsed.validate(), Ok(()), "{}", src);
        }
    }

    #[test]
    fn test_modern_syntax() {
        for src in &[
            "match x:\n    case 1: pass\n",
            "match p:\n    case Point(x=0) | None:\n        setattr(p, 'a', 1)\n    case _:\n        pass\n",
            "type X = int\n",
            "f\"{d[\"k\"]}\"\n",
            "def f[T](x: T) -> T:\n    return x\n",
        ] {
            let parsed =
                parse_module(src).unwrap_or_else(|e| panic!("'{}' doesn't parse: {}", src, e));
            assert_eq!(parsed.validate(), Ok(()), "{}", src);
        }
    }

    #[test]
    fn test_calls_inside_match_cases_are_lowered() {
        let parsed = parse_module(
            "match p:\n    case Point(x=0):\n        setattr(p, 'a', 1)\n",
        )
        .unwrap();
        let statement = &parsed.module.children[0];
        assert_eq!(statement.tag(), NodeTag::Statement);
        let calls: Vec<&AstNode> = statement
            .children
            .iter()
            .filter(|child| child.tag() == NodeTag::Statement)
            .flat_map(|child| child.children.iter())
            .filter(|child| child.tag() == NodeTag::CallExpr)
            .collect();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].span, SourceSpan::new(3, 9, 3, 27));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_module("def (x):\n    pass\n").unwrap_err();
        let position = err.position().expect("syntax errors have a position");
        assert_eq!(position.line, 1);
        assert!(err.range().is_some());
        assert!(err.to_string().starts_with("syntax error at 1:"), "{}", err);
    }

    #[test]
    fn test_ids_are_preorder() {
        let parsed = parse_module("x = f(1)\n").unwrap();
        let module = &parsed.module;
        assert_eq!(module.id, NodeId(0));
        assert_eq!(module.node_count(), 6);
        let call = module.find(NodeId(3)).unwrap();
        assert_eq!(call.tag(), NodeTag::CallExpr);
        assert_eq!(call.span, SourceSpan::new(1, 5, 1, 9));
        assert_eq!(module.find(NodeId(4)).and_then(AstNode::name), Some("f"));
        assert_eq!(
            module.find(NodeId(5)).map(|n| n.kind.clone()),
            Some(NodeKind::Literal {
                literal: LiteralKind::Number
            })
        );
    }

    #[test]
    fn test_module_span_reaches_eof() {
        let parsed = parse_module("x = 1\n").unwrap();
        assert_eq!(parsed.module.span, SourceSpan::new(1, 1, 2, 1));
        assert_eq!(parsed.validate(), Ok(()));
    }

    #[test]
    fn test_class_fields_and_methods() {
        let parsed = parse_module(
            "@dataclass\nclass One:\n    two: int = 1\n    three = 2\n    def four(self, five=False):\n        local = 3\n",
        )
        .unwrap();
        let class = &parsed.module.children[0];
        assert_eq!(class.name(), Some("One"));
        assert_eq!(class.span.start, Position::new(1, 1));
        assert_eq!(class.lead(), Position::new(2, 1));
        assert_eq!(
            kinds(class),
            vec![
                NodeTag::Decorator,
                NodeTag::FieldDecl,
                NodeTag::FieldDecl,
                NodeTag::FunctionDef
            ]
        );
        let method = &class.children[3];
        assert_eq!(
            kinds(method),
            vec![NodeTag::Parameter, NodeTag::Parameter, NodeTag::Assignment]
        );
        assert_eq!(method.children[1].name(), Some("five"));
        assert_eq!(method.children[2].name(), Some("local"));
        assert_eq!(parsed.validate(), Ok(()));
    }

    #[test]
    fn test_function_header_span() {
        let parsed = parse_module("def f(a,\n      b) -> int:\n    return a\n").unwrap();
        let def = &parsed.module.children[0];
        assert_eq!(def.kind.header(), Some(SourceSpan::new(1, 1, 2, 17)));
        assert_eq!(def.span, SourceSpan::new(1, 1, 3, 13));
    }

    #[test]
    fn test_trailing_comment_does_not_widen_body() {
        let parsed = parse_module("def f():\n    x = 1\n    # end of f\n").unwrap();
        let def = &parsed.module.children[0];
        assert_eq!(def.span, SourceSpan::new(1, 1, 2, 10));
        assert_eq!(parsed.comments().count(), 1);
    }

    #[test]
    fn test_star_parameters() {
        let parsed = parse_module("def f(a, /, *args: int, b, **kw):\n    pass\n").unwrap();
        let names: Vec<&str> = parsed.module.children[0]
            .children
            .iter()
            .filter(|c| c.tag() == NodeTag::Parameter)
            .filter_map(AstNode::name)
            .collect();
        assert_eq!(names, vec!["a", "args", "b", "kw"]);
    }

    #[test]
    fn test_dict_entries_and_keywords() {
        let parsed = parse_module("d = {'a': 1, **rest}\nf(x, key=2, *more)\n").unwrap();
        let dict = &parsed.module.children[0].children[1];
        assert_eq!(dict.tag(), NodeTag::DictLiteral);
        assert_eq!(kinds(dict), vec![NodeTag::DictEntry, NodeTag::DictEntry]);
        assert_eq!(kinds(&dict.children[1]), vec![NodeTag::Starred]);

        let call = &parsed.module.children[1].children[0];
        assert_eq!(
            kinds(call),
            vec![
                NodeTag::Identifier,
                NodeTag::Identifier,
                NodeTag::Keyword,
                NodeTag::Starred
            ]
        );
    }

    #[test]
    fn test_string_literal_kinds() {
        let parsed = parse_module("a = b'x'\nb = 'y' 'z'\nc = None\n").unwrap();
        let literal = |i: usize| parsed.module.children[i].children[1].kind.clone();
        assert_eq!(
            literal(0),
            NodeKind::Literal {
                literal: LiteralKind::Bytes
            }
        );
        assert_eq!(
            literal(1),
            NodeKind::Literal {
                literal: LiteralKind::String
            }
        );
        assert_eq!(parsed.module.children[1].children[1].span, SourceSpan::new(2, 5, 2, 12));
        assert_eq!(
            literal(2),
            NodeKind::Literal {
                literal: LiteralKind::None
            }
        );
    }

    #[test]
    fn test_columns_count_chars() {
        let parsed = parse_module("s = 'é'; setattr(x, 'a', 1)\n").unwrap();
        let call = &parsed.module.children[1].children[0];
        assert_eq!(call.tag(), NodeTag::CallExpr);
        assert_eq!(call.span, SourceSpan::new(1, 10, 1, 28));
        assert_eq!(parsed.validate(), Ok(()));
    }

    #[test]
    fn test_comment_placement() {
        let parsed = parse_module("# own\nx = 1  # trailing\n    # indented\n").unwrap();
        let placements: Vec<_> = parsed.comments().map(|c| c.placement).collect();
        assert_eq!(
            placements,
            vec![
                CommentPlacement::OwnLine,
                CommentPlacement::Trailing,
                CommentPlacement::OwnLine
            ]
        );
        assert_eq!(parsed.validate(), Ok(()));
    }

    #[test]
    fn test_bom_is_ignored() {
        let parsed = parse_module("\u{feff}x = 1\n").unwrap();
        assert_eq!(parsed.module.children[0].span, SourceSpan::new(1, 1, 1, 6));
    }

    #[test]
    fn test_prettify_error() {
        let source = "x = 1\ndef (y):\n    pass\n";
        let err = parse_module(source).unwrap_err();
        let pretty = prettify_error(&err, source, "sample.py");
        assert!(pretty.contains("sample.py"));
        assert!(pretty.contains(&err.message()));
        assert!(pretty.contains("def (y):"));
    }

    #[test]
    fn test_prettify_error_without_position() {
        let pretty = prettify_error(&ParserError::NoTree, "x = 1\n", "sample.py");
        assert_eq!(pretty, "sample.py: tree-sitter produced no tree");
    }

    #[test]
    fn bol_offset_first_line() {
        assert_eq!(0, bol_offset("hello", 1));
        assert_eq!(0, bol_offset("hello", 0));
        assert_eq!(0, bol_offset("hello\nhello", 1));
    }

    #[test]
    fn bol_offset_later_lines() {
        assert_eq!(5, bol_offset("hello", 2));
        assert_eq!(6, bol_offset("hello\nhello", 2));
        assert_eq!(12, bol_offset("hello\nhello\nhello", 3));
    }
}

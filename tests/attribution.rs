//! Comment attribution over the Python fixture.
//!
//! Each test looks a comment up by its text and checks which node owns it.

#![cfg(feature = "python")]

use std::fs;
use std::path::PathBuf;

use glint::glint_core::{NodeTag, ParsedSource};
use glint::{attach_comments, AttachRelation, AttachTarget, CommentAttachment};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/python")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {}: {}", path.display(), e))
}

fn parse(source: &str) -> ParsedSource {
    glint::glint_python::parse_module(source).expect("fixture parses")
}

fn attachments() -> Vec<CommentAttachment> {
    let parsed = parse(&fixture("annotations.py"));
    parsed.validate().expect("valid input");
    attach_comments(&parsed)
}

fn find<'a>(attachments: &'a [CommentAttachment], text: &str) -> &'a CommentAttachment {
    attachments
        .iter()
        .find(|a| a.comment.text == text)
        .unwrap_or_else(|| panic!("no comment {:?}", text))
}

fn owner(attachment: &CommentAttachment) -> (NodeTag, Option<&str>) {
    let node = attachment.target.node().expect("attached to a node");
    (node.kind, node.name.as_deref())
}

#[test]
fn every_comment_attached_once() {
    let attachments = attachments();
    assert_eq!(attachments.len(), 12);
    let lines: Vec<u32> = attachments.iter().map(|a| a.comment.line()).collect();
    let mut sorted = lines.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(lines, sorted);
}

#[test]
fn field_comment_stays_on_its_field() {
    let attachments = attachments();
    let answer = find(&attachments, "# the answer");
    assert_eq!(answer.relation, AttachRelation::SameLineTrailing);
    assert_eq!(owner(answer), (NodeTag::FieldDecl, Some("two")));

    assert!(!attachments.iter().any(|a| a
        .target
        .node()
        .is_some_and(|n| n.name.as_deref() == Some("three"))));
}

#[test]
fn decorators_are_transparent() {
    let attachments = attachments();

    let above = find(&attachments, "# above the decorators");
    assert_eq!(above.relation, AttachRelation::LeadingBlock);
    assert_eq!(owner(above).0, NodeTag::Decorator);
    assert_eq!(above.target.node().map(|n| n.span.start.line), Some(18));

    let between = find(&attachments, "# between decorator and def");
    assert_eq!(between.relation, AttachRelation::LeadingBlock);
    assert_eq!(owner(between), (NodeTag::FunctionDef, Some("four")));

    let module_docs = find(&attachments, "# module docs");
    assert_eq!(owner(module_docs).0, NodeTag::Decorator);
}

#[test]
fn leading_run_attaches_as_a_unit() {
    let attachments = attachments();
    let first = find(&attachments, "# a comment");
    let second = find(&attachments, "# with multiple lines");
    assert_eq!(first.target, second.target);
    assert_eq!(owner(first), (NodeTag::Assignment, Some("seven")));

    let six = find(&attachments, "# leading six");
    assert_eq!(owner(six), (NodeTag::FunctionDef, Some("six")));
}

#[test]
fn dict_entry_comments_are_local() {
    let attachments = attachments();

    let first = find(&attachments, "# first entry");
    assert_eq!(first.relation, AttachRelation::SameLineTrailing);
    assert_eq!(owner(first).0, NodeTag::DictEntry);
    assert_eq!(first.target.node().map(|n| n.span.start.line), Some(28));

    let before_b = find(&attachments, "# before b");
    assert_eq!(before_b.relation, AttachRelation::LeadingBlock);
    assert_eq!(owner(before_b).0, NodeTag::DictEntry);
    assert_eq!(before_b.target.node().map(|n| n.span.start.line), Some(30));

    let letters = find(&attachments, "# letters");
    assert_eq!(owner(letters).0, NodeTag::DictEntry);
    assert_eq!(letters.target.node().map(|n| n.span.start.line), Some(40));
}

#[test]
fn unowned_comments_are_orphans_in_module() {
    let attachments = attachments();
    for text in ["#!/usr/bin/env python", "# trailing orphan"] {
        let orphan = find(&attachments, text);
        assert_eq!(orphan.relation, AttachRelation::Detached);
        match &orphan.target {
            AttachTarget::Orphan { context } => assert_eq!(context.kind, NodeTag::Module),
            other => panic!("expected orphan, got {:?}", other),
        }
    }
}

#[test]
fn orphan_context_is_innermost_block() {
    let source = "class A:\n    x = 1\n\n    # dangling\n\n    y = 2\n";
    let attachments = attach_comments(&parse(source));
    match &attachments[0].target {
        AttachTarget::Orphan { context } => {
            assert_eq!(context.kind, NodeTag::ClassDef);
            assert_eq!(context.name.as_deref(), Some("A"));
        }
        other => panic!("expected orphan, got {:?}", other),
    }
}

fn orphan_context(attachment: &CommentAttachment) -> (NodeTag, Option<&str>) {
    match &attachment.target {
        AttachTarget::Orphan { context } => (context.kind, context.name.as_deref()),
        other => panic!("expected orphan, got {:?}", other),
    }
}

#[test]
fn comment_closing_a_function_body_stays_in_the_function() {
    let attachments = attach_comments(&parse("def f():\n    x = 1\n    # end of f\n"));
    assert_eq!(attachments[0].relation, AttachRelation::Detached);
    assert_eq!(orphan_context(&attachments[0]), (NodeTag::FunctionDef, Some("f")));
}

#[test]
fn comment_closing_a_class_body_stays_in_the_class() {
    let source = "class A:\n    def m(self):\n        pass\n\n    # end of A\n\nx = 1\n";
    let attachments = attach_comments(&parse(source));
    assert_eq!(orphan_context(&attachments[0]), (NodeTag::ClassDef, Some("A")));
}

#[test]
fn comment_closing_a_method_body_stays_in_the_method() {
    let source = "class A:\n    def m(self):\n        pass\n        # end of m\n\n    y = 2\n";
    let attachments = attach_comments(&parse(source));
    assert_eq!(orphan_context(&attachments[0]), (NodeTag::FunctionDef, Some("m")));
}

#[test]
fn dedented_comment_after_a_body_is_in_the_module() {
    let source = "def f():\n    x = 1\n# after f\n\ny = 2\n";
    let attachments = attach_comments(&parse(source));
    assert_eq!(orphan_context(&attachments[0]), (NodeTag::Module, None));
}

#[test]
fn comment_in_call_arguments_is_enclosed() {
    let source = "f(\n    1,\n    # nothing follows\n)\n";
    let attachments = attach_comments(&parse(source));
    assert_eq!(attachments[0].relation, AttachRelation::Enclosed);
    assert_eq!(owner(&attachments[0]).0, NodeTag::CallExpr);
}

#[test]
fn trailing_comment_on_def_line_documents_the_def() {
    let source = "def f(a,  # first\n      b):  # the function\n    pass\n";
    let attachments = attach_comments(&parse(source));
    assert_eq!(owner(&attachments[0]), (NodeTag::Parameter, Some("a")));
    assert_eq!(owner(&attachments[1]), (NodeTag::FunctionDef, Some("f")));
}

#[test]
fn comment_only_file() {
    let attachments = attach_comments(&parse("# just a note\n"));
    assert_eq!(attachments.len(), 1);
    assert!(attachments[0].target.is_orphan());
}

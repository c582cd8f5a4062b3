//! Visitor infrastructure for AST traversal.
//!
//! # Traversal Order
//!
//! - **Depth-first, pre-order** for `visit_*` methods
//! - **Post-order** for `leave_*` methods
//! - Children are visited in source order
//!
//! [`Visitor::visit_node`] is called for every node and dispatches to the
//! kind-specific hooks by default. Implementors override whichever layer they
//! need:
//!
//! ```ignore
//! use glint_core::visitor::{walk, VisitResult, Visitor};
//!
//! struct CallCounter {
//!     count: usize,
//! }
//!
//! impl<'a> Visitor<'a> for CallCounter {
//!     fn visit_call(&mut self, _node: &'a AstNode) -> VisitResult {
//!         self.count += 1;
//!         VisitResult::Continue
//!     }
//! }
//! ```

use crate::ast::{AstNode, NodeKind};

/// Result of visiting a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Continue traversal into children.
    #[default]
    Continue,
    /// Skip children, continue with siblings. `leave_*` is still called.
    SkipChildren,
    /// Stop traversal entirely.
    Stop,
}

/// Read-only AST visitor.
///
/// The lifetime `'a` is the lifetime of the tree, so visitors may keep
/// references to nodes they have seen.
#[allow(unused_variables)]
pub trait Visitor<'a> {
    /// Called before descending into any node.
    fn visit_node(&mut self, node: &'a AstNode) -> VisitResult {
        match node.kind {
            NodeKind::Module => self.visit_module(node),
            NodeKind::ClassDef { .. } => self.visit_class_def(node),
            NodeKind::FunctionDef { .. } => self.visit_function_def(node),
            NodeKind::Decorator => self.visit_decorator(node),
            NodeKind::CallExpr => self.visit_call(node),
            NodeKind::DictLiteral => self.visit_dict(node),
            _ => VisitResult::Continue,
        }
    }

    /// Called after all children of any node have been visited.
    fn leave_node(&mut self, node: &'a AstNode) {
        match node.kind {
            NodeKind::Module => self.leave_module(node),
            NodeKind::ClassDef { .. } => self.leave_class_def(node),
            NodeKind::FunctionDef { .. } => self.leave_function_def(node),
            NodeKind::Decorator => self.leave_decorator(node),
            NodeKind::CallExpr => self.leave_call(node),
            NodeKind::DictLiteral => self.leave_dict(node),
            _ => {}
        }
    }

    fn visit_module(&mut self, node: &'a AstNode) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_module(&mut self, node: &'a AstNode) {}

    fn visit_class_def(&mut self, node: &'a AstNode) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_class_def(&mut self, node: &'a AstNode) {}

    fn visit_function_def(&mut self, node: &'a AstNode) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_function_def(&mut self, node: &'a AstNode) {}

    fn visit_decorator(&mut self, node: &'a AstNode) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_decorator(&mut self, node: &'a AstNode) {}

    fn visit_call(&mut self, node: &'a AstNode) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_call(&mut self, node: &'a AstNode) {}

    fn visit_dict(&mut self, node: &'a AstNode) -> VisitResult {
        VisitResult::Continue
    }
    fn leave_dict(&mut self, node: &'a AstNode) {}
}

/// Walk `node` and its subtree with `visitor`.
///
/// Returns `VisitResult::Stop` if the visitor stopped the walk, so callers
/// composing walks can propagate it.
pub fn walk<'a, V: Visitor<'a> + ?Sized>(visitor: &mut V, node: &'a AstNode) -> VisitResult {
    match visitor.visit_node(node) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            for child in &node.children {
                if walk(visitor, child) == VisitResult::Stop {
                    return VisitResult::Stop;
                }
            }
        }
    }
    visitor.leave_node(node);
    VisitResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeId;
    use crate::span::SourceSpan;

    fn node(id: u32, kind: NodeKind) -> AstNode {
        AstNode::new(NodeId(id), kind, SourceSpan::new(1, 1, 1, 2))
    }

    fn tree() -> AstNode {
        let inner_call = node(3, NodeKind::CallExpr).with_children(vec![node(
            4,
            NodeKind::Identifier {
                name: "g".to_string(),
            },
        )]);
        let outer_call = node(1, NodeKind::CallExpr).with_children(vec![
            node(
                2,
                NodeKind::Identifier {
                    name: "f".to_string(),
                },
            ),
            inner_call,
        ]);
        node(0, NodeKind::Module).with_children(vec![outer_call, node(5, NodeKind::CallExpr)])
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        skip_calls: bool,
        stop_at: Option<u32>,
    }

    impl<'a> Visitor<'a> for Recorder {
        fn visit_node(&mut self, node: &'a AstNode) -> VisitResult {
            self.events.push(format!("visit {}", node.id.0));
            if Some(node.id.0) == self.stop_at {
                return VisitResult::Stop;
            }
            if self.skip_calls && node.tag() == crate::ast::NodeTag::CallExpr {
                return VisitResult::SkipChildren;
            }
            VisitResult::Continue
        }

        fn leave_node(&mut self, node: &'a AstNode) {
            self.events.push(format!("leave {}", node.id.0));
        }
    }

    #[test]
    fn pre_and_post_order() {
        let tree = tree();
        let mut recorder = Recorder::default();
        walk(&mut recorder, &tree);
        assert_eq!(
            recorder.events,
            vec![
                "visit 0", "visit 1", "visit 2", "leave 2", "visit 3", "visit 4", "leave 4",
                "leave 3", "leave 1", "visit 5", "leave 5", "leave 0",
            ]
        );
    }

    #[test]
    fn skip_children_still_leaves() {
        let tree = tree();
        let mut recorder = Recorder {
            skip_calls: true,
            ..Default::default()
        };
        walk(&mut recorder, &tree);
        assert_eq!(
            recorder.events,
            vec!["visit 0", "visit 1", "leave 1", "visit 5", "leave 5", "leave 0"]
        );
    }

    #[test]
    fn stop_halts_everything() {
        let tree = tree();
        let mut recorder = Recorder {
            stop_at: Some(3),
            ..Default::default()
        };
        assert_eq!(walk(&mut recorder, &tree), VisitResult::Stop);
        assert_eq!(
            recorder.events,
            vec!["visit 0", "visit 1", "visit 2", "leave 2", "visit 3"]
        );
    }

    #[test]
    fn kind_hooks_dispatch() {
        struct Calls(usize);
        impl<'a> Visitor<'a> for Calls {
            fn visit_call(&mut self, _node: &'a AstNode) -> VisitResult {
                self.0 += 1;
                VisitResult::Continue
            }
        }
        let tree = tree();
        let mut calls = Calls(0);
        walk(&mut calls, &tree);
        assert_eq!(calls.0, 3);
    }
}

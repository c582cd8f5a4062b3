//! Call-pattern matcher for dynamic attribute and item mutation.
//!
//! [`MutationMatcher`] walks every `CallExpr`, resolves its callee to a
//! [`QualifiedName`], and evaluates it against a [`PatternTable`] in table
//! order. Each call yields at most one [`MutationEvent`]:
//!
//! - no shape matches: no event (or `CalleeShapeMismatch` under the near-miss
//!   policy when the member name looks like a mutation)
//! - the receiver is a literal constant: no event
//! - the receiver is not a plain positional argument where the pattern
//!   demands one: `ReceiverNotFirstArg`
//! - too few arguments: `ArityTooLow` (dropped under [`ArityPolicy::Suppress`])
//! - otherwise: `Matched`
//!
//! Matching is purely syntactic. `object.__setattr__(x, 'a', 1)` and
//! `x.__setitem__('a', 1)` are recognized by shape alone; nothing is
//! evaluated.

pub mod pattern;

use std::fmt;

use glint_core::{walk, AstNode, NodeKind, NodeRef, VisitResult, Visitor};
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{AnalysisConfig, ArityPolicy, NearMissPolicy};
pub use pattern::{
    CalleeShape, MutationPattern, PatternId, PatternTable, ReceiverSpec, ShapeSegment, TypeNames,
};

// ============================================================================
// Qualified names
// ============================================================================

/// The dotted name a callee is spelled with.
///
/// `object.__setattr__` resolves to `["object", "__setattr__"]`. When the
/// leftmost part is not a name (`super().__setattr__`, `items[0].__setitem__`)
/// it becomes a single opaque segment such as `super()` or `<subscript>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QualifiedName {
    segments: Vec<String>,
    /// The expression before the final dot, for method-style calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    prefix: Option<NodeRef>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    opaque_prefix: bool,
}

impl QualifiedName {
    /// A plain dotted name with no prefix expression.
    pub fn from_segments(segments: Vec<String>) -> Self {
        QualifiedName {
            segments,
            prefix: None,
            opaque_prefix: false,
        }
    }

    /// Resolve a callee expression.
    ///
    /// Returns `None` when the callee is not a name or attribute chain
    /// (`f()()`, `handlers[k](...)`).
    pub fn resolve(callee: &AstNode) -> Option<Self> {
        match &callee.kind {
            NodeKind::Identifier { name } => Some(QualifiedName::from_segments(vec![name.clone()])),
            NodeKind::Attribute { attr } => {
                let value = callee.attribute_value()?;
                let mut name = QualifiedName::resolve(value).unwrap_or_else(|| QualifiedName {
                    segments: vec![opaque_segment(value)],
                    prefix: None,
                    opaque_prefix: true,
                });
                name.segments.push(attr.clone());
                name.prefix = Some(value.to_ref());
                Some(name)
            }
            _ => None,
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The expression before the final dot (`x` in `x.__setitem__`).
    pub fn prefix(&self) -> Option<&NodeRef> {
        self.prefix.as_ref()
    }

    /// True when the first segment stands for a non-name expression.
    pub fn has_opaque_prefix(&self) -> bool {
        self.opaque_prefix
    }

    /// The member being called (`__setitem__` in `x.__setitem__`).
    pub fn final_segment(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

fn opaque_segment(value: &AstNode) -> String {
    if let Some((callee, _)) = value.call_parts() {
        if let NodeKind::Identifier { name } = &callee.kind {
            return format!("{}()", name);
        }
    }
    format!("<{}>", value.name().unwrap_or(value.tag().as_str()))
}

// ============================================================================
// Events
// ============================================================================

/// Why an event was (or was not fully) matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    Matched,
    /// Fewer arguments than the pattern's `min_args`.
    ArityTooLow,
    /// The receiver slot holds a keyword or starred argument, or may be
    /// filled by unpacking.
    ReceiverNotFirstArg,
    /// The member name looks like a mutation but no shape matched.
    CalleeShapeMismatch,
}

impl MatchReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchReason::Matched => "matched",
            MatchReason::ArityTooLow => "arity_too_low",
            MatchReason::ReceiverNotFirstArg => "receiver_not_first_arg",
            MatchReason::CalleeShapeMismatch => "callee_shape_mismatch",
        }
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A call classified against the pattern table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationEvent {
    pub call: NodeRef,
    pub callee: QualifiedName,
    /// The matching row; `None` only for `CalleeShapeMismatch`.
    pub pattern: Option<PatternId>,
    /// The mutated object, when it could be determined.
    pub receiver: Option<NodeRef>,
    /// Always `reason == MatchReason::Matched`.
    pub matched: bool,
    pub reason: MatchReason,
    /// Enclosing class and function names, `<module>` first.
    pub scope_path: Vec<String>,
}

impl MutationEvent {
    fn new(
        call: &AstNode,
        callee: QualifiedName,
        pattern: Option<PatternId>,
        reason: MatchReason,
        scope_path: Vec<String>,
    ) -> Self {
        MutationEvent {
            call: call.to_ref(),
            callee,
            pattern,
            receiver: None,
            matched: reason == MatchReason::Matched,
            reason,
            scope_path,
        }
    }

    fn with_receiver(mut self, receiver: Option<&AstNode>) -> Self {
        self.receiver = receiver.map(AstNode::to_ref);
        self
    }
}

// ============================================================================
// Matcher
// ============================================================================

/// Outcome of locating the receiver of a matched call.
enum Receiver<'a> {
    Found(&'a AstNode),
    /// The slot is a literal constant; the call is not a mutation.
    Literal,
    /// The slot cannot be pinned to a plain positional argument.
    Displaced,
    Missing,
}

fn is_spread(node: &AstNode) -> bool {
    matches!(node.kind, NodeKind::Starred | NodeKind::Keyword { .. })
}

/// A visitor that classifies every call in a module.
pub struct MutationMatcher<'t> {
    table: &'t PatternTable,
    types: TypeNames<'t>,
    arity_policy: ArityPolicy,
    near_miss: NearMissPolicy,
    events: Vec<MutationEvent>,
    /// Current scope path.
    scope_path: Vec<String>,
}

impl<'t> MutationMatcher<'t> {
    pub fn new(table: &'t PatternTable, config: &'t AnalysisConfig) -> Self {
        MutationMatcher {
            table,
            types: config.type_names(),
            arity_policy: config.arity_policy,
            near_miss: config.near_miss,
            events: Vec::new(),
            scope_path: vec!["<module>".to_string()],
        }
    }

    /// Classify every call under `module`.
    pub fn collect(
        module: &AstNode,
        table: &'t PatternTable,
        config: &'t AnalysisConfig,
    ) -> Vec<MutationEvent> {
        let mut matcher = MutationMatcher::new(table, config);
        walk(&mut matcher, module);
        matcher.events
    }

    /// Classify one `CallExpr`.
    ///
    /// Rows are tried in table order. A row whose `@type` prefix was only
    /// guessed from CapWords spelling yields to later rows when its receiver
    /// slot holds a literal, so `Registry.__setitem__('k', 1)` is read in
    /// method form.
    pub fn classify(&self, call: &AstNode) -> Option<MutationEvent> {
        let (callee, args) = call.call_parts()?;
        let name = QualifiedName::resolve(callee)?;

        let candidates: Vec<&MutationPattern> = self
            .table
            .iter()
            .filter(|p| p.callee_shape.matches(&name, &self.types))
            .collect();
        if candidates.is_empty() {
            return self.near_miss(call, name);
        }

        for pattern in candidates {
            match self.receiver(pattern, callee, args) {
                Receiver::Literal if self.guessed_type(pattern, &name) => {
                    trace!(call = call.id.0, pattern = %pattern.id, "literal receiver under a guessed type, trying later rows");
                }
                Receiver::Literal => {
                    trace!(call = call.id.0, pattern = %pattern.id, "literal receiver, not a mutation");
                    return None;
                }
                receiver => return self.event(call, name, pattern, receiver, args),
            }
        }
        None
    }

    /// True when `pattern` matched `name` only through the CapWords heuristic.
    fn guessed_type(&self, pattern: &MutationPattern, name: &QualifiedName) -> bool {
        pattern
            .callee_shape
            .type_segment(name)
            .is_some_and(|segment| !self.types.is_known_type(segment))
    }

    fn receiver<'a>(
        &self,
        pattern: &MutationPattern,
        callee: &'a AstNode,
        args: &'a [AstNode],
    ) -> Receiver<'a> {
        let has_spread_args = args.iter().any(|a| matches!(a.kind, NodeKind::Starred));
        match pattern.receiver {
            ReceiverSpec::SelfPrefix => match callee.attribute_value() {
                Some(value) if value.is_literal() => Receiver::Literal,
                Some(value) => Receiver::Found(value),
                None => Receiver::Missing,
            },
            ReceiverSpec::Index(index) => match args.get(index) {
                _ if args.iter().take(index).any(is_spread) => Receiver::Displaced,
                Some(arg) if is_spread(arg) => Receiver::Displaced,
                Some(arg) if arg.is_literal() => Receiver::Literal,
                Some(arg) => Receiver::Found(arg),
                None if has_spread_args => Receiver::Displaced,
                None => Receiver::Missing,
            },
        }
    }

    fn event(
        &self,
        call: &AstNode,
        name: QualifiedName,
        pattern: &MutationPattern,
        receiver: Receiver<'_>,
        args: &[AstNode],
    ) -> Option<MutationEvent> {
        let scope_path = self.scope_path.clone();
        let pattern_id = Some(pattern.id.clone());
        let found = match receiver {
            Receiver::Displaced if pattern.exact_receiver_position => {
                return Some(MutationEvent::new(
                    call,
                    name,
                    pattern_id,
                    MatchReason::ReceiverNotFirstArg,
                    scope_path,
                ));
            }
            Receiver::Found(node) => Some(node),
            Receiver::Literal | Receiver::Displaced | Receiver::Missing => None,
        };

        let has_spread_args = args.iter().any(|a| matches!(a.kind, NodeKind::Starred));
        if !has_spread_args && args.len() < pattern.min_args {
            if self.arity_policy == ArityPolicy::Suppress {
                trace!(call = call.id.0, pattern = %pattern.id, "arity too low, suppressed");
                return None;
            }
            return Some(
                MutationEvent::new(call, name, pattern_id, MatchReason::ArityTooLow, scope_path)
                    .with_receiver(found),
            );
        }

        Some(
            MutationEvent::new(call, name, pattern_id, MatchReason::Matched, scope_path)
                .with_receiver(found),
        )
    }

    fn near_miss(&self, call: &AstNode, name: QualifiedName) -> Option<MutationEvent> {
        if self.near_miss != NearMissPolicy::Report {
            return None;
        }
        let member = name.final_segment();
        if !self.table.members().any(|m| m == member) {
            return None;
        }
        Some(MutationEvent::new(
            call,
            name,
            None,
            MatchReason::CalleeShapeMismatch,
            self.scope_path.clone(),
        ))
    }
}

impl<'a> Visitor<'a> for MutationMatcher<'_> {
    fn visit_class_def(&mut self, node: &'a AstNode) -> VisitResult {
        self.scope_path
            .push(node.name().unwrap_or_default().to_string());
        VisitResult::Continue
    }

    fn leave_class_def(&mut self, _node: &'a AstNode) {
        self.scope_path.pop();
    }

    fn visit_function_def(&mut self, node: &'a AstNode) -> VisitResult {
        self.scope_path
            .push(node.name().unwrap_or_default().to_string());
        VisitResult::Continue
    }

    fn leave_function_def(&mut self, _node: &'a AstNode) {
        self.scope_path.pop();
    }

    fn visit_call(&mut self, node: &'a AstNode) -> VisitResult {
        if let Some(event) = self.classify(node) {
            debug!(
                call = node.id.0,
                line = node.span.start.line,
                callee = %event.callee,
                reason = event.reason.as_str(),
                "mutation call"
            );
            self.events.push(event);
        }
        VisitResult::Continue
    }
}

// ============================================================================
// Tests
// ============================================================================

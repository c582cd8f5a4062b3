//! The mutation pattern table.
//!
//! A [`MutationPattern`] pairs a callee shape with the rules for finding the
//! mutated object. Shapes are written as dotted strings:
//!
//! | Segment | Matches |
//! |---------|---------|
//! | `name` | exactly that identifier |
//! | `*` | one or more leading segments, including an opaque prefix such as `super()` |
//! | `@type` | a leading dotted name whose last segment is a type name |
//!
//! `*` and `@type` may only appear first, and the final segment is always a
//! literal name.
//!
//! The built-in table is built once per process and never mutated. Custom
//! tables come from [`crate::config::AnalysisConfig`].

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::matcher::QualifiedName;

/// Type names `@type` recognizes without configuration.
pub const BUILTIN_TYPE_NAMES: &[&str] = &[
    "object",
    "type",
    "dict",
    "list",
    "set",
    "frozenset",
    "tuple",
    "str",
    "bytes",
    "bytearray",
    "int",
    "float",
    "complex",
    "bool",
    "defaultdict",
    "deque",
];

/// Stable identifier of a pattern, reported on every event it produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternId(pub String);

impl PatternId {
    pub fn new(id: impl Into<String>) -> Self {
        PatternId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One segment of a callee shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShapeSegment {
    Name(String),
    /// `*`
    AnyPrefix,
    /// `@type`
    TypePrefix,
}

impl fmt::Display for ShapeSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeSegment::Name(name) => write!(f, "{}", name),
            ShapeSegment::AnyPrefix => write!(f, "*"),
            ShapeSegment::TypePrefix => write!(f, "@type"),
        }
    }
}

/// A parsed callee shape such as `@type.__setattr__`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalleeShape {
    segments: Vec<ShapeSegment>,
}

impl CalleeShape {
    /// Parse a dotted shape string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidShape`] for empty segments, wildcards
    /// anywhere but first, a wildcard-only shape, or a segment that is not
    /// an identifier.
    pub fn parse(shape: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidShape {
            shape: shape.to_string(),
            reason: reason.to_string(),
        };

        let mut segments = Vec::new();
        for (index, part) in shape.split('.').enumerate() {
            let segment = match part {
                "" => return Err(invalid("empty segment")),
                "*" | "@type" if index > 0 => {
                    return Err(invalid("wildcards are only allowed as the first segment"))
                }
                "*" => ShapeSegment::AnyPrefix,
                "@type" => ShapeSegment::TypePrefix,
                name if is_identifier(name) => ShapeSegment::Name(name.to_string()),
                _ => return Err(invalid("segments must be identifiers, '*' or '@type'")),
            };
            segments.push(segment);
        }
        if segments.len() < 2 && !matches!(segments.first(), Some(ShapeSegment::Name(_))) {
            return Err(invalid("a shape must end in a literal name"));
        }
        Ok(CalleeShape { segments })
    }

    fn from_names(prefix: Option<ShapeSegment>, names: &[&str]) -> Self {
        let segments = prefix
            .into_iter()
            .chain(names.iter().map(|name| ShapeSegment::Name(name.to_string())))
            .collect();
        CalleeShape { segments }
    }

    pub fn segments(&self) -> &[ShapeSegment] {
        &self.segments
    }

    /// The literal member name the shape ends in.
    pub fn member(&self) -> Option<&str> {
        match self.segments.last() {
            Some(ShapeSegment::Name(name)) => Some(name),
            _ => None,
        }
    }

    /// Check a resolved callee name against this shape.
    pub fn matches(&self, name: &QualifiedName, types: &TypeNames<'_>) -> bool {
        let (prefix, literal) = match self.segments.first() {
            Some(ShapeSegment::AnyPrefix) | Some(ShapeSegment::TypePrefix) => {
                (self.segments.first(), &self.segments[1..])
            }
            _ => (None, &self.segments[..]),
        };

        let segments = name.segments();
        if segments.len() < literal.len() {
            return false;
        }
        let split = segments.len() - literal.len();
        let (head, tail) = segments.split_at(split);
        let tail_matches = tail.iter().zip(literal).all(|(segment, expected)| {
            matches!(expected, ShapeSegment::Name(expected) if expected == segment)
        });
        if !tail_matches {
            return false;
        }
        // Only the first segment can be opaque.
        let head_is_opaque = name.has_opaque_prefix() && !head.is_empty();

        match prefix {
            None => head.is_empty() && !name.has_opaque_prefix(),
            Some(ShapeSegment::AnyPrefix) => !head.is_empty(),
            Some(ShapeSegment::TypePrefix) => {
                !head_is_opaque && head.last().is_some_and(|last| types.is_type_name(last))
            }
            Some(ShapeSegment::Name(_)) => false,
        }
    }

    /// The segment of `name` a leading `@type` stands for, if the shape has
    /// one.
    pub fn type_segment<'n>(&self, name: &'n QualifiedName) -> Option<&'n str> {
        if self.segments.first() != Some(&ShapeSegment::TypePrefix) {
            return None;
        }
        let segments = name.segments();
        let index = segments.len().checked_sub(self.segments.len())?;
        segments.get(index).map(String::as_str)
    }
}

impl TryFrom<String> for CalleeShape {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CalleeShape::parse(&value)
    }
}

impl From<CalleeShape> for String {
    fn from(shape: CalleeShape) -> Self {
        shape.to_string()
    }
}

impl fmt::Display for CalleeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {
            chars.all(|ch| ch == '_' || ch.is_alphanumeric())
        }
        _ => false,
    }
}

/// Where a pattern finds the mutated object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverSpec {
    /// The n-th argument of the call.
    Index(usize),
    /// The expression before the callee's final dot (`x` in `x.__setitem__`).
    SelfPrefix,
}

/// One row of the pattern table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationPattern {
    pub id: PatternId,
    pub callee_shape: CalleeShape,
    pub receiver: ReceiverSpec,
    /// Fewest arguments a well-formed call passes.
    pub min_args: usize,
    /// The receiver must be a plain positional argument at `receiver`.
    #[serde(default)]
    pub exact_receiver_position: bool,
}

impl MutationPattern {
    pub fn new(
        id: impl Into<String>,
        callee_shape: CalleeShape,
        receiver: ReceiverSpec,
        min_args: usize,
    ) -> Self {
        MutationPattern {
            id: PatternId::new(id),
            callee_shape,
            receiver,
            min_args,
            exact_receiver_position: false,
        }
    }

    pub fn with_exact_receiver(mut self) -> Self {
        self.exact_receiver_position = true;
        self
    }
}

/// An ordered, validated list of patterns. The first matching row wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternTable {
    patterns: Vec<MutationPattern>,
}

static BUILTIN: OnceLock<PatternTable> = OnceLock::new();

impl PatternTable {
    /// Build a table, rejecting duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicatePatternId`] naming the first repeated id.
    pub fn new(patterns: Vec<MutationPattern>) -> Result<Self, ConfigError> {
        for (index, pattern) in patterns.iter().enumerate() {
            if patterns[..index].iter().any(|p| p.id == pattern.id) {
                return Err(ConfigError::DuplicatePatternId {
                    id: pattern.id.to_string(),
                });
            }
        }
        Ok(PatternTable { patterns })
    }

    /// The built-in table.
    ///
    /// Type-qualified rows precede the method-form rows so that
    /// `dict.__setitem__(x, k, v)` resolves its receiver to `x`.
    /// The index-0 `__setattr__` row is `@type` rather than `*` because
    /// `self.__setattr__('a', 1)` would otherwise take `'a'` as its receiver;
    /// the bound form has its own `*.__setattr__` row reading the receiver
    /// from the prefix.
    pub fn builtin() -> &'static PatternTable {
        BUILTIN.get_or_init(|| {
            let type_prefix = Some(ShapeSegment::TypePrefix);
            let any_prefix = Some(ShapeSegment::AnyPrefix);
            PatternTable {
                patterns: vec![
                    MutationPattern::new(
                        "setattr",
                        CalleeShape::from_names(None, &["setattr"]),
                        ReceiverSpec::Index(0),
                        3,
                    )
                    .with_exact_receiver(),
                    MutationPattern::new(
                        "builtins.setattr",
                        CalleeShape::from_names(None, &["builtins", "setattr"]),
                        ReceiverSpec::Index(0),
                        3,
                    )
                    .with_exact_receiver(),
                    MutationPattern::new(
                        "type.__setattr__",
                        CalleeShape::from_names(type_prefix.clone(), &["__setattr__"]),
                        ReceiverSpec::Index(0),
                        3,
                    )
                    .with_exact_receiver(),
                    MutationPattern::new(
                        "type.__setitem__",
                        CalleeShape::from_names(type_prefix, &["__setitem__"]),
                        ReceiverSpec::Index(0),
                        3,
                    )
                    .with_exact_receiver(),
                    MutationPattern::new(
                        "method.__setitem__",
                        CalleeShape::from_names(any_prefix.clone(), &["__setitem__"]),
                        ReceiverSpec::SelfPrefix,
                        2,
                    ),
                    MutationPattern::new(
                        "method.__setattr__",
                        CalleeShape::from_names(any_prefix, &["__setattr__"]),
                        ReceiverSpec::SelfPrefix,
                        2,
                    ),
                ],
            }
        })
    }

    pub fn patterns(&self) -> &[MutationPattern] {
        &self.patterns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MutationPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&MutationPattern> {
        self.patterns.iter().find(|p| p.id.as_str() == id)
    }

    /// Member names that end any shape in the table.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().filter_map(|p| p.callee_shape.member())
    }
}

/// Decides which dotted-name segments count as type names for `@type`.
#[derive(Debug, Clone, Copy)]
pub struct TypeNames<'c> {
    extra: &'c [String],
    capwords: bool,
}

impl<'c> TypeNames<'c> {
    pub fn new(extra: &'c [String], capwords: bool) -> Self {
        TypeNames { extra, capwords }
    }

    pub fn is_type_name(&self, segment: &str) -> bool {
        self.is_known_type(segment) || (self.capwords && is_capwords(segment))
    }

    /// Builtin or configured type names, without the CapWords guess.
    pub fn is_known_type(&self, segment: &str) -> bool {
        BUILTIN_TYPE_NAMES.contains(&segment) || self.extra.iter().any(|name| name == segment)
    }
}

impl Default for TypeNames<'_> {
    fn default() -> Self {
        TypeNames::new(&[], true)
    }
}

/// `OrderedDict`, `Config`; not `CONSTANT` or `x`.
fn is_capwords(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase) && name.chars().any(char::is_lowercase)
}

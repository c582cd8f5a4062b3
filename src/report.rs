//! Per-file analysis report.
//!
//! A [`Report`] merges comment attachments and mutation events into one
//! ordered, immutable list. Entries are sorted by span start; at equal starts
//! comments come before mutations, then lower node ids first. The sort is
//! stable, so identical input always serializes identically.

use std::cmp::Ordering;

use glint_core::{NodeId, Position};
use serde::Serialize;

use crate::attach::{AttachTarget, CommentAttachment};
use crate::error::GlintError;
use crate::matcher::MutationEvent;

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum ReportEntry {
    Comment(CommentAttachment),
    Mutation(MutationEvent),
}

impl ReportEntry {
    pub fn start(&self) -> Position {
        match self {
            ReportEntry::Comment(attachment) => attachment.comment.start(),
            ReportEntry::Mutation(event) => event.call.span.start,
        }
    }

    /// The owning node for comments (or orphan context), the call for
    /// mutations.
    pub fn node_id(&self) -> NodeId {
        match self {
            ReportEntry::Comment(attachment) => match &attachment.target {
                AttachTarget::Node(node) => node.id,
                AttachTarget::Orphan { context } => context.id,
            },
            ReportEntry::Mutation(event) => event.call.id,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            ReportEntry::Comment(_) => 0,
            ReportEntry::Mutation(_) => 1,
        }
    }

    fn order(&self, other: &Self) -> Ordering {
        self.start()
            .cmp(&other.start())
            .then_with(|| self.rank().cmp(&other.rank()))
            .then_with(|| self.node_id().cmp(&other.node_id()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn build(attachments: Vec<CommentAttachment>, events: Vec<MutationEvent>) -> Self {
        let mut entries: Vec<ReportEntry> = attachments
            .into_iter()
            .map(ReportEntry::Comment)
            .chain(events.into_iter().map(ReportEntry::Mutation))
            .collect();
        entries.sort_by(ReportEntry::order);
        Report { entries }
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn attachments(&self) -> impl Iterator<Item = &CommentAttachment> {
        self.entries.iter().filter_map(|entry| match entry {
            ReportEntry::Comment(attachment) => Some(attachment),
            ReportEntry::Mutation(_) => None,
        })
    }

    pub fn mutations(&self) -> impl Iterator<Item = &MutationEvent> {
        self.entries.iter().filter_map(|entry| match entry {
            ReportEntry::Mutation(event) => Some(event),
            ReportEntry::Comment(_) => None,
        })
    }

    /// Comments that document `id`, in source order.
    pub fn comments_for(&self, id: NodeId) -> impl Iterator<Item = &CommentAttachment> {
        self.attachments()
            .filter(move |a| a.target.node().is_some_and(|node| node.id == id))
    }

    pub fn orphans(&self) -> impl Iterator<Item = &CommentAttachment> {
        self.attachments().filter(|a| a.target.is_orphan())
    }

    pub fn matched_mutations(&self) -> impl Iterator<Item = &MutationEvent> {
        self.mutations().filter(|event| event.matched)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, GlintError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

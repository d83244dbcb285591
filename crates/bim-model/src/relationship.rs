//! Directed relationships between elements
//!
//! Relationships are stored on the source element as `(kind, target)` pairs,
//! keyed by [`ElementId`]. Paired kinds must be mirrored on the target; the
//! model checks this after every delta.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::index::ElementId;

/// Kind of a relationship edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationKind {
    /// Wall hosts an opening
    Hosts,
    /// Opening is hosted by a wall
    HostedBy,
    /// Walls meet at an endpoint
    Joins,
    /// Wall bounds a room
    Bounds,
    /// Room is bounded by a wall
    BoundedBy,
    /// Door gives access to a room
    LeadsTo,
}

impl RelationKind {
    /// Counterpart kind that must exist on the target, if the kind is paired
    pub const fn inverse(&self) -> Option<RelationKind> {
        match self {
            RelationKind::Hosts => Some(RelationKind::HostedBy),
            RelationKind::HostedBy => Some(RelationKind::Hosts),
            RelationKind::Joins => Some(RelationKind::Joins),
            RelationKind::Bounds => Some(RelationKind::BoundedBy),
            RelationKind::BoundedBy => Some(RelationKind::Bounds),
            RelationKind::LeadsTo => None,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Hosts => "hosts",
            RelationKind::HostedBy => "hosted-by",
            RelationKind::Joins => "joins",
            RelationKind::Bounds => "bounds",
            RelationKind::BoundedBy => "bounded-by",
            RelationKind::LeadsTo => "leads-to",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relation {
    pub kind: RelationKind,
    pub target: ElementId,
}

/// Outgoing relationship set of one element
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Relationships(BTreeSet<Relation>);

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge; returns false if it was already present
    pub fn add(&mut self, kind: RelationKind, target: ElementId) -> bool {
        self.0.insert(Relation { kind, target })
    }

    /// Remove one edge
    pub fn remove(&mut self, kind: RelationKind, target: ElementId) -> bool {
        self.0.remove(&Relation { kind, target })
    }

    /// Remove every edge pointing at `target`
    pub fn remove_target(&mut self, target: ElementId) -> bool {
        let before = self.0.len();
        self.0.retain(|r| r.target != target);
        self.0.len() != before
    }

    /// Remove every edge of `kind`
    pub fn remove_kind(&mut self, kind: RelationKind) -> Vec<ElementId> {
        let removed: Vec<ElementId> = self.targets(kind).collect();
        self.0.retain(|r| r.kind != kind);
        removed
    }

    pub fn contains(&self, kind: RelationKind, target: ElementId) -> bool {
        self.0.contains(&Relation { kind, target })
    }

    /// Whether any edge points at `target`
    pub fn references(&self, target: ElementId) -> bool {
        self.0.iter().any(|r| r.target == target)
    }

    /// Targets of all edges of `kind`, in id order
    pub fn targets(&self, kind: RelationKind) -> impl Iterator<Item = ElementId> + '_ {
        self.0.iter().filter(move |r| r.kind == kind).map(|r| r.target)
    }

    /// Host of an opening, if any
    pub fn host(&self) -> Option<ElementId> {
        self.targets(RelationKind::HostedBy).next()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

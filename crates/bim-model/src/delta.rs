//! Reversible model changes
//!
//! A [`Delta`] is an ordered list of [`Change`]s carrying full before/after
//! snapshots, so the inverse can be computed without consulting the model.

use serde::{Deserialize, Serialize};

use crate::element::Element;
use crate::index::ElementId;
use crate::level::Level;

/// A single element or level change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum Change {
    AddElement(Element),
    RemoveElement(Element),
    ModifyElement { before: Element, after: Element },
    AddLevel(Level),
    RemoveLevel(Level),
}

impl Change {
    /// The change that undoes this one
    pub fn inverse(&self) -> Change {
        match self {
            Change::AddElement(e) => Change::RemoveElement(e.clone()),
            Change::RemoveElement(e) => Change::AddElement(e.clone()),
            Change::ModifyElement { before, after } => Change::ModifyElement {
                before: after.clone(),
                after: before.clone(),
            },
            Change::AddLevel(l) => Change::RemoveLevel(l.clone()),
            Change::RemoveLevel(l) => Change::AddLevel(l.clone()),
        }
    }

    /// Element touched by this change, if any
    pub fn element_id(&self) -> Option<ElementId> {
        match self {
            Change::AddElement(e) | Change::RemoveElement(e) => Some(e.id()),
            Change::ModifyElement { after, .. } => Some(after.id()),
            Change::AddLevel(_) | Change::RemoveLevel(_) => None,
        }
    }
}

/// Ordered list of changes applied as one unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Delta {
    changes: Vec<Change>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Record an added element
    pub fn add(&mut self, element: Element) -> &mut Self {
        self.changes.push(Change::AddElement(element));
        self
    }

    /// Record a removed element
    pub fn remove(&mut self, element: Element) -> &mut Self {
        self.changes.push(Change::RemoveElement(element));
        self
    }

    /// Record a modification; no-op modifications are dropped
    pub fn modify(&mut self, before: Element, after: Element) -> &mut Self {
        if before != after {
            self.changes.push(Change::ModifyElement { before, after });
        }
        self
    }

    /// Inverse delta: inverted changes in reverse order
    pub fn inverse(&self) -> Delta {
        Delta {
            changes: self.changes.iter().rev().map(Change::inverse).collect(),
        }
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Ids of elements added by this delta, in order
    pub fn added(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.changes.iter().filter_map(|c| match c {
            Change::AddElement(e) => Some(e.id()),
            _ => None,
        })
    }
}

impl From<Vec<Change>> for Delta {
    fn from(changes: Vec<Change>) -> Self {
        Delta { changes }
    }
}

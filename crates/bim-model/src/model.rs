//! The element store
//!
//! [`Model`] owns elements and levels. It is only mutated through
//! [`Model::apply`], which applies a [`Delta`] all-or-nothing and checks
//! relationship integrity before committing.

use std::collections::BTreeMap;

use crate::delta::{Change, Delta};
use crate::element::Element;
use crate::error::{ModelError, ModelResult};
use crate::index::{ElementId, ElementKind, LevelId};
use crate::level::Level;

/// Building model: elements keyed by id plus the ordered level list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    elements: BTreeMap<ElementId, Element>,
    /// Sorted by elevation, then name
    levels: Vec<Level>,
    /// Next number per element kind; never decreases
    counters: BTreeMap<ElementKind, u32>,
    next_level: LevelId,
}

/// Hands out fresh ids without mutating the model
///
/// Handlers allocate ids while computing a delta; the model advances its own
/// counters when the delta is applied.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    counters: BTreeMap<ElementKind, u32>,
    next_level: LevelId,
}

impl IdAllocator {
    /// Next element id of `kind`
    pub fn next(&mut self, kind: ElementKind) -> ElementId {
        let counter = self.counters.entry(kind).or_insert(1);
        let id = ElementId::new(kind, *counter);
        *counter += 1;
        id
    }

    /// Next level id
    pub fn next_level(&mut self) -> LevelId {
        let id = self.next_level;
        self.next_level = id.next();
        id
    }
}

impl Model {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// All elements in id order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Elements of one kind in id order
    pub fn elements_of(&self, kind: ElementKind) -> impl Iterator<Item = &Element> {
        self.elements.values().filter(move |e| e.kind() == kind)
    }

    /// All element ids in id order
    pub fn element_ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Levels sorted by elevation
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, id: LevelId) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == id)
    }

    /// Case-insensitive level lookup
    pub fn level_by_name(&self, name: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.is_named(name))
    }

    pub fn level_names(&self) -> Vec<&str> {
        self.levels.iter().map(|l| l.name.as_str()).collect()
    }

    /// Id allocator seeded from the current counters
    pub fn id_allocator(&self) -> IdAllocator {
        IdAllocator {
            counters: self.counters.clone(),
            next_level: self.next_level,
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Apply a delta atomically
    ///
    /// Every change is checked against the current state (an add must not
    /// collide, a remove or modify must match its recorded snapshot). If a
    /// change fails, or the result violates relationship integrity, all
    /// applied changes are rolled back and the model is left untouched.
    pub fn apply(&mut self, delta: &Delta) -> ModelResult<()> {
        let counters = self.counters.clone();
        let next_level = self.next_level;

        let mut applied = 0;
        let mut result = Ok(());
        for change in delta.changes() {
            if let Err(e) = self.apply_change(change) {
                result = Err(e);
                break;
            }
            applied += 1;
        }
        if result.is_ok() {
            result = self.check_integrity();
        }

        if let Err(e) = result {
            log::debug!("rolling back {} of {} changes: {}", applied, delta.len(), e);
            for change in delta.changes()[..applied].iter().rev() {
                if let Err(rollback) = self.apply_change(&change.inverse()) {
                    log::error!("rollback failed: {}", rollback);
                }
            }
            self.counters = counters;
            self.next_level = next_level;
            return Err(e);
        }
        Ok(())
    }

    fn apply_change(&mut self, change: &Change) -> ModelResult<()> {
        match change {
            Change::AddElement(element) => {
                let id = element.id();
                if self.elements.contains_key(&id) {
                    return Err(ModelError::DuplicateElement(id));
                }
                if self.level(element.level()).is_none() {
                    return Err(ModelError::LevelNotFound(element.level().to_string()));
                }
                let counter = self.counters.entry(id.kind()).or_insert(1);
                *counter = (*counter).max(id.number() + 1);
                self.elements.insert(id, element.clone());
            }
            Change::RemoveElement(element) => {
                let id = element.id();
                match self.elements.get(&id) {
                    None => return Err(ModelError::ElementNotFound(id)),
                    Some(current) if current != element => {
                        return Err(ModelError::StaleSnapshot(id))
                    }
                    Some(_) => {
                        self.elements.remove(&id);
                    }
                }
            }
            Change::ModifyElement { before, after } => {
                let id = before.id();
                if after.id() != id {
                    return Err(ModelError::StaleSnapshot(id));
                }
                if self.level(after.level()).is_none() {
                    return Err(ModelError::LevelNotFound(after.level().to_string()));
                }
                match self.elements.get_mut(&id) {
                    None => return Err(ModelError::ElementNotFound(id)),
                    Some(current) if current != before => {
                        return Err(ModelError::StaleSnapshot(id))
                    }
                    Some(current) => *current = after.clone(),
                }
            }
            Change::AddLevel(level) => {
                if self
                    .levels
                    .iter()
                    .any(|l| l.id == level.id || l.is_named(&level.name))
                {
                    return Err(ModelError::DuplicateLevel(level.name.clone()));
                }
                let pos = self.levels.partition_point(|l| {
                    (l.elevation, l.name.as_str()) < (level.elevation, level.name.as_str())
                });
                self.levels.insert(pos, level.clone());
                if level.id >= self.next_level {
                    self.next_level = level.id.next();
                }
            }
            Change::RemoveLevel(level) => {
                let pos = self
                    .levels
                    .iter()
                    .position(|l| l.id == level.id)
                    .ok_or_else(|| ModelError::LevelNotFound(level.name.clone()))?;
                if self.levels[pos] != *level {
                    return Err(ModelError::StaleLevel(level.name.clone()));
                }
                if let Some(user) = self.elements.values().find(|e| e.level() == level.id) {
                    return Err(ModelError::LevelInUse {
                        level: level.name.clone(),
                        element: user.id(),
                    });
                }
                self.levels.remove(pos);
            }
        }
        Ok(())
    }

    /// Verify that every element's level exists and every relationship
    /// targets an existing element, with paired kinds mirrored on the target.
    pub fn check_integrity(&self) -> ModelResult<()> {
        for element in self.elements.values() {
            let from = element.id();
            if self.level(element.level()).is_none() {
                return Err(ModelError::LevelNotFound(element.level().to_string()));
            }
            for rel in element.relationships().iter() {
                if rel.target == from {
                    return Err(ModelError::SelfRelationship(from));
                }
                let target = self.elements.get(&rel.target).ok_or(
                    ModelError::DanglingRelationship {
                        from,
                        kind: rel.kind,
                        to: rel.target,
                    },
                )?;
                if let Some(inverse) = rel.kind.inverse() {
                    if !target.relationships().contains(inverse, from) {
                        return Err(ModelError::AsymmetricRelationship {
                            from,
                            kind: rel.kind,
                            to: rel.target,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

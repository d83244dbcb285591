//! BIM element model
//!
//! This crate provides the building data structures manipulated by the
//! command engine:
//!
//! - [`Element`] - tagged sum over walls, doors, windows, rooms, floors,
//!   roofs, columns, beams and stairs, each embedding an [`ElementBase`]
//! - [`Level`] - named storeys looked up case-insensitively
//! - [`Relationships`] - directed edges between elements keyed by [`ElementId`]
//! - [`Delta`] - reversible, snapshot-carrying change lists
//! - [`Model`] - the store, mutated only through [`Model::apply`]
//!
//! # Architecture
//!
//! - Relationships are index-based (`ElementId` keys), never owning pointers
//! - Integrity (no dangling or one-sided edges) is checked on every mutation
//! - Deltas apply all-or-nothing; a failed apply leaves the model unchanged
//!
//! # Example
//!
//! ```rust
//! use bim_model::{Change, Delta, ElementKind, Level, LevelId, Model};
//!
//! let mut model = Model::new();
//! let mut delta = Delta::new();
//! delta.push(Change::AddLevel(Level::new(LevelId(0), "Level 1", 0.0, 3.0)));
//! model.apply(&delta).unwrap();
//!
//! assert!(model.level_by_name("level 1").is_some());
//! assert_eq!(model.id_allocator().next(ElementKind::Wall).to_string(), "wall-1");
//! ```

mod delta;
mod element;
mod error;
pub mod geometry;
mod index;
mod level;
mod model;
mod relationship;
mod types;

pub use delta::{Change, Delta};
pub use element::{
    Beam, Column, Door, Element, ElementBase, Floor, Roof, Room, Stair, Wall, Window,
};
pub use error::{ModelError, ModelResult};
pub use geometry::{Extents, Point2};
pub use index::{ElementId, ElementKind, LevelId};
pub use level::Level;
pub use model::{IdAllocator, Model};
pub use relationship::{Relation, RelationKind, Relationships};
pub use types::{DoorType, RoofType, RoomType, WallType, WindowType};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::{
        Change, Delta, Element, ElementBase, ElementId, ElementKind, Level, LevelId, Model,
        ModelError, ModelResult, Point2, RelationKind,
    };
}

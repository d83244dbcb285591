//! Building elements
//!
//! [`Element`] is a closed sum over the element kinds. Every variant embeds an
//! [`ElementBase`] carrying the id, the level and the outgoing relationships,
//! so shared behaviour is written once against the base.

use serde::{Deserialize, Serialize};

use crate::geometry::{format_length, polygon_area, Extents, Point2};
use crate::index::{ElementId, ElementKind, LevelId};
use crate::relationship::Relationships;
use crate::types::{DoorType, RoofType, RoomType, WallType, WindowType};

/// Attributes shared by every element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementBase {
    pub id: ElementId,
    pub level: LevelId,
    #[serde(default, skip_serializing_if = "Relationships::is_empty")]
    pub relationships: Relationships,
}

impl ElementBase {
    pub fn new(id: ElementId, level: LevelId) -> Self {
        ElementBase {
            id,
            level,
            relationships: Relationships::new(),
        }
    }
}

/// Straight wall between two points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    #[serde(flatten)]
    pub base: ElementBase,
    pub start: Point2,
    pub end: Point2,
    pub height: f64,
    pub thickness: f64,
    pub wall_type: WallType,
}

impl Wall {
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Point on the wall axis `offset` metres from the start
    pub fn point_at(&self, offset: f64) -> Point2 {
        let len = self.length();
        if len == 0.0 {
            return self.start;
        }
        self.start.lerp(self.end, offset / len)
    }
}

/// Door hosted by a wall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    #[serde(flatten)]
    pub base: ElementBase,
    /// Distance from the host wall's start to the door centre
    pub offset: f64,
    /// Centre of the door on the host wall axis
    pub position: Point2,
    pub width: f64,
    pub height: f64,
    pub door_type: DoorType,
}

/// Window hosted by a wall
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    #[serde(flatten)]
    pub base: ElementBase,
    /// Distance from the host wall's start to the window centre
    pub offset: f64,
    /// Centre of the window on the host wall axis
    pub position: Point2,
    pub width: f64,
    pub height: f64,
    pub sill: f64,
    pub window_type: WindowType,
}

/// Named room bounded by a polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    #[serde(flatten)]
    pub base: ElementBase,
    pub boundary: Vec<Point2>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub room_type: RoomType,
}

/// Floor slab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    #[serde(flatten)]
    pub base: ElementBase,
    pub boundary: Vec<Point2>,
    pub thickness: f64,
}

/// Roof over a boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roof {
    #[serde(flatten)]
    pub base: ElementBase,
    pub boundary: Vec<Point2>,
    pub roof_type: RoofType,
    /// Pitch in degrees
    pub slope: f64,
    pub overhang: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(flatten)]
    pub base: ElementBase,
    pub position: Point2,
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beam {
    #[serde(flatten)]
    pub base: ElementBase,
    pub start: Point2,
    pub end: Point2,
    pub width: f64,
    pub depth: f64,
}

/// Straight stair flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stair {
    #[serde(flatten)]
    pub base: ElementBase,
    pub start: Point2,
    pub end: Point2,
    pub width: f64,
    pub risers: u32,
    pub riser_height: f64,
}

/// Any building element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Wall(Wall),
    Door(Door),
    Window(Window),
    Room(Room),
    Floor(Floor),
    Roof(Roof),
    Column(Column),
    Beam(Beam),
    Stair(Stair),
}

macro_rules! with_variant {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Element::Wall($inner) => $body,
            Element::Door($inner) => $body,
            Element::Window($inner) => $body,
            Element::Room($inner) => $body,
            Element::Floor($inner) => $body,
            Element::Roof($inner) => $body,
            Element::Column($inner) => $body,
            Element::Beam($inner) => $body,
            Element::Stair($inner) => $body,
        }
    };
}

impl Element {
    pub fn base(&self) -> &ElementBase {
        with_variant!(self, e => &e.base)
    }

    pub fn base_mut(&mut self) -> &mut ElementBase {
        with_variant!(self, e => &mut e.base)
    }

    #[inline]
    pub fn id(&self) -> ElementId {
        self.base().id
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Wall(_) => ElementKind::Wall,
            Element::Door(_) => ElementKind::Door,
            Element::Window(_) => ElementKind::Window,
            Element::Room(_) => ElementKind::Room,
            Element::Floor(_) => ElementKind::Floor,
            Element::Roof(_) => ElementKind::Roof,
            Element::Column(_) => ElementKind::Column,
            Element::Beam(_) => ElementKind::Beam,
            Element::Stair(_) => ElementKind::Stair,
        }
    }

    #[inline]
    pub fn level(&self) -> LevelId {
        self.base().level
    }

    #[inline]
    pub fn relationships(&self) -> &Relationships {
        &self.base().relationships
    }

    #[inline]
    pub fn relationships_mut(&mut self) -> &mut Relationships {
        &mut self.base_mut().relationships
    }

    /// Explicit start and end points, for linear elements
    pub fn start_end(&self) -> Option<(Point2, Point2)> {
        match self {
            Element::Wall(w) => Some((w.start, w.end)),
            Element::Beam(b) => Some((b.start, b.end)),
            Element::Stair(s) => Some((s.start, s.end)),
            _ => None,
        }
    }

    /// Boundary polygon, for area elements
    pub fn boundary(&self) -> Option<&[Point2]> {
        match self {
            Element::Room(r) => Some(&r.boundary),
            Element::Floor(f) => Some(&f.boundary),
            Element::Roof(r) => Some(&r.boundary),
            _ => None,
        }
    }

    /// Representative plan position
    pub fn position(&self) -> Point2 {
        match self {
            Element::Door(d) => d.position,
            Element::Window(w) => w.position,
            Element::Column(c) => c.position,
            other => other.extents().center(),
        }
    }

    /// Plan bounding box
    pub fn extents(&self) -> Extents {
        match self {
            Element::Wall(w) => linear_extents(w.start, w.end, w.thickness),
            Element::Beam(b) => linear_extents(b.start, b.end, b.width),
            Element::Stair(s) => linear_extents(s.start, s.end, s.width),
            Element::Door(d) => Extents::around(d.position, d.width, 0.0),
            Element::Window(w) => Extents::around(w.position, w.width, 0.0),
            Element::Column(c) => Extents::around(c.position, c.width, c.depth),
            Element::Room(Room { boundary, .. })
            | Element::Floor(Floor { boundary, .. })
            | Element::Roof(Roof { boundary, .. }) => {
                Extents::from_points(boundary).unwrap_or(Extents {
                    min: Point2::ORIGIN,
                    max: Point2::ORIGIN,
                })
            }
        }
    }

    /// Copy of this element moved by `(dx, dy)`; relationships are kept
    pub fn translated(&self, dx: f64, dy: f64) -> Element {
        let mut moved = self.clone();
        match &mut moved {
            Element::Wall(w) => {
                w.start = w.start.translate(dx, dy);
                w.end = w.end.translate(dx, dy);
            }
            Element::Beam(b) => {
                b.start = b.start.translate(dx, dy);
                b.end = b.end.translate(dx, dy);
            }
            Element::Stair(s) => {
                s.start = s.start.translate(dx, dy);
                s.end = s.end.translate(dx, dy);
            }
            Element::Door(d) => d.position = d.position.translate(dx, dy),
            Element::Window(w) => w.position = w.position.translate(dx, dy),
            Element::Column(c) => c.position = c.position.translate(dx, dy),
            Element::Room(Room { boundary, .. })
            | Element::Floor(Floor { boundary, .. })
            | Element::Roof(Roof { boundary, .. }) => {
                for p in boundary.iter_mut() {
                    *p = p.translate(dx, dy);
                }
            }
        }
        moved
    }

    /// One-line human readable description
    pub fn summary(&self) -> String {
        let f = format_length;
        match self {
            Element::Wall(w) => format!(
                "{} {} -> {}, length {}, height {}, thickness {}",
                w.wall_type, w.start, w.end, f(w.length()), f(w.height), f(w.thickness)
            ),
            Element::Door(d) => format!(
                "{} door at {}, {} x {}",
                d.door_type, d.position, f(d.width), f(d.height)
            ),
            Element::Window(w) => format!(
                "{} window at {}, {} x {}, sill {}",
                w.window_type, w.position, f(w.width), f(w.height), f(w.sill)
            ),
            Element::Room(r) => {
                let number = r.number.as_deref().map(|n| format!(" #{}", n)).unwrap_or_default();
                format!(
                    "'{}'{} ({}), area {}",
                    r.name, number, r.room_type, f(polygon_area(&r.boundary))
                )
            }
            Element::Floor(s) => format!(
                "{} points, area {}, thickness {}",
                s.boundary.len(), f(polygon_area(&s.boundary)), f(s.thickness)
            ),
            Element::Roof(r) => format!(
                "{} roof, area {}, slope {} deg, overhang {}",
                r.roof_type, f(polygon_area(&r.boundary)), f(r.slope), f(r.overhang)
            ),
            Element::Column(c) => format!(
                "at {}, {} x {}, height {}",
                c.position, f(c.width), f(c.depth), f(c.height)
            ),
            Element::Beam(b) => format!(
                "{} -> {}, {} x {}",
                b.start, b.end, f(b.width), f(b.depth)
            ),
            Element::Stair(s) => format!(
                "{} -> {}, width {}, {} risers of {}",
                s.start, s.end, f(s.width), s.risers, f(s.riser_height)
            ),
        }
    }
}

fn linear_extents(start: Point2, end: Point2, width: f64) -> Extents {
    Extents::from_points(&[start, end])
        .map(|e| e.inflate(width / 2.0))
        .unwrap_or(Extents { min: start, max: end })
}

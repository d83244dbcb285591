//! Planar geometry helpers
//!
//! All lengths are metres. The model is 2D in plan; heights are attributes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in plan coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Point2 { x, y }
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point offset by `(dx, dy)`
    #[inline]
    pub fn translate(&self, dx: f64, dy: f64) -> Point2 {
        Point2::new(self.x + dx, self.y + dy)
    }

    /// Linear interpolation towards `other`
    #[inline]
    pub fn lerp(&self, other: Point2, t: f64) -> Point2 {
        Point2::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Midpoint between two points
    #[inline]
    pub fn midpoint(&self, other: Point2) -> Point2 {
        self.lerp(other, 0.5)
    }
}

impl fmt::Display for Point2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", format_length(self.x), format_length(self.y))
    }
}

/// Format a number with at most four decimals and no trailing zeros
pub fn format_length(value: f64) -> String {
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" || text.is_empty() {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extents {
    pub min: Point2,
    pub max: Point2,
}

impl Extents {
    /// Bounding box of a non-empty point set
    pub fn from_points(points: &[Point2]) -> Option<Extents> {
        let first = points.first()?;
        let mut ext = Extents {
            min: *first,
            max: *first,
        };
        for p in &points[1..] {
            ext.min.x = ext.min.x.min(p.x);
            ext.min.y = ext.min.y.min(p.y);
            ext.max.x = ext.max.x.max(p.x);
            ext.max.y = ext.max.y.max(p.y);
        }
        Some(ext)
    }

    /// Box of the given size centred on a point
    pub fn around(center: Point2, width: f64, depth: f64) -> Extents {
        Extents {
            min: center.translate(-width / 2.0, -depth / 2.0),
            max: center.translate(width / 2.0, depth / 2.0),
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn depth(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point2 {
        self.min.midpoint(self.max)
    }

    /// Corners counter-clockwise starting at `min`
    pub fn corners(&self) -> Vec<Point2> {
        vec![
            self.min,
            Point2::new(self.max.x, self.min.y),
            self.max,
            Point2::new(self.min.x, self.max.y),
        ]
    }

    /// Grow the box by `margin` on every side
    pub fn inflate(&self, margin: f64) -> Extents {
        Extents {
            min: self.min.translate(-margin, -margin),
            max: self.max.translate(margin, margin),
        }
    }
}

/// Signed polygon area (shoelace); positive for counter-clockwise rings
pub fn signed_area(points: &[Point2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice / 2.0
}

/// Absolute polygon area
pub fn polygon_area(points: &[Point2]) -> f64 {
    signed_area(points).abs()
}

/// Closed-ring perimeter
pub fn polygon_perimeter(points: &[Point2]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.distance(*b))
        .sum()
}

/// Edges of a closed ring
pub fn polygon_edges(points: &[Point2]) -> impl Iterator<Item = (Point2, Point2)> + '_ {
    let n = points.len();
    (0..n).map(move |i| (points[i], points[(i + 1) % n]))
}

/// Parameter of the projection of `p` onto segment `a`-`b`, clamped to `[0, 1]`
pub fn project_onto_segment(p: Point2, a: Point2, b: Point2) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return 0.0;
    }
    (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
}

/// Shortest distance from `p` to segment `a`-`b`
pub fn distance_to_segment(p: Point2, a: Point2, b: Point2) -> f64 {
    let t = project_onto_segment(p, a, b);
    p.distance(a.lerp(b, t))
}

/// Whether segment `a`-`b` lies along one edge of the ring, within `tol`
pub fn segment_on_ring(a: Point2, b: Point2, ring: &[Point2], tol: f64) -> bool {
    polygon_edges(ring).any(|(p, q)| {
        distance_to_segment(a, p, q) <= tol && distance_to_segment(b, p, q) <= tol
    })
}

//! Scene-space geometry: points, sizes, rects, node sides and corners, and
//! grid snapping.
//!
//! All coordinates are `f32` scene units with `y` growing downward.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

// ─── Point / Size / Rect ─────────────────────────────────────────────────

/// A point in scene space. Also used for pointer deltas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(self, other: Point) -> f32 {
        self.distance_sq(other).sqrt()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Width and height of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Half extents as an offset from the top-left to the center.
    pub fn half(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamp each axis to at least `min`.
    pub fn at_least(self, min: Size) -> Size {
        Size::new(self.width.max(min.width), self.height.max(min.height))
    }
}

/// Axis-aligned rectangle (top-left + size).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `p` lies inside the ellipse inscribed in this rect.
    pub fn ellipse_contains(&self, p: Point) -> bool {
        let rx = self.width / 2.0;
        let ry = self.height / 2.0;
        if rx <= 0.0 || ry <= 0.0 {
            return false;
        }
        let c = self.center();
        let nx = (p.x - c.x) / rx;
        let ny = (p.y - c.y) / ry;
        nx * nx + ny * ny <= 1.0
    }

    /// Midpoint of the given edge.
    pub fn side_midpoint(&self, side: Side) -> Point {
        let c = self.center();
        match side {
            Side::Top => Point::new(c.x, self.y),
            Side::Bottom => Point::new(c.x, self.y + self.height),
            Side::Left => Point::new(self.x, c.y),
            Side::Right => Point::new(self.x + self.width, c.y),
        }
    }

    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => Point::new(self.x, self.y),
            Corner::TopRight => Point::new(self.x + self.width, self.y),
            Corner::BottomLeft => Point::new(self.x, self.y + self.height),
            Corner::BottomRight => Point::new(self.x + self.width, self.y + self.height),
        }
    }
}

// ─── Sides & corners ─────────────────────────────────────────────────────

/// One of the four edges of a node; each carries a port at its midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Side> {
        match s {
            "top" => Some(Side::Top),
            "bottom" => Some(Side::Bottom),
            "left" => Some(Side::Left),
            "right" => Some(Side::Right),
            _ => None,
        }
    }
}

/// A resize handle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// New (unclamped) size after dragging this corner by `delta` from `size`.
    ///
    /// Right/bottom handles grow with positive deltas, left/top handles shrink.
    pub fn apply(self, size: Size, delta: Point) -> Size {
        let (sx, sy) = match self {
            Corner::TopLeft => (-1.0, -1.0),
            Corner::TopRight => (1.0, -1.0),
            Corner::BottomLeft => (-1.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        };
        Size::new(size.width + sx * delta.x, size.height + sy * delta.y)
    }
}

// ─── Grid ────────────────────────────────────────────────────────────────

/// Snap `raw` (a top-left position) so that the center of a box of
/// `node_size` lands on the nearest grid intersection.
///
/// Idempotent: `snap(snap(p, s, g), s, g) == snap(p, s, g)`. A grid size
/// that is not strictly positive leaves `raw` unchanged.
pub fn snap(raw: Point, node_size: Size, grid_size: f32) -> Point {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return raw;
    }
    let half = node_size.half();
    let center = raw + half;
    let snapped = Point::new(
        (center.x / grid_size).round() * grid_size,
        (center.y / grid_size).round() * grid_size,
    );
    snapped - half
}

/// Copyable snapping grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub size: f32,
}

impl Grid {
    pub const fn new(size: f32) -> Self {
        Self { size }
    }

    pub fn snap(&self, raw: Point, node_size: Size) -> Point {
        snap(raw, node_size, self.size)
    }

    /// Whether `p` is a grid intersection (within float tolerance).
    pub fn is_on_grid(&self, p: Point) -> bool {
        let on = |v: f32| {
            let r = v / self.size;
            (r - r.round()).abs() < 1e-3
        };
        on(p.x) && on(p.y)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(25.0)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-10_000.0f32..10_000.0, -10_000.0f32..10_000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    fn size_strategy() -> impl Strategy<Value = Size> {
        (1.0f32..1_000.0, 1.0f32..1_000.0).prop_map(|(w, h)| Size::new(w, h))
    }

    proptest! {
        /// Snapping an already snapped position changes nothing.
        #[test]
        fn prop_snap_is_idempotent(
            p in point_strategy(),
            size in size_strategy(),
            grid in 1.0f32..100.0,
        ) {
            let once = snap(p, size, grid);
            prop_assert_eq!(snap(once, size, grid), once, "p={:?} size={:?} grid={}", p, size, grid);
        }

        /// The snapped center is a grid intersection.
        #[test]
        fn prop_snapped_center_on_grid(p in point_strategy(), size in size_strategy()) {
            let grid = Grid::default();
            let center = grid.snap(p, size) + size.half();
            prop_assert!(grid.is_on_grid(center), "center {:?} off grid", center);
        }
    }
}

use std::ops::{Add, Mul, Sub};

use serde::Serialize;

use crate::ir::Direction;

/// A 2D coordinate, SVG orientation (y grows downward).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn norm(self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn midpoint(self, other: Point) -> Point {
        (self + other) * 0.5
    }

    /// z component of the cross product.
    pub fn cross(self, other: Point) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
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

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned box stored as center and half extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub center: Point,
    pub half_width: f32,
    pub half_height: f32,
}

impl Rect {
    pub fn new(center: Point, width: f32, height: f32) -> Self {
        Self {
            center,
            half_width: width / 2.0,
            half_height: height / 2.0,
        }
    }

    pub fn expanded(self, amount: f32) -> Self {
        Self {
            center: self.center,
            half_width: self.half_width + amount,
            half_height: self.half_height + amount,
        }
    }

    /// Closed containment test.
    pub fn contains(&self, point: Point) -> bool {
        self.contains_within(point, 0.0)
    }

    pub fn contains_within(&self, point: Point, tolerance: f32) -> bool {
        (point.x - self.center.x).abs() <= self.half_width + tolerance
            && (point.y - self.center.y).abs() <= self.half_height + tolerance
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.half_width
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.half_width
    }

    pub fn top(&self) -> f32 {
        self.center.y - self.half_height
    }

    pub fn bottom(&self) -> f32 {
        self.center.y + self.half_height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSize {
    pub width: f32,
    pub height: f32,
}

/// Everything a layout engine gets to see.
#[derive(Debug, Clone)]
pub struct LayoutRequest {
    pub nodes: Vec<NodeSize>,
    /// `(from, to)` node indices, oriented for ranking.
    pub edges: Vec<(usize, usize)>,
    pub direction: Direction,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub order_passes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeGeometry {
    pub center: Point,
    pub width: f32,
    pub height: f32,
}

impl NodeGeometry {
    pub fn rect(&self) -> Rect {
        Rect::new(self.center, self.width, self.height)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutGeometry {
    pub nodes: Vec<NodeGeometry>,
    /// Bend points per edge, excluding the node centers.
    pub edges: Vec<Vec<Point>>,
}

impl LayoutGeometry {
    /// Bounding box over node boxes and bend points as `(min, max)`.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut min = Point::new(f32::INFINITY, f32::INFINITY);
        let mut max = Point::new(f32::NEG_INFINITY, f32::NEG_INFINITY);
        let mut any = false;

        for node in &self.nodes {
            let rect = node.rect();
            min.x = min.x.min(rect.left());
            min.y = min.y.min(rect.top());
            max.x = max.x.max(rect.right());
            max.y = max.y.max(rect.bottom());
            any = true;
        }
        for point in self.edges.iter().flatten() {
            min.x = min.x.min(point.x);
            min.y = min.y.min(point.y);
            max.x = max.x.max(point.x);
            max.y = max.y.max(point.y);
            any = true;
        }

        any.then_some((min, max))
    }
}

//! Geometry Layer
//!
//! Plain 2D value types shared by the coordinate mapper, the hit tester
//! and the overlay renderer. Nothing here knows about egui or images.

pub mod mapper;

pub use hit_test::hit_test;
pub use mapper::{FitMode, Transform};

use serde::{Deserialize, Serialize};

/// A 2D coordinate in either image space or display space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// Width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when both sides are finite and strictly positive
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }
}

/// Ordered vertex list of one detected text box
///
/// OCR boxes are usually quadrilaterals but may be skewed or rotated,
/// so nothing here assumes axis alignment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Axis-aligned rectangle as a four point polygon (clockwise from top-left)
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(vec![
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ])
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Fewer than three vertices cannot enclose anything
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }

    /// Even-odd containment test
    ///
    /// Casts a horizontal ray to the right of `p` and counts edge crossings.
    /// Degenerate polygons never contain anything.
    pub fn contains(&self, p: Point) -> bool {
        if self.is_degenerate() {
            return false;
        }

        let mut inside = false;
        let mut j = self.points.len() - 1;
        for i in 0..self.points.len() {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }

    /// Vertex with the smallest y (first one wins on ties)
    pub fn topmost(&self) -> Option<Point> {
        self.points
            .iter()
            .copied()
            .reduce(|best, p| if p.y < best.y { p } else { best })
    }

    /// Apply a point mapping to every vertex
    pub fn map(&self, f: impl Fn(Point) -> Point) -> Polygon {
        Polygon::new(self.points.iter().copied().map(f).collect())
    }
}

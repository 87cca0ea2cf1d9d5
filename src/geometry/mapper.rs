//! Image space <-> display space mapping
//!
//! The image is drawn into a display area using a fit mode. The resulting
//! placement is a per-axis scale plus an offset, recomputed from the current
//! sizes every time it is needed.

use serde::{Deserialize, Serialize};

use super::{Point, Size};

/// How the image is fitted into the display area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Uniform scale so the whole image fits, centered (letterboxed)
    #[default]
    Contain,
    /// Uniform scale so the image covers the area, centered (cropped)
    Cover,
    /// Independent scale per axis, image stretched to the area
    Fill,
    /// Natural size, centered
    None,
}

/// Affine scale-and-offset from image space to display space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub sx: f32,
    pub sy: f32,
    pub dx: f32,
    pub dy: f32,
    original: Size,
}

impl Transform {
    /// Compute the placement of `original` inside `display`
    ///
    /// Returns `None` when either size is not strictly positive, which
    /// callers treat as "nothing to draw, nothing to hit".
    pub fn compute(original: Size, display: Size, fit: FitMode) -> Option<Self> {
        if !original.is_positive() || !display.is_positive() {
            return None;
        }

        let (sx, sy) = match fit {
            FitMode::Contain => {
                let s = (display.width / original.width).min(display.height / original.height);
                (s, s)
            }
            FitMode::Cover => {
                let s = (display.width / original.width).max(display.height / original.height);
                (s, s)
            }
            FitMode::Fill => (
                display.width / original.width,
                display.height / original.height,
            ),
            FitMode::None => (1.0, 1.0),
        };

        let dest_w = original.width * sx;
        let dest_h = original.height * sy;

        Some(Self {
            sx,
            sy,
            dx: (display.width - dest_w) / 2.0,
            dy: (display.height - dest_h) / 2.0,
            original,
        })
    }

    /// Image space -> display space
    pub fn forward(&self, p: Point) -> Point {
        Point::new(p.x * self.sx + self.dx, p.y * self.sy + self.dy)
    }

    /// Display space -> image space
    pub fn inverse(&self, p: Point) -> Point {
        Point::new((p.x - self.dx) / self.sx, (p.y - self.dy) / self.sy)
    }

    /// Position of a display point relative to the image, (0,0)..(1,1) when on it
    pub fn relative(&self, p: Point) -> Point {
        let img = self.inverse(p);
        Point::new(img.x / self.original.width, img.y / self.original.height)
    }

    /// Where the image lands in display space: (x, y, width, height)
    pub fn dest_rect(&self) -> (f32, f32, f32, f32) {
        (
            self.dx,
            self.dy,
            self.original.width * self.sx,
            self.original.height * self.sy,
        )
    }
}

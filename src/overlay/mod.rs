//! Overlay Renderer
//!
//! Turns an OCR result into a list of display-space shapes: one closed
//! polygon per region plus a short label above it. The list is rebuilt from
//! the current values on every frame; `paint` draws it with egui and
//! `export` burns it into the original bitmap.

pub mod export;
pub mod paint;
pub mod style;

pub use style::{BoxStyle, ConfidenceTier, OverlayStyle, Rgba};

use crate::geometry::{FitMode, Point, Size, Transform};
use crate::ocr::TextRegion;

/// One region ready to draw, in display coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct RegionShape {
    /// Index of the region in the OCR result
    pub index: usize,
    /// Closed path vertices
    pub points: Vec<Point>,
    pub style: BoxStyle,
    /// Whether this is the currently selected region
    pub selected: bool,
    /// Truncated text
    pub label: String,
    /// Bottom-left corner of the label
    pub label_pos: Point,
}

/// Cut `text` to at most `max_chars` characters, ending with an ellipsis when cut
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Build the draw list for `regions` placed into `display`
///
/// Returns nothing when the sizes are degenerate. Degenerate polygons are
/// skipped.
pub fn build_overlay(
    regions: &[TextRegion],
    selected: Option<usize>,
    original: Size,
    display: Size,
    fit: FitMode,
    style: &OverlayStyle,
) -> Vec<RegionShape> {
    let Some(transform) = Transform::compute(original, display, fit) else {
        return Vec::new();
    };

    regions
        .iter()
        .enumerate()
        .filter(|(_, region)| !region.polygon.is_degenerate())
        .map(|(index, region)| {
            let mapped = region.polygon.map(|p| transform.forward(p));
            // Non-degenerate, so a topmost vertex exists
            let top = mapped.topmost().unwrap_or_default();

            let is_selected = selected == Some(index);
            RegionShape {
                index,
                style: style.box_style(region.score, is_selected),
                selected: is_selected,
                label: truncate_label(&region.text, style.label_max_chars),
                label_pos: Point::new(top.x, top.y - style.label_margin),
                points: mapped.points().to_vec(),
            }
        })
        .collect()
}

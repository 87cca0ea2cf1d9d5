//! egui painting of the overlay draw list

use egui::{Align2, Color32, FontId, Pos2, Rect, Rounding, Shape, Stroke};

use super::{OverlayStyle, RegionShape, Rgba};
use crate::geometry::Point;

fn color(rgba: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}

fn to_pos(origin: Pos2, p: Point) -> Pos2 {
    Pos2::new(origin.x + p.x, origin.y + p.y)
}

/// Draw `shapes` with display-space (0,0) at `origin`
///
/// The selected region is painted last so its thicker stroke stays on top.
pub fn paint_overlay(painter: &egui::Painter, origin: Pos2, shapes: &[RegionShape], style: &OverlayStyle) {
    let (selected, others): (Vec<_>, Vec<_>) = shapes.iter().partition(|shape| shape.selected);

    for shape in others.into_iter().chain(selected) {
        let points: Vec<Pos2> = shape.points.iter().map(|p| to_pos(origin, *p)).collect();
        painter.add(Shape::closed_line(
            points,
            Stroke::new(shape.style.stroke_width, color(shape.style.color)),
        ));

        if shape.label.is_empty() {
            continue;
        }

        let font = FontId::proportional(style.label_font_size);
        let galley = painter.layout_no_wrap(shape.label.clone(), font, color(style.label_color));
        let anchor = to_pos(origin, shape.label_pos);
        let text_rect = Align2::LEFT_BOTTOM.anchor_size(anchor, galley.size());

        painter.rect_filled(
            text_rect.expand(2.0),
            Rounding::same(2.0),
            color(style.label_background),
        );
        painter.galley(text_rect.min, galley, color(style.label_color));
    }
}

/// Paint the letterbox bars around the image so the fit is visible
pub fn paint_letterbox(painter: &egui::Painter, area: Rect, image_rect: Rect, fill: Color32) {
    let bars = [
        Rect::from_min_max(area.min, Pos2::new(area.max.x, image_rect.min.y)),
        Rect::from_min_max(Pos2::new(area.min.x, image_rect.max.y), area.max),
        Rect::from_min_max(
            Pos2::new(area.min.x, image_rect.min.y),
            Pos2::new(image_rect.min.x, image_rect.max.y),
        ),
        Rect::from_min_max(
            Pos2::new(image_rect.max.x, image_rect.min.y),
            Pos2::new(area.max.x, image_rect.max.y),
        ),
    ];
    for bar in bars {
        if bar.is_positive() {
            painter.rect_filled(bar, Rounding::ZERO, fill);
        }
    }
}

//! Image view - the photo, its overlay and tap selection

use egui::{Color32, Pos2, Rect, RichText, Rounding, Sense, Vec2};
use tracing::{debug, warn};

use crate::geometry::{hit_test, FitMode, Point, Size, Transform};
use crate::overlay::paint::{paint_letterbox, paint_overlay};
use crate::overlay::{build_overlay, OverlayStyle};
use crate::session::{Event, SessionState};
use crate::source::SourceImage;
use crate::ui::state::{PreviewTexture, ViewerState};
use crate::ui::theme::ThemeColors;

/// Largest texture side uploaded; bigger photos are downscaled for display only
const MAX_TEXTURE_SIDE: u32 = 4096;

/// Render the image area
pub fn render_image_view(
    ui: &mut egui::Ui,
    viewer: &mut ViewerState,
    session: &SessionState,
    style: &OverlayStyle,
    fit: FitMode,
) {
    let Some(image) = &session.image else {
        ui.centered_and_justified(|ui| {
            ui.label(
                RichText::new("Open an image or drop one here to start")
                    .size(18.0)
                    .color(ThemeColors::TEXT_MUTED),
            );
        });
        return;
    };

    ensure_preview(ui.ctx(), viewer, image);

    let (area, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
    let painter = ui.painter_at(area);
    painter.rect_filled(area, Rounding::same(4.0), ThemeColors::BG_DARK);

    let display = Size::new(area.width(), area.height());
    let Some(transform) = Transform::compute(image.size(), display, fit) else {
        return;
    };

    let (x, y, w, h) = transform.dest_rect();
    let image_rect = Rect::from_min_size(area.min + Vec2::new(x, y), Vec2::new(w, h));

    match &viewer.preview {
        Some(preview) if preview.image == image.id => {
            painter.image(
                preview.texture.id(),
                image_rect,
                Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
        _ => {
            painter.text(
                area.center(),
                egui::Align2::CENTER_CENTER,
                "Preview unavailable",
                egui::FontId::proportional(16.0),
                ThemeColors::TEXT_MUTED,
            );
        }
    }
    paint_letterbox(&painter, area, image_rect, ThemeColors::LETTERBOX);

    let result = session.result.as_ref().filter(|_| session.overlay_visible);
    if let Some(result) = result {
        let shapes = build_overlay(&result.regions, session.selected, image.size(), display, fit, style);
        paint_overlay(&painter, area.min, &shapes, style);

        if let Some(hover) = response.hover_pos() {
            let local = hover - area.min;
            if hit_test(image.size(), display, fit, Point::new(local.x, local.y), &result.regions).is_some() {
                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
            }
        }
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let local = pos - area.min;
            viewer.send(Event::Tapped {
                display,
                fit,
                point: Point::new(local.x, local.y),
            });
        }
    }
}

/// Upload the current image as a texture once per selection
fn ensure_preview(ctx: &egui::Context, viewer: &mut ViewerState, image: &SourceImage) {
    let current = viewer.preview.as_ref().map(|p| p.image);
    if current == Some(image.id) || viewer.preview_failed == Some(image.id) {
        return;
    }

    match decode_preview(image) {
        Ok(color_image) => {
            let texture = ctx.load_texture(
                format!("preview-{}", image.id),
                color_image,
                egui::TextureOptions::LINEAR,
            );
            viewer.preview = Some(PreviewTexture {
                image: image.id,
                texture,
            });
            viewer.preview_failed = None;
        }
        Err(e) => {
            warn!("Could not decode preview for '{}': {}", image.label, e);
            viewer.preview = None;
            viewer.preview_failed = Some(image.id);
        }
    }
}

fn decode_preview(image: &SourceImage) -> Result<egui::ColorImage, image::ImageError> {
    let mut decoded = image::load_from_memory(&image.bytes)?;
    if decoded.width() > MAX_TEXTURE_SIDE || decoded.height() > MAX_TEXTURE_SIDE {
        debug!(
            "Downscaling {}x{} preview to fit {}px",
            decoded.width(),
            decoded.height(),
            MAX_TEXTURE_SIDE
        );
        decoded = decoded.thumbnail(MAX_TEXTURE_SIDE, MAX_TEXTURE_SIDE);
    }

    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

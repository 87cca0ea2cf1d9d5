//! Burn the overlay into the original bitmap
//!
//! Used by the headless `annotate` command. Boxes are drawn at the image's
//! own resolution (identity transform); labels are not rasterized.

use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, Blend};
use tracing::info;

use super::{build_overlay, OverlayStyle, RegionShape};
use crate::geometry::FitMode;
use crate::ocr::OcrResult;
use crate::source::SourceImage;

/// Draw every region of `result` onto a copy of `image`
pub fn render_annotated(
    image: &SourceImage,
    result: &OcrResult,
    selected: Option<usize>,
    style: &OverlayStyle,
) -> Result<RgbaImage> {
    let canvas = image::load_from_memory(&image.bytes)
        .context("Failed to decode image for annotation")?
        .to_rgba8();

    let size = image.size();
    let shapes = build_overlay(&result.regions, selected, size, size, FitMode::Contain, style);

    let mut canvas = Blend(canvas);
    for shape in &shapes {
        draw_shape(&mut canvas, shape);
    }

    Ok(canvas.0)
}

/// Render and save as PNG (format taken from the extension)
pub fn export_annotated(
    image: &SourceImage,
    result: &OcrResult,
    style: &OverlayStyle,
    output: &Path,
) -> Result<()> {
    let annotated = render_annotated(image, result, None, style)?;
    annotated
        .save(output)
        .with_context(|| format!("Failed to write {:?}", output))?;
    info!("Wrote annotated image to {:?} ({} regions)", output, result.len());
    Ok(())
}

fn draw_shape(canvas: &mut Blend<RgbaImage>, shape: &RegionShape) {
    let color = Rgba(shape.style.color);
    // Wide strokes are approximated with parallel one pixel lines
    let half = (shape.style.stroke_width.max(1.0) as i32 - 1) / 2;
    let n = shape.points.len();

    for i in 0..n {
        let a = shape.points[i];
        let b = shape.points[(i + 1) % n];
        for off in -half..=half {
            let o = off as f32;
            draw_line_segment_mut(canvas, (a.x + o, a.y), (b.x + o, b.y), color);
            draw_line_segment_mut(canvas, (a.x, a.y + o), (b.x, b.y + o), color);
        }
    }

    // Mark where the label would sit
    draw_filled_circle_mut(
        canvas,
        (shape.label_pos.x as i32, shape.label_pos.y as i32),
        2,
        color,
    );
}

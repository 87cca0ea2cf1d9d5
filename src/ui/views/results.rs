//! Recognized text: single region dialog and the full list

use egui::{RichText, Rounding, Stroke, Vec2};

use crate::ocr::{OcrResult, TextRegion};
use crate::overlay::OverlayStyle;
use crate::session::{Event, SessionState};
use crate::ui::state::{PendingAction, ViewerState};
use crate::ui::theme::ThemeColors;

/// Render whichever result window is open
pub fn render_result_windows(ctx: &egui::Context, viewer: &mut ViewerState, session: &SessionState, style: &OverlayStyle) {
    let Some(result) = &session.result else {
        return;
    };

    if session.list_open {
        render_text_list(ctx, viewer, result, session.selected, style);
    } else if let (Some(index), Some(region)) = (session.selected, session.selected_region()) {
        render_region_dialog(ctx, viewer, index, region, style);
    }
}

/// Dialog for the tapped region
fn render_region_dialog(
    ctx: &egui::Context,
    viewer: &mut ViewerState,
    index: usize,
    region: &TextRegion,
    style: &OverlayStyle,
) {
    let mut open = true;

    egui::Window::new(format!("Region {}", index + 1))
        .collapsible(false)
        .resizable(false)
        .min_width(320.0)
        .anchor(egui::Align2::CENTER_BOTTOM, Vec2::new(0.0, -24.0))
        .open(&mut open)
        .show(ctx, |ui| {
            ui.vertical(|ui| {
                ui.add(egui::Label::new(RichText::new(&region.text).size(18.0)).selectable(true));

                ui.add_space(6.0);
                score_line(ui, region.score, style);
                ui.add_space(10.0);

                ui.horizontal(|ui| {
                    if ui.button("Copy").clicked() {
                        viewer.push(PendingAction::Copy {
                            text: region.text.clone(),
                            regions: 1,
                        });
                    }
                    if ui.button("Close").clicked() {
                        viewer.send(Event::RegionSelected(None));
                    }
                });
            });
        });

    if !open {
        viewer.send(Event::RegionSelected(None));
    }
}

/// Window listing every recognized region
fn render_text_list(
    ctx: &egui::Context,
    viewer: &mut ViewerState,
    result: &OcrResult,
    selected: Option<usize>,
    style: &OverlayStyle,
) {
    let mut open = true;

    egui::Window::new(format!("Recognized text ({})", result.len()))
        .collapsible(false)
        .resizable(true)
        .default_width(420.0)
        .default_height(480.0)
        .anchor(egui::Align2::RIGHT_TOP, Vec2::new(-16.0, 64.0))
        .open(&mut open)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Copy all").clicked() {
                    viewer.push(PendingAction::Copy {
                        text: result.joined_text(),
                        regions: result.len(),
                    });
                }
                ui.label(
                    RichText::new("Click a row to highlight it")
                        .small()
                        .color(ThemeColors::TEXT_MUTED),
                );
            });
            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| {
                for (idx, region) in result.regions.iter().enumerate() {
                    ui.push_id(idx, |ui| {
                        render_list_item(ui, viewer, idx, region, selected == Some(idx), style);
                    });
                    ui.add_space(4.0);
                }
            });
        });

    if !open {
        viewer.send(Event::ListToggled(false));
    }
}

fn render_list_item(
    ui: &mut egui::Ui,
    viewer: &mut ViewerState,
    idx: usize,
    region: &TextRegion,
    is_selected: bool,
    style: &OverlayStyle,
) {
    let border = if is_selected {
        ThemeColors::ACCENT_PRIMARY
    } else {
        ThemeColors::BORDER
    };

    egui::Frame::none()
        .fill(ThemeColors::BG_LIGHT)
        .rounding(Rounding::same(4.0))
        .stroke(Stroke::new(1.0, border))
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("{}.", idx + 1)).color(ThemeColors::TEXT_MUTED));

                let text = ui.add(
                    egui::Label::new(RichText::new(&region.text).color(ThemeColors::TEXT_PRIMARY))
                        .sense(egui::Sense::click()),
                );
                if text.clicked() {
                    let next = if is_selected { None } else { Some(idx) };
                    viewer.send(Event::RegionSelected(next));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("Copy").clicked() {
                        viewer.push(PendingAction::Copy {
                            text: region.text.clone(),
                            regions: 1,
                        });
                    }
                    let tier = style.tier(region.score);
                    ui.label(
                        RichText::new(format!("{:.0}%", region.score * 100.0))
                            .small()
                            .color(ThemeColors::tier(tier)),
                    );
                });
            });
        });
}

fn score_line(ui: &mut egui::Ui, score: f32, style: &OverlayStyle) {
    let tier = style.tier(score);
    ui.horizontal(|ui| {
        ui.label(RichText::new("Confidence:").color(ThemeColors::TEXT_SECONDARY));
        ui.label(
            RichText::new(format!("{:.1}% ({})", score * 100.0, tier.label()))
                .color(ThemeColors::tier(tier))
                .strong(),
        );
    });
}

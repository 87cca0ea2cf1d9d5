//! Top toolbar: image path, OCR trigger, overlay and list toggles

use std::path::PathBuf;

use egui::RichText;

use crate::session::{Event, Phase, SessionState};
use crate::ui::state::{PendingAction, ViewerState};
use crate::ui::theme::ThemeColors;

/// Render the toolbar
pub fn render_toolbar(ui: &mut egui::Ui, viewer: &mut ViewerState, session: &SessionState, engine_name: &str) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("OCR Overlay").size(18.0).strong().color(ThemeColors::ACCENT_PRIMARY));
        ui.add_space(12.0);

        let path_edit = ui.add(
            egui::TextEdit::singleline(&mut viewer.path_input)
                .hint_text("Path to an image, or drop a file here")
                .desired_width(320.0),
        );
        let submitted = path_edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        let path = viewer.path_input.trim().to_string();
        if (ui.add_enabled(!path.is_empty(), egui::Button::new("Open")).clicked() || submitted)
            && !path.is_empty()
        {
            viewer.push(PendingAction::Open(PathBuf::from(path)));
        }

        ui.separator();

        let running = session.phase() == Phase::OcrRunning;
        if ui
            .add_enabled(session.can_run_ocr(), egui::Button::new("Run OCR"))
            .on_hover_text(format!("Send the image to the '{}' engine", engine_name))
            .clicked()
        {
            viewer.send(Event::OcrRequested);
        }
        if running {
            ui.spinner();
            ui.label(RichText::new("Recognizing...").color(ThemeColors::ACCENT_WARNING));
        }

        let has_result = session.result.is_some();

        let mut overlay = session.overlay_visible;
        if ui
            .add_enabled(has_result, egui::Checkbox::new(&mut overlay, "Show boxes"))
            .changed()
        {
            viewer.send(Event::OverlayToggled);
        }

        let has_text = session.result.as_ref().is_some_and(|r| !r.is_empty());
        if ui.add_enabled(has_text, egui::Button::new("All text")).clicked() {
            viewer.send(Event::ListToggled(true));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(status_text(session)).color(ThemeColors::TEXT_SECONDARY));
        });
    });
}

fn status_text(session: &SessionState) -> String {
    match (session.phase(), &session.image, &session.result) {
        (Phase::NoImage, _, _) => "No image".to_string(),
        (Phase::OcrRunning, Some(image), _) => format!("{} - running OCR", image.label),
        (Phase::OcrComplete, Some(image), Some(result)) => {
            format!("{} - {} regions", image.label, result.len())
        }
        (_, Some(image), _) => format!("{} ({}x{})", image.label, image.width, image.height),
        _ => String::new(),
    }
}

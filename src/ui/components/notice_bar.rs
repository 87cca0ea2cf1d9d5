//! Transient notice strip shown at the bottom of the window

use std::time::Instant;

use egui::{RichText, Rounding};

use crate::session::{Event, Notice, NoticeKind};
use crate::ui::state::{ViewerState, NOTICE_DURATION};
use crate::ui::theme::{color_with_alpha, ThemeColors};

/// Render `notice` and queue its dismissal once it has been up long enough
pub fn render_notice_bar(ui: &mut egui::Ui, viewer: &mut ViewerState, notice: &Notice) {
    if viewer.notice_expired(notice, Instant::now()) {
        viewer.send(Event::NoticeDismissed);
        return;
    }

    let accent = ThemeColors::notice(notice.kind);
    egui::Frame::none()
        .fill(color_with_alpha(accent, 40))
        .rounding(Rounding::same(6.0))
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                let icon = match notice.kind {
                    NoticeKind::Info => "i",
                    NoticeKind::Error => "!",
                };
                ui.label(RichText::new(icon).strong().color(accent));
                ui.label(RichText::new(&notice.message).color(ThemeColors::TEXT_PRIMARY));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.small_button("Dismiss").clicked() {
                        viewer.send(Event::NoticeDismissed);
                    }
                });
            });
        });

    // Wake up again when the notice is due to disappear
    ui.ctx().request_repaint_after(NOTICE_DURATION);
}

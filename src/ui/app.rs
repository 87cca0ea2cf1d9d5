//! Viewer application entry point

use std::path::{Path, PathBuf};
use std::sync::Arc;

use eframe::egui;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::config::{save_config, AppConfig};
use crate::overlay::OverlayStyle;
use crate::session::{Event, SessionController};
use crate::ui::components::render_notice_bar;
use crate::ui::state::{PendingAction, ViewerState};
use crate::ui::theme;
use crate::ui::views::{render_image_view, render_result_windows, render_toolbar};

/// The OCR overlay viewer
pub struct ViewerApp {
    /// Session and OCR engine
    controller: SessionController,
    /// Loaded configuration
    config: AppConfig,
    /// Where the configuration is saved back to, if anywhere
    config_path: Option<PathBuf>,
    /// Overlay colors and thresholds
    style: OverlayStyle,
    /// Viewer-only state
    viewer: ViewerState,
    /// Whether theme has been applied
    theme_applied: bool,
    /// Runtime the OCR requests run on; kept alive for the app's lifetime
    _runtime: Runtime,
}

impl ViewerApp {
    pub fn new(
        controller: SessionController,
        config: AppConfig,
        config_path: Option<PathBuf>,
        runtime: Runtime,
    ) -> Self {
        let style = OverlayStyle::from_settings(&config.overlay);
        let path_input = config
            .general
            .last_directory
            .as_deref()
            .map(|dir| format!("{}{}", dir.trim_end_matches(std::path::MAIN_SEPARATOR), std::path::MAIN_SEPARATOR))
            .unwrap_or_default();

        Self {
            controller,
            config,
            config_path,
            style,
            viewer: ViewerState::new(path_input),
            theme_applied: false,
            _runtime: runtime,
        }
    }

    /// Native window options
    pub fn options(config: &AppConfig) -> eframe::NativeOptions {
        eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([config.window.width, config.window.height])
                .with_min_inner_size([640.0, 480.0])
                .with_title("OCR Overlay")
                .with_drag_and_drop(true),
            ..Default::default()
        }
    }

    /// Queue files dropped onto the window
    fn collect_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());

        // Only the last file becomes the current image
        if let Some(file) = dropped.into_iter().last() {
            if let Some(path) = file.path {
                self.viewer.push(PendingAction::Open(path));
            } else if let Some(bytes) = file.bytes {
                self.viewer.push(PendingAction::OpenBytes {
                    bytes: bytes.to_vec(),
                    label: file.name,
                });
            }
        }
    }

    /// Apply everything the widgets queued this frame
    fn process_pending(&mut self, ctx: &egui::Context) {
        for action in std::mem::take(&mut self.viewer.pending) {
            match action {
                PendingAction::Session(event) => self.controller.dispatch(event),
                PendingAction::Open(path) => {
                    self.controller.open_path(&path);
                    if self.controller.state().image.is_some() {
                        self.remember_directory(&path);
                    }
                }
                PendingAction::OpenBytes { bytes, label } => {
                    self.controller.open_bytes(bytes, &label);
                }
                PendingAction::Copy { text, regions } => {
                    ctx.copy_text(text);
                    self.controller.dispatch(Event::Copied { regions });
                }
            }
        }
    }

    /// Persist the directory of an opened file so the next launch starts there
    fn remember_directory(&mut self, path: &Path) {
        let Some(dir) = path.parent().and_then(|p| p.to_str()) else {
            return;
        };
        if dir.is_empty() || self.config.general.last_directory.as_deref() == Some(dir) {
            return;
        }

        self.config.general.last_directory = Some(dir.to_string());
        if let Some(config_path) = &self.config_path {
            if let Err(e) = save_config(&self.config, config_path) {
                warn!("Failed to save configuration: {:#}", e);
            }
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme once
        if !self.theme_applied {
            theme::apply_theme(ctx);
            self.theme_applied = true;
        }

        // Apply OCR completions that arrived since the last frame
        self.controller.poll();
        if self.controller.state().is_running() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        self.collect_dropped_files(ctx);

        let state = self.controller.state();
        let engine_name = self.controller.engine_name().to_string();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            render_toolbar(ui, &mut self.viewer, state, &engine_name);
            ui.add_space(4.0);
        });

        if let Some(notice) = &state.notice {
            egui::TopBottomPanel::bottom("notice").show(ctx, |ui| {
                ui.add_space(4.0);
                render_notice_bar(ui, &mut self.viewer, notice);
                ui.add_space(4.0);
            });
        }

        let fit = self.config.overlay.fit_mode;
        egui::CentralPanel::default().show(ctx, |ui| {
            render_image_view(ui, &mut self.viewer, state, &self.style, fit);
        });

        render_result_windows(ctx, &mut self.viewer, state, &self.style);

        self.process_pending(ctx);
    }
}

/// Run the viewer window (blocking)
pub fn run_viewer(
    mut controller: SessionController,
    config: AppConfig,
    config_path: Option<PathBuf>,
    runtime: Runtime,
) -> Result<(), eframe::Error> {
    info!("Starting viewer");
    let options = ViewerApp::options(&config);

    eframe::run_native(
        "OCR Overlay",
        options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            controller.set_repaint_hook(Arc::new(move || ctx.request_repaint()));
            Ok(Box::new(ViewerApp::new(controller, config, config_path, runtime)))
        }),
    )
}

//! Viewer UI Module
//!
//! Single-window eframe application: toolbar, image with overlay,
//! recognized-text windows and a notice strip.

pub mod app;
pub mod components;
pub mod state;
pub mod theme;
pub mod views;

pub use app::run_viewer;

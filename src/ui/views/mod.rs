//! Viewer views

pub mod image_view;
pub mod results;
pub mod toolbar;

pub use image_view::render_image_view;
pub use results::render_result_windows;
pub use toolbar::render_toolbar;

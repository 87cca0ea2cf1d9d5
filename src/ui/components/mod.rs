//! Reusable UI components

pub mod notice_bar;

pub use notice_bar::render_notice_bar;

//! Presentation session
//!
//! The per-image workflow: choose an image, run OCR once at a time,
//! keep the result, select regions. `state` holds the pure state machine,
//! `controller` runs its effects on the async runtime.

pub mod controller;
pub mod state;

pub use controller::SessionController;
pub use state::{Event, Notice, NoticeKind, Phase, SessionState};

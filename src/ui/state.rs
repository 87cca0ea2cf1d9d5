//! Viewer-side state that is not part of the session
//!
//! Texture cache, the path field and notice timing. Everything the user
//! did during a frame is queued as [`PendingAction`]s and applied by the
//! app once the frame's widgets are laid out.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::session::{Event, Notice};
use crate::source::ImageId;

/// How long a notice stays on screen
pub const NOTICE_DURATION: Duration = Duration::from_secs(4);

/// Work requested by widgets during a frame
#[derive(Debug)]
pub enum PendingAction {
    /// Forward to the session
    Session(Event),
    /// Load an image file
    Open(PathBuf),
    /// Load dropped bytes
    OpenBytes { bytes: Vec<u8>, label: String },
    /// Put text on the clipboard (region count for the notice)
    Copy { text: String, regions: usize },
}

/// Uploaded preview of the current image
pub struct PreviewTexture {
    pub image: ImageId,
    pub texture: egui::TextureHandle,
}

/// Viewer state
pub struct ViewerState {
    /// Path typed in the toolbar
    pub path_input: String,
    /// Preview for the current image; `None` until uploaded or if decoding failed
    pub preview: Option<PreviewTexture>,
    /// Image whose preview failed to decode, so it is not retried every frame
    pub preview_failed: Option<ImageId>,
    /// Notice currently on screen and when it appeared
    pub notice_shown: Option<(u64, Instant)>,
    /// Actions queued this frame
    pub pending: Vec<PendingAction>,
}

impl std::fmt::Debug for ViewerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerState")
            .field("path_input", &self.path_input)
            .field("preview", &self.preview.as_ref().map(|p| p.image))
            .field("preview_failed", &self.preview_failed)
            .field("notice_shown", &self.notice_shown)
            .field("pending", &self.pending)
            .finish()
    }
}

impl ViewerState {
    pub fn new(path_input: String) -> Self {
        Self {
            path_input,
            preview: None,
            preview_failed: None,
            notice_shown: None,
            pending: Vec::new(),
        }
    }

    pub fn push(&mut self, action: PendingAction) {
        self.pending.push(action);
    }

    pub fn send(&mut self, event: Event) {
        self.pending.push(PendingAction::Session(event));
    }

    /// Whether `notice` has been visible for its full duration
    ///
    /// A notice with a new sequence number restarts the timer.
    pub fn notice_expired(&mut self, notice: &Notice, now: Instant) -> bool {
        match self.notice_shown {
            Some((seq, shown_at)) if seq == notice.seq => now.duration_since(shown_at) >= NOTICE_DURATION,
            _ => {
                self.notice_shown = Some((notice.seq, now));
                false
            }
        }
    }
}

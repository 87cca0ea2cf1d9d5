//! Session state machine
//!
//! Everything the screen shows is derived from [`SessionState`], and the
//! only way to change it is [`transition`]. Side effects (starting an OCR
//! request) come back as [`Effect`] values for the controller to run.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::geometry::{hit_test, FitMode, Point, Size};
use crate::ocr::{OcrError, OcrResult};
use crate::source::{ImageId, SourceImage};

/// Identifies one OCR request: the image it was issued for plus a sequence number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTag {
    pub image: ImageId,
    pub seq: u64,
}

/// Coarse session phase, derived from the state fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoImage,
    ImageSelected,
    OcrRunning,
    OcrComplete,
}

/// Transient message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// User-visible transient message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    /// Increments for every new notice so the UI can restart its timer
    pub seq: u64,
}

/// Inputs to the state machine
#[derive(Debug)]
pub enum Event {
    /// A new image was acquired
    ImageSelected(SourceImage),
    /// Acquisition failed
    ImageFailed(String),
    /// User asked to run OCR on the current image
    OcrRequested,
    /// An OCR request completed (successfully or not)
    OcrFinished {
        tag: RequestTag,
        outcome: Result<OcrResult, OcrError>,
    },
    /// Show/hide the box overlay
    OverlayToggled,
    /// Tap/click in display space on the image area
    Tapped {
        display: Size,
        fit: FitMode,
        point: Point,
    },
    /// Select a region directly (from the list) or clear the selection
    RegionSelected(Option<usize>),
    /// Open or close the full text list
    ListToggled(bool),
    /// Text was placed on the clipboard
    Copied { regions: usize },
    NoticeDismissed,
}

/// Work the controller must perform after a transition
#[derive(Debug, Clone)]
pub enum Effect {
    StartOcr { tag: RequestTag, bytes: Arc<[u8]> },
}

/// Complete per-session state
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Currently selected image
    pub image: Option<SourceImage>,
    /// Result for the current image; `None` until an OCR run succeeds
    pub result: Option<OcrResult>,
    /// Index into `result`
    pub selected: Option<usize>,
    /// Outstanding request, if any
    pub in_flight: Option<RequestTag>,
    /// Whether boxes are drawn over the image
    pub overlay_visible: bool,
    /// Whether the full text list is open
    pub list_open: bool,
    /// Latest transient message
    pub notice: Option<Notice>,
    next_request_seq: u64,
    next_notice_seq: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            image: None,
            result: None,
            selected: None,
            in_flight: None,
            overlay_visible: true,
            list_open: false,
            notice: None,
            next_request_seq: 0,
            next_notice_seq: 0,
        }
    }
}

impl SessionState {
    /// Start a session with the overlay initially shown or hidden
    pub fn with_overlay(overlay_visible: bool) -> Self {
        Self {
            overlay_visible,
            ..Default::default()
        }
    }

    pub fn phase(&self) -> Phase {
        if self.image.is_none() {
            Phase::NoImage
        } else if self.in_flight.is_some() {
            Phase::OcrRunning
        } else if self.result.is_some() {
            Phase::OcrComplete
        } else {
            Phase::ImageSelected
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the "Run OCR" action is currently available
    pub fn can_run_ocr(&self) -> bool {
        self.image.is_some() && self.in_flight.is_none()
    }

    /// The selected region's index, only if it still refers to the current result
    pub fn selected_region(&self) -> Option<&crate::ocr::TextRegion> {
        let idx = self.selected?;
        self.result.as_ref()?.get(idx)
    }

    fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.next_notice_seq += 1;
        self.notice = Some(Notice {
            kind,
            message: message.into(),
            seq: self.next_notice_seq,
        });
    }

    fn replace_result(&mut self, result: Option<OcrResult>) {
        self.result = result;
        self.selected = None;
    }
}

/// Apply one event to the session
pub fn transition(mut state: SessionState, event: Event) -> (SessionState, Option<Effect>) {
    let mut effect = None;

    match event {
        Event::ImageSelected(image) => {
            if let Some(tag) = state.in_flight.take() {
                info!("Image changed while OCR request {} is outstanding; it will be discarded", tag.seq);
            }
            info!("Selected image '{}' ({}x{})", image.label, image.width, image.height);
            state.image = Some(image);
            state.replace_result(None);
            state.list_open = false;
            state.notice = None;
        }

        Event::ImageFailed(message) => {
            warn!("Image acquisition failed: {}", message);
            state.notify(NoticeKind::Error, format!("Could not load image: {}", message));
        }

        Event::OcrRequested => {
            let image = state.image.as_ref().map(|i| (i.id, i.bytes.clone()));
            match (image, state.in_flight) {
                (None, _) => {
                    debug!("OCR requested without an image; ignoring");
                }
                (Some(_), Some(tag)) => {
                    debug!("OCR request {} already running; ignoring", tag.seq);
                }
                (Some((image_id, bytes)), None) => {
                    state.next_request_seq += 1;
                    let tag = RequestTag {
                        image: image_id,
                        seq: state.next_request_seq,
                    };
                    info!("Starting OCR request {} for image {}", tag.seq, tag.image);
                    state.in_flight = Some(tag);
                    effect = Some(Effect::StartOcr { tag, bytes });
                }
            }
        }

        Event::OcrFinished { tag, outcome } => {
            if state.in_flight != Some(tag) {
                debug!("Discarding stale OCR response {} for image {}", tag.seq, tag.image);
                return (state, None);
            }
            state.in_flight = None;

            match outcome {
                Ok(result) if result.is_empty() => {
                    info!("OCR request {} found no text", tag.seq);
                    state.replace_result(Some(result));
                    state.notify(NoticeKind::Info, "No text detected");
                }
                Ok(result) => {
                    info!("OCR request {} found {} regions", tag.seq, result.len());
                    let count = result.len();
                    state.replace_result(Some(result));
                    state.notify(
                        NoticeKind::Info,
                        format!("Detected {} text region{}", count, if count == 1 { "" } else { "s" }),
                    );
                }
                Err(e) => {
                    warn!("OCR request {} failed: {}", tag.seq, e);
                    state.notify(NoticeKind::Error, e.to_string());
                }
            }
        }

        Event::OverlayToggled => {
            state.overlay_visible = !state.overlay_visible;
            if !state.overlay_visible {
                state.selected = None;
            }
        }

        Event::Tapped { display, fit, point } => {
            if state.overlay_visible {
                if let (Some(image), Some(result)) = (&state.image, &state.result) {
                    let hit = hit_test(image.size(), display, fit, point, &result.regions);
                    state.selected = hit;
                }
            }
        }

        Event::RegionSelected(index) => {
            let len = state.result.as_ref().map(|r| r.len()).unwrap_or(0);
            state.selected = index.filter(|&i| i < len);
        }

        Event::ListToggled(open) => {
            state.list_open = open && state.result.is_some();
        }

        Event::Copied { regions } => {
            let message = if regions == 1 {
                "Copied text to clipboard".to_string()
            } else {
                format!("Copied {} regions to clipboard", regions)
            };
            state.notify(NoticeKind::Info, message);
        }

        Event::NoticeDismissed => {
            state.notice = None;
        }
    }

    (state, effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;
    use crate::ocr::TextRegion;
    use crate::source::tests::png_bytes;

    fn image(w: u32, h: u32) -> SourceImage {
        SourceImage::from_bytes(png_bytes(w, h), "photo.png").unwrap()
    }

    fn two_regions() -> OcrResult {
        OcrResult::new(vec![
            TextRegion {
                polygon: Polygon::from_rect(0.0, 0.0, 500.0, 500.0),
                text: "top".into(),
                score: 0.95,
            },
            TextRegion {
                polygon: Polygon::from_rect(0.0, 1000.0, 1000.0, 500.0),
                text: "bottom".into(),
                score: 0.6,
            },
        ])
    }

    fn start_ocr(state: SessionState) -> (SessionState, RequestTag) {
        let (state, effect) = transition(state, Event::OcrRequested);
        match effect {
            Some(Effect::StartOcr { tag, .. }) => (state, tag),
            None => panic!("expected OCR to start"),
        }
    }

    #[test]
    fn test_full_session_flow() {
        let state = SessionState::default();
        assert_eq!(state.phase(), Phase::NoImage);

        let (state, effect) = transition(state, Event::ImageSelected(image(1000, 2000)));
        assert!(effect.is_none());
        assert_eq!(state.phase(), Phase::ImageSelected);

        let (state, tag) = start_ocr(state);
        assert_eq!(state.phase(), Phase::OcrRunning);
        assert!(!state.can_run_ocr());

        let (state, _) = transition(
            state,
            Event::OcrFinished {
                tag,
                outcome: Ok(two_regions()),
            },
        );
        assert_eq!(state.phase(), Phase::OcrComplete);
        assert_eq!(state.result.as_ref().map(|r| r.len()), Some(2));
        assert_eq!(state.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Info));

        // Tap the bottom region: image (500, 1250) -> display (250, 312.5)
        let (state, _) = transition(
            state,
            Event::Tapped {
                display: Size::new(500.0, 500.0),
                fit: FitMode::Contain,
                point: Point::new(250.0, 312.5),
            },
        );
        assert_eq!(state.selected, Some(1));
        assert_eq!(state.selected_region().map(|r| r.text.as_str()), Some("bottom"));
    }

    #[test]
    fn test_ocr_without_image_is_ignored() {
        let (state, effect) = transition(SessionState::default(), Event::OcrRequested);
        assert!(effect.is_none());
        assert_eq!(state.phase(), Phase::NoImage);
    }

    #[test]
    fn test_retrigger_while_running_is_ignored() {
        let (state, _) = transition(SessionState::default(), Event::ImageSelected(image(10, 10)));
        let (state, first) = start_ocr(state);
        let (state, effect) = transition(state, Event::OcrRequested);
        assert!(effect.is_none());
        assert_eq!(state.in_flight, Some(first));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let (state, _) = transition(SessionState::default(), Event::ImageSelected(image(10, 10)));
        let (state, tag_a) = start_ocr(state);

        // User picks image B before A's response arrives
        let (state, _) = transition(state, Event::ImageSelected(image(20, 20)));
        assert_eq!(state.phase(), Phase::ImageSelected);

        let (state, _) = transition(
            state,
            Event::OcrFinished {
                tag: tag_a,
                outcome: Ok(two_regions()),
            },
        );
        assert!(state.result.is_none());
        assert_eq!(state.phase(), Phase::ImageSelected);
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_stale_response_does_not_clear_newer_request() {
        let (state, _) = transition(SessionState::default(), Event::ImageSelected(image(10, 10)));
        let (state, tag_a) = start_ocr(state);
        let (state, _) = transition(state, Event::ImageSelected(image(20, 20)));
        let (state, tag_b) = start_ocr(state);

        let (state, _) = transition(
            state,
            Event::OcrFinished {
                tag: tag_a,
                outcome: Err(OcrError::Engine("late failure".into())),
            },
        );
        assert_eq!(state.in_flight, Some(tag_b));
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_empty_result_is_informational() {
        let (state, _) = transition(SessionState::default(), Event::ImageSelected(image(10, 10)));
        let (state, tag) = start_ocr(state);
        let (state, _) = transition(
            state,
            Event::OcrFinished {
                tag,
                outcome: Ok(OcrResult::default()),
            },
        );

        assert_eq!(state.phase(), Phase::OcrComplete);
        assert!(state.result.as_ref().is_some_and(|r| r.is_empty()));
        let notice = state.notice.as_ref().unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert_eq!(notice.message, "No text detected");
    }

    #[test]
    fn test_failure_keeps_previous_result() {
        let (state, _) = transition(SessionState::default(), Event::ImageSelected(image(10, 10)));
        let (state, tag) = start_ocr(state);
        let (state, _) = transition(
            state,
            Event::OcrFinished {
                tag,
                outcome: Ok(two_regions()),
            },
        );

        let (state, tag) = start_ocr(state);
        let (state, _) = transition(
            state,
            Event::OcrFinished {
                tag,
                outcome: Err(OcrError::Timeout(30)),
            },
        );

        assert!(!state.is_running());
        assert_eq!(state.result.as_ref().map(|r| r.len()), Some(2));
        let notice = state.notice.as_ref().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.message.contains("timed out"));
    }

    #[test]
    fn test_image_failure_leaves_state_unchanged() {
        let (state, _) = transition(SessionState::default(), Event::ImageSelected(image(10, 10)));
        let id = state.image.as_ref().map(|i| i.id);

        let (state, _) = transition(state, Event::ImageFailed("permission denied".into()));
        assert_eq!(state.image.as_ref().map(|i| i.id), id);
        assert_eq!(state.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Error));
    }

    #[test]
    fn test_new_result_invalidates_selection() {
        let (state, _) = transition(SessionState::default(), Event::ImageSelected(image(1000, 2000)));
        let (state, tag) = start_ocr(state);
        let (state, _) = transition(state, Event::OcrFinished { tag, outcome: Ok(two_regions()) });
        let (state, _) = transition(state, Event::RegionSelected(Some(1)));
        assert_eq!(state.selected, Some(1));

        let (state, tag) = start_ocr(state);
        let (state, _) = transition(state, Event::OcrFinished { tag, outcome: Ok(two_regions()) });
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_hidden_overlay_ignores_taps() {
        let (state, _) = transition(SessionState::default(), Event::ImageSelected(image(1000, 2000)));
        let (state, tag) = start_ocr(state);
        let (state, _) = transition(state, Event::OcrFinished { tag, outcome: Ok(two_regions()) });
        let (state, _) = transition(state, Event::OverlayToggled);
        assert!(!state.overlay_visible);

        let (state, _) = transition(
            state,
            Event::Tapped {
                display: Size::new(500.0, 500.0),
                fit: FitMode::Contain,
                point: Point::new(130.0, 5.0),
            },
        );
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_tap_outside_clears_selection() {
        let (state, _) = transition(SessionState::default(), Event::ImageSelected(image(1000, 2000)));
        let (state, tag) = start_ocr(state);
        let (state, _) = transition(state, Event::OcrFinished { tag, outcome: Ok(two_regions()) });
        let (state, _) = transition(state, Event::RegionSelected(Some(0)));

        let (state, _) = transition(
            state,
            Event::Tapped {
                display: Size::new(500.0, 500.0),
                fit: FitMode::Contain,
                point: Point::new(10.0, 250.0),
            },
        );
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_region_selected_out_of_range_is_rejected() {
        let (state, _) = transition(SessionState::default(), Event::ImageSelected(image(10, 10)));
        let (state, _) = transition(state, Event::RegionSelected(Some(0)));
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_copy_and_dismiss_notice() {
        let (state, _) = transition(SessionState::default(), Event::Copied { regions: 3 });
        let first = state.notice.clone().unwrap();
        assert_eq!(first.message, "Copied 3 regions to clipboard");

        let (state, _) = transition(state, Event::Copied { regions: 1 });
        let second = state.notice.clone().unwrap();
        assert_eq!(second.message, "Copied text to clipboard");
        assert!(second.seq > first.seq);

        let (state, _) = transition(state, Event::NoticeDismissed);
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_list_requires_result() {
        let (state, _) = transition(SessionState::default(), Event::ListToggled(true));
        assert!(!state.list_open);
    }
}

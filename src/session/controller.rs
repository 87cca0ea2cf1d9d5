//! Session controller
//!
//! Owns the session state and the OCR engine. UI input is fed in through
//! [`SessionController::dispatch`]; OCR runs as a tokio task whose outcome
//! comes back over a channel and is applied on the next [`SessionController::poll`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tokio::runtime::Handle;
use tracing::{debug, info};

use super::state::{transition, Effect, Event, SessionState};
use crate::ocr::{OcrEngine, OcrError};
use crate::source::SourceImage;

/// Callback used to wake the UI when a background request completes
pub type RepaintHook = Arc<dyn Fn() + Send + Sync>;

/// Drives one image session against an OCR engine
pub struct SessionController {
    state: SessionState,
    engine: Arc<dyn OcrEngine>,
    runtime: Handle,
    timeout: Duration,
    completion_tx: Sender<Event>,
    completion_rx: Receiver<Event>,
    repaint: Option<RepaintHook>,
}

impl SessionController {
    /// Create a controller that spawns OCR requests on `runtime`
    pub fn new(engine: Arc<dyn OcrEngine>, runtime: Handle, timeout: Duration) -> Self {
        let (completion_tx, completion_rx) = unbounded();
        Self {
            state: SessionState::default(),
            engine,
            runtime,
            timeout,
            completion_tx,
            completion_rx,
            repaint: None,
        }
    }

    /// Start with the overlay hidden or shown
    pub fn with_overlay_visible(mut self, visible: bool) -> Self {
        self.state = SessionState::with_overlay(visible);
        self
    }

    /// Register a hook called from the worker after each completion
    pub fn set_repaint_hook(&mut self, hook: RepaintHook) {
        self.repaint = Some(hook);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Apply an event and run whatever effect it produces
    pub fn dispatch(&mut self, event: Event) {
        let (state, effect) = transition(std::mem::take(&mut self.state), event);
        self.state = state;

        if let Some(effect) = effect {
            self.run_effect(effect);
        }
    }

    /// Load an image file and make it the current image
    ///
    /// Failures surface as an error notice; the current session is kept.
    pub fn open_path(&mut self, path: &Path) {
        info!("Opening image {:?}", path);
        match SourceImage::from_path(path) {
            Ok(image) => self.dispatch(Event::ImageSelected(image)),
            Err(e) => self.dispatch(Event::ImageFailed(e.to_string())),
        }
    }

    /// Make an in-memory encoded image the current image
    pub fn open_bytes(&mut self, bytes: Vec<u8>, label: &str) {
        match SourceImage::from_bytes(bytes, label) {
            Ok(image) => self.dispatch(Event::ImageSelected(image)),
            Err(e) => self.dispatch(Event::ImageFailed(e.to_string())),
        }
    }

    /// Apply every completion that has arrived; returns how many were applied
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.completion_rx.try_recv() {
            self.dispatch(event);
            applied += 1;
        }
        applied
    }

    /// Block until one completion arrives (or `wait` elapses) and apply it
    ///
    /// Meant for headless callers; the UI uses [`Self::poll`].
    pub fn wait_for_completion(&mut self, wait: Duration) -> bool {
        match self.completion_rx.recv_timeout(wait) {
            Ok(event) => {
                self.dispatch(event);
                true
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::StartOcr { tag, bytes } => {
                let engine = self.engine.clone();
                let tx = self.completion_tx.clone();
                let repaint = self.repaint.clone();
                let timeout = self.timeout;

                self.runtime.spawn(async move {
                    debug!("OCR request {} running on '{}'", tag.seq, engine.name());
                    let outcome = match tokio::time::timeout(timeout, engine.recognize(&bytes)).await {
                        Ok(outcome) => outcome,
                        Err(_) => Err(OcrError::Timeout(timeout.as_secs())),
                    };

                    // Receiver gone means the session was dropped
                    let _ = tx.send(Event::OcrFinished { tag, outcome });
                    if let Some(repaint) = repaint {
                        repaint();
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;
    use crate::ocr::{OcrResult, TextRegion};
    use crate::session::state::{NoticeKind, Phase};
    use crate::source::tests::png_bytes;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    const WAIT: Duration = Duration::from_secs(5);

    /// Deterministic engine: answers by input bytes, optionally held behind a gate
    struct FakeEngine {
        answers: Mutex<HashMap<Vec<u8>, OcrResult>>,
        gate: Option<Arc<Semaphore>>,
        calls: AtomicUsize,
    }

    impl FakeEngine {
        fn new() -> Self {
            Self {
                answers: Mutex::new(HashMap::new()),
                gate: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn gated(gate: Arc<Semaphore>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new()
            }
        }

        fn answer(&self, bytes: &[u8], result: OcrResult) {
            self.answers.lock().insert(bytes.to_vec(), result);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OcrEngine for FakeEngine {
        async fn recognize(&self, image: &[u8]) -> Result<OcrResult, OcrError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.acquire()
                    .await
                    .map_err(|e| OcrError::Engine(e.to_string()))?
                    .forget();
            }
            self.answers
                .lock()
                .get(image)
                .cloned()
                .ok_or_else(|| OcrError::Engine("unknown image".into()))
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    /// Engine that never answers
    struct HungEngine;

    #[async_trait]
    impl OcrEngine for HungEngine {
        async fn recognize(&self, _image: &[u8]) -> Result<OcrResult, OcrError> {
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "hung"
        }
    }

    fn one_region(text: &str) -> OcrResult {
        OcrResult::new(vec![TextRegion {
            polygon: Polygon::from_rect(0.0, 0.0, 5.0, 5.0),
            text: text.to_string(),
            score: 0.9,
        }])
    }

    #[test]
    fn test_ocr_round_trip_through_runtime() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let bytes = png_bytes(10, 10);
        let engine = Arc::new(FakeEngine::new());
        engine.answer(&bytes, one_region("hello"));

        let mut controller = SessionController::new(engine.clone(), rt.handle().clone(), WAIT);
        controller.open_bytes(bytes, "a.png");
        controller.dispatch(Event::OcrRequested);
        assert_eq!(controller.state().phase(), Phase::OcrRunning);

        assert!(controller.wait_for_completion(WAIT));
        assert_eq!(controller.state().phase(), Phase::OcrComplete);
        assert_eq!(
            controller.state().result.as_ref().map(|r| r.joined_text()),
            Some("hello".to_string())
        );
        assert_eq!(engine.calls(), 1);
    }

    #[test]
    fn test_only_one_request_in_flight() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let gate = Arc::new(Semaphore::new(0));
        let bytes = png_bytes(10, 10);
        let engine = Arc::new(FakeEngine::gated(gate.clone()));
        engine.answer(&bytes, one_region("x"));

        let mut controller = SessionController::new(engine.clone(), rt.handle().clone(), WAIT);
        controller.open_bytes(bytes, "a.png");
        controller.dispatch(Event::OcrRequested);
        controller.dispatch(Event::OcrRequested);
        controller.dispatch(Event::OcrRequested);

        gate.add_permits(1);
        assert!(controller.wait_for_completion(WAIT));
        assert!(!controller.wait_for_completion(Duration::from_millis(100)));
        assert_eq!(engine.calls(), 1);
    }

    #[test]
    fn test_stale_response_never_becomes_active() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let gate = Arc::new(Semaphore::new(0));
        let bytes_a = png_bytes(10, 10);
        let bytes_b = png_bytes(20, 20);
        let engine = Arc::new(FakeEngine::gated(gate.clone()));
        engine.answer(&bytes_a, one_region("from A"));
        engine.answer(&bytes_b, one_region("from B"));

        let mut controller = SessionController::new(engine, rt.handle().clone(), WAIT);
        controller.open_bytes(bytes_a, "a.png");
        controller.dispatch(Event::OcrRequested);

        // B selected while A is outstanding
        controller.open_bytes(bytes_b, "b.png");
        gate.add_permits(1);
        assert!(controller.wait_for_completion(WAIT));

        assert!(controller.state().result.is_none());
        assert_eq!(controller.state().phase(), Phase::ImageSelected);

        controller.dispatch(Event::OcrRequested);
        gate.add_permits(1);
        assert!(controller.wait_for_completion(WAIT));
        assert_eq!(
            controller.state().result.as_ref().map(|r| r.joined_text()),
            Some("from B".to_string())
        );
    }

    #[test]
    fn test_engine_failure_is_reported() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        // No answers registered: every call fails
        let engine = Arc::new(FakeEngine::new());

        let mut controller = SessionController::new(engine, rt.handle().clone(), WAIT);
        controller.open_bytes(png_bytes(8, 8), "a.png");
        controller.dispatch(Event::OcrRequested);
        assert!(controller.wait_for_completion(WAIT));

        let state = controller.state();
        assert_eq!(state.phase(), Phase::ImageSelected);
        assert!(state.can_run_ocr());
        assert_eq!(state.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Error));
    }

    #[test]
    fn test_hung_engine_times_out() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut controller =
            SessionController::new(Arc::new(HungEngine), rt.handle().clone(), Duration::from_millis(50));
        controller.open_bytes(png_bytes(8, 8), "a.png");
        controller.dispatch(Event::OcrRequested);

        assert!(controller.wait_for_completion(WAIT));
        let notice = controller.state().notice.clone().unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert!(notice.message.contains("timed out"));
        assert!(!controller.state().is_running());
    }

    #[test]
    fn test_empty_result_reports_no_text() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let bytes = png_bytes(10, 10);
        let engine = Arc::new(FakeEngine::new());
        engine.answer(&bytes, OcrResult::default());

        let mut controller = SessionController::new(engine, rt.handle().clone(), WAIT);
        controller.open_bytes(bytes, "blank.png");
        controller.dispatch(Event::OcrRequested);
        assert!(controller.wait_for_completion(WAIT));

        let notice = controller.state().notice.clone().unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert_eq!(notice.message, "No text detected");
    }

    #[test]
    fn test_open_bad_bytes_keeps_session() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let mut controller =
            SessionController::new(Arc::new(FakeEngine::new()), rt.handle().clone(), WAIT);
        controller.open_bytes(png_bytes(4, 4), "ok.png");
        controller.open_bytes(b"not an image".to_vec(), "bad.bin");

        let state = controller.state();
        assert_eq!(state.image.as_ref().map(|i| i.label.as_str()), Some("ok.png"));
        assert_eq!(state.notice.as_ref().map(|n| n.kind), Some(NoticeKind::Error));
    }

    #[test]
    fn test_repaint_hook_fires_on_completion() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let bytes = png_bytes(10, 10);
        let engine = Arc::new(FakeEngine::new());
        engine.answer(&bytes, one_region("x"));

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let mut controller = SessionController::new(engine, rt.handle().clone(), WAIT);
        controller.set_repaint_hook(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        controller.open_bytes(bytes, "a.png");
        controller.dispatch(Event::OcrRequested);
        assert!(controller.wait_for_completion(WAIT));
        // The hook runs right after the send; give the worker a moment
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_overlay_visibility_from_settings() {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let controller = SessionController::new(Arc::new(FakeEngine::new()), rt.handle().clone(), WAIT)
            .with_overlay_visible(false);
        assert!(!controller.state().overlay_visible);
        assert_eq!(controller.state().phase(), Phase::NoImage);
    }
}

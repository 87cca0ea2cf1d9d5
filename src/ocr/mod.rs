//! OCR Engine boundary
//!
//! Text detection and recognition happen in an external engine. This module
//! defines what goes in (encoded image bytes), what comes back (text regions
//! in original image pixel space) and how failures are reported.

pub mod http;

pub use http::HttpOcrEngine;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Polygon;

/// One recognized text instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRegion {
    /// Box in original image pixel coordinates
    pub polygon: Polygon,
    /// Recognized text
    pub text: String,
    /// Recognition confidence (0.0 - 1.0)
    pub score: f32,
}

/// Ordered output of one OCR invocation
///
/// Region order is detection order and doubles as the selection index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    pub regions: Vec<TextRegion>,
}

impl OcrResult {
    pub fn new(regions: Vec<TextRegion>) -> Self {
        Self { regions }
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn get(&self, index: usize) -> Option<&TextRegion> {
        self.regions.get(index)
    }

    /// All recognized text, one region per line
    pub fn joined_text(&self) -> String {
        self.regions
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// OCR engine failures
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("OCR server returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed OCR response: {0}")]
    MalformedResponse(String),

    #[error("OCR timed out after {0}s")]
    Timeout(u64),

    #[error("OCR engine failure: {0}")]
    Engine(String),
}

/// External text recognizer
///
/// Implementations receive the raw encoded bytes exactly as the image
/// source produced them and must report polygons in the original image's
/// pixel space.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<OcrResult, OcrError>;

    /// Short name for logs and the status bar
    fn name(&self) -> &str;
}

//! HTTP OCR engine
//!
//! Posts the encoded image to an OCR server and decodes its box list.
//! Request: `{"image_base64": "..."}`.
//! Response: `{"boxes": [{"box": [[x, y], ...], "text": "...", "score": 0.9}]}`.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{OcrEngine, OcrError, OcrResult, TextRegion};
use crate::geometry::{Point, Polygon};

#[derive(Serialize)]
struct ImageRequest {
    image_base64: String,
}

#[derive(Deserialize, Debug)]
struct TextBox {
    #[serde(rename = "box")]
    bbox: Vec<Vec<f64>>,
    text: String,
    score: f64,
}

#[derive(Deserialize, Debug)]
struct OcrResponse {
    boxes: Vec<TextBox>,
}

/// OCR engine backed by a remote server
#[derive(Clone)]
pub struct HttpOcrEngine {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOcrEngine {
    /// Create a client for `endpoint` (full URL of the recognize route)
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OcrEngine for HttpOcrEngine {
    async fn recognize(&self, image: &[u8]) -> Result<OcrResult, OcrError> {
        debug!("POST {} ({} bytes)", self.endpoint, image.len());

        let request = ImageRequest {
            image_base64: general_purpose::STANDARD.encode(image),
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).into_owned();
            warn!("OCR server returned {}: {}", status, body);
            return Err(OcrError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Decode the server's JSON into an [`OcrResult`]
///
/// Boxes with malformed corner entries are rejected as a whole; a score
/// outside [0, 1] is clamped.
pub fn parse_response(body: &[u8]) -> Result<OcrResult, OcrError> {
    let response: OcrResponse = serde_json::from_slice(body)
        .map_err(|e| OcrError::MalformedResponse(e.to_string()))?;

    let mut regions = Vec::with_capacity(response.boxes.len());
    for (idx, text_box) in response.boxes.into_iter().enumerate() {
        let mut points = Vec::with_capacity(text_box.bbox.len());
        for corner in &text_box.bbox {
            match corner.as_slice() {
                [x, y] => points.push(Point::new(*x as f32, *y as f32)),
                other => {
                    return Err(OcrError::MalformedResponse(format!(
                        "box {} has a corner with {} coordinates",
                        idx,
                        other.len()
                    )))
                }
            }
        }

        regions.push(TextRegion {
            polygon: Polygon::new(points),
            text: text_box.text,
            score: (text_box.score as f32).clamp(0.0, 1.0),
        });
    }

    debug!("OCR response decoded: {} regions", regions.len());
    Ok(OcrResult::new(regions))
}

//! Application Configuration
//!
//! User settings and preferences stored in TOML format.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::geometry::FitMode;

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General settings
    pub general: GeneralConfig,
    /// OCR engine settings
    pub ocr: OcrSettings,
    /// Overlay settings
    pub overlay: OverlaySettings,
    /// Window settings
    pub window: WindowSettings,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log filter used when RUST_LOG is not set
    pub log_level: String,
    /// Directory pre-filled in the path field
    pub last_directory: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            last_directory: None,
        }
    }
}

/// OCR engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// URL of the OCR server's recognize route
    pub endpoint: String,
    /// Upper bound for one OCR request
    pub timeout_secs: u64,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:39835/ocr".to_string(),
            timeout_secs: 30,
        }
    }
}

impl OcrSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Overlay-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Draw boxes as soon as a result arrives
    pub visible_by_default: bool,
    /// How the image is fitted into the viewer
    pub fit_mode: FitMode,
    /// Scores above this are drawn as high confidence
    pub high_confidence: f32,
    /// Scores above this (and not high) are drawn as medium confidence
    pub medium_confidence: f32,
    /// Labels longer than this are cut and end with an ellipsis
    pub label_max_chars: usize,
    /// Gap between a box's top vertex and its label, in pixels
    pub label_margin: f32,
    /// Box stroke width
    pub stroke_width: f32,
    /// Box stroke width for the selected region
    pub selected_stroke_width: f32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            visible_by_default: true,
            fit_mode: FitMode::Contain,
            high_confidence: 0.8,
            medium_confidence: 0.5,
            label_max_chars: 30,
            label_margin: 4.0,
            stroke_width: 2.0,
            selected_stroke_width: 4.0,
        }
    }
}

/// Main window settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1100.0,
            height: 800.0,
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {:?}", path))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config {:?}", path))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config {:?}", path))?;
    Ok(())
}

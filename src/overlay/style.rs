//! Box colors and stroke widths for the overlay

use crate::config::OverlaySettings;

/// RGBA, unmultiplied
pub type Rgba = [u8; 4];

/// Stroke style for one kind of box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStyle {
    pub color: Rgba,
    pub stroke_width: f32,
}

/// Confidence bucket of a recognized region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceTier::High => "High",
            ConfidenceTier::Medium => "Medium",
            ConfidenceTier::Low => "Low",
        }
    }
}

/// Full overlay styling
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    pub selected: BoxStyle,
    pub high: BoxStyle,
    pub medium: BoxStyle,
    pub low: BoxStyle,
    pub label_color: Rgba,
    pub label_background: Rgba,
    pub label_font_size: f32,
    pub high_threshold: f32,
    pub medium_threshold: f32,
    pub label_max_chars: usize,
    pub label_margin: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from_settings(&OverlaySettings::default())
    }
}

impl OverlayStyle {
    pub fn from_settings(settings: &OverlaySettings) -> Self {
        let width = settings.stroke_width;
        Self {
            selected: BoxStyle {
                color: [255, 64, 129, 255],
                stroke_width: settings.selected_stroke_width,
            },
            high: BoxStyle {
                color: [46, 204, 113, 255],
                stroke_width: width,
            },
            medium: BoxStyle {
                color: [255, 193, 7, 255],
                stroke_width: width,
            },
            low: BoxStyle {
                color: [231, 76, 60, 140],
                stroke_width: width,
            },
            label_color: [255, 255, 255, 255],
            label_background: [0, 0, 0, 170],
            label_font_size: 12.0,
            high_threshold: settings.high_confidence,
            medium_threshold: settings.medium_confidence,
            label_max_chars: settings.label_max_chars,
            label_margin: settings.label_margin,
        }
    }

    /// Bucket a score; thresholds are exclusive
    pub fn tier(&self, score: f32) -> ConfidenceTier {
        if score > self.high_threshold {
            ConfidenceTier::High
        } else if score > self.medium_threshold {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    /// Style for a region; selection overrides confidence
    pub fn box_style(&self, score: f32, is_selected: bool) -> BoxStyle {
        if is_selected {
            return self.selected;
        }
        match self.tier(score) {
            ConfidenceTier::High => self.high,
            ConfidenceTier::Medium => self.medium,
            ConfidenceTier::Low => self.low,
        }
    }
}

//! Caption Data Models
//!
//! Defines caption styling and the named style registry.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::{CoreError, CoreResult};

// =============================================================================
// Color
// =============================================================================

/// RGBA color value (0-255 for each component)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Creates a new color from RGBA components
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color from RGB components
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// White color
    pub fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Black color
    pub fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// Yellow color (common for subtitles)
    pub fn yellow() -> Self {
        Self::rgb(255, 255, 0)
    }

    /// Converts to the `0xRRGGBB@A` form FFmpeg drawtext accepts
    pub fn to_drawtext(&self) -> String {
        format!(
            "0x{:02X}{:02X}{:02X}@{:.2}",
            self.r,
            self.g,
            self.b,
            self.a as f32 / 255.0
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::white()
    }
}

// =============================================================================
// Positioning
// =============================================================================

/// Vertical position of a caption on screen.
///
/// Deserializes from any string; unrecognized values fall back to `Bottom`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum VerticalPosition {
    /// Bottom of screen (default for subtitles)
    #[default]
    Bottom,
    /// Top of screen
    Top,
    /// Center of screen
    Center,
}

impl From<String> for VerticalPosition {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "bottom" => Self::Bottom,
            "top" => Self::Top,
            "center" => Self::Center,
            other => {
                warn!("Unknown caption position '{}', falling back to bottom", other);
                Self::Bottom
            }
        }
    }
}

// =============================================================================
// Caption Mode
// =============================================================================

/// Overlay granularity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptionMode {
    /// One overlay per segment
    Sentence,
    /// One overlay per word, equal sub-intervals within the segment
    #[default]
    Word,
}

impl CaptionMode {
    /// Parses a mode name, falling back to word mode.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "sentence" => Self::Sentence,
            "word" => Self::Word,
            other => {
                warn!("Unknown caption mode '{}', falling back to word", other);
                Self::Word
            }
        }
    }
}

// =============================================================================
// Caption Style
// =============================================================================

/// Caption text style
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionStyle {
    /// Font family name
    #[serde(default = "default_font")]
    pub font: String,
    /// Font size in points
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Text color
    #[serde(default)]
    pub color: Color,
    /// Outline/stroke color
    #[serde(default = "Color::black")]
    pub stroke_color: Color,
    /// Outline width in pixels
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,
    /// Vertical screen position
    #[serde(default)]
    pub position: VerticalPosition,
    /// Offset in pixels from the positioned edge
    #[serde(default = "default_vertical_offset")]
    pub vertical_offset: u32,
}

fn default_font() -> String {
    "Arial".to_string()
}

fn default_font_size() -> u32 {
    64
}

fn default_stroke_width() -> u32 {
    2
}

fn default_vertical_offset() -> u32 {
    300
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font: default_font(),
            font_size: default_font_size(),
            color: Color::white(),
            stroke_color: Color::black(),
            stroke_width: default_stroke_width(),
            position: VerticalPosition::Bottom,
            vertical_offset: default_vertical_offset(),
        }
    }
}

impl CaptionStyle {
    /// Loud comic style with a thick outline
    pub fn comic() -> Self {
        Self {
            font: "Comic Sans MS".to_string(),
            font_size: 80,
            color: Color::yellow(),
            stroke_width: 4,
            ..Default::default()
        }
    }

    /// Plain white text, no outline
    pub fn minimal() -> Self {
        Self {
            stroke_width: 0,
            ..Default::default()
        }
    }

    /// Large centered text for hook lines
    pub fn headline() -> Self {
        Self {
            font_size: 96,
            position: VerticalPosition::Center,
            stroke_width: 3,
            ..Default::default()
        }
    }
}

// =============================================================================
// Style Registry
// =============================================================================

/// Named caption styles: builtins plus an optional JSON overlay file.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: HashMap<String, CaptionStyle>,
}

impl StyleRegistry {
    /// Registry with the builtin styles only
    pub fn builtin() -> Self {
        let mut styles = HashMap::new();
        styles.insert("default".to_string(), CaptionStyle::default());
        styles.insert("comic".to_string(), CaptionStyle::comic());
        styles.insert("minimal".to_string(), CaptionStyle::minimal());
        styles.insert("headline".to_string(), CaptionStyle::headline());
        Self { styles }
    }

    /// Layers styles from a JSON file (`{"name": {style...}, ...}`) over the
    /// builtins. File entries win on name collisions.
    pub fn with_overlay_file(path: &Path) -> CoreResult<Self> {
        let mut registry = Self::builtin();
        let raw = fs::read_to_string(path)?;
        let extra: HashMap<String, CaptionStyle> = serde_json::from_str(&raw)?;
        info!(
            "Loaded {} caption style(s) from {}",
            extra.len(),
            path.display()
        );
        registry.styles.extend(extra);
        Ok(registry)
    }

    /// Looks up a style by name.
    pub fn get(&self, name: &str) -> CoreResult<&CaptionStyle> {
        self.styles
            .get(name)
            .ok_or_else(|| CoreError::StyleNotFound(name.to_string()))
    }

    /// Registered style names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.styles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Caption Overlay Renderer
//!
//! Turns timed segments into positioned text overlays. In sentence mode each
//! segment becomes one overlay; in word mode the segment interval is divided
//! into equal per-word sub-intervals. Overlays are pure timing/text values;
//! the render module compiles them into drawtext filters.

use serde::{Deserialize, Serialize};

use super::{CaptionMode, CaptionStyle, VerticalPosition};
use crate::core::timing::Segment;
use crate::core::TimeSec;

/// A rendered text overlay scheduled on the timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayClip {
    /// Unique identifier
    pub id: String,
    /// Text to display (word mode keeps a trailing space on non-final words)
    pub text: String,
    /// Start offset within the timeline, seconds
    pub start_sec: TimeSec,
    /// Display duration, seconds
    pub duration_sec: TimeSec,
}

impl OverlayClip {
    fn new(text: impl Into<String>, start_sec: TimeSec, duration_sec: TimeSec) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            text: text.into(),
            start_sec,
            duration_sec,
        }
    }

    /// End offset within the timeline, seconds
    pub fn end_sec(&self) -> TimeSec {
        self.start_sec + self.duration_sec
    }
}

/// Produces the ordered overlay sequence for the given segments.
pub fn render_overlays(segments: &[Segment], mode: CaptionMode) -> Vec<OverlayClip> {
    let mut overlays = Vec::new();

    for segment in segments {
        let text = segment.text.trim();
        if text.is_empty() {
            continue;
        }

        match mode {
            CaptionMode::Sentence => {
                overlays.push(OverlayClip::new(text, segment.start, segment.duration()));
            }
            CaptionMode::Word => {
                let words: Vec<&str> = text.split_whitespace().collect();
                if words.is_empty() {
                    // Whitespace-free split produced nothing usable; show the
                    // original text over the whole segment instead.
                    overlays.push(OverlayClip::new(text, segment.start, segment.duration()));
                    continue;
                }

                let word_duration = segment.duration() / words.len() as f64;
                for (i, word) in words.iter().enumerate() {
                    // Trailing space preserves natural word spacing on screen,
                    // except after the final word of the segment.
                    let display = if i + 1 < words.len() {
                        format!("{} ", word)
                    } else {
                        (*word).to_string()
                    };
                    overlays.push(OverlayClip::new(
                        display,
                        segment.start + i as f64 * word_duration,
                        word_duration,
                    ));
                }
            }
        }
    }

    overlays
}

/// Computes the drawtext x/y position expressions for a style.
///
/// X is always horizontally centered; Y follows the style's vertical
/// position and offset.
pub fn position_expressions(style: &CaptionStyle, frame_height: u32) -> (String, String) {
    let x = "(w-text_w)/2".to_string();
    let y = match style.position {
        VerticalPosition::Bottom => {
            format!("{}", frame_height.saturating_sub(style.vertical_offset))
        }
        VerticalPosition::Top => format!("{}", style.vertical_offset),
        VerticalPosition::Center => "(h-text_h)/2".to_string(),
    };
    (x, y)
}

// =============================================================================
// Tests
// =============================================================================

//! Timeline Model Definitions
//!
//! Defines the image clip and timeline types the assembler produces and the
//! exporter consumes.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::captions::OverlayClip;
use crate::core::TimeSec;

/// A still image placed on the base track for a fixed duration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageClip {
    /// Unique identifier
    pub id: String,
    /// 1-based segment index this clip was built from
    pub index: usize,
    /// Source image path
    pub source: PathBuf,
    /// Display duration, seconds
    pub duration_sec: TimeSec,
    /// Zoom direction for the animation variant
    pub zoom_in: bool,
}

impl ImageClip {
    pub fn new(index: usize, source: PathBuf, duration_sec: TimeSec, zoom_in: bool) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            index,
            source,
            duration_sec,
            zoom_in,
        }
    }
}

/// The ordered composition of visual clips, text overlays, and one bound
/// audio track.
///
/// Base-track clips are concatenated back to back with no gaps or overlaps.
/// The audio track is bound whole and is never trimmed to the video length;
/// when clips were skipped the visual track simply ends early.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    /// Base track clips in segment order
    pub clips: Vec<ImageClip>,
    /// Text overlays, each clamped within the base track span
    pub overlays: Vec<OverlayClip>,
    /// Voiceover audio file bound to the timeline
    pub audio_path: PathBuf,
}

impl Timeline {
    pub fn new(clips: Vec<ImageClip>, audio_path: PathBuf) -> Self {
        Self {
            clips,
            overlays: Vec::new(),
            audio_path,
        }
    }

    /// Total duration of the base track in seconds.
    pub fn base_duration(&self) -> TimeSec {
        self.clips.iter().map(|c| c.duration_sec).sum()
    }

    /// Attaches overlays, clamping any that would run past the end of the
    /// base track.
    pub fn attach_overlays(&mut self, overlays: Vec<OverlayClip>) {
        let limit = self.base_duration();
        self.overlays = overlays
            .into_iter()
            .filter_map(|mut overlay| {
                if overlay.start_sec >= limit {
                    warn!(
                        "Dropping overlay '{}' starting at {:.2}s, past base track end {:.2}s",
                        overlay.text.trim(),
                        overlay.start_sec,
                        limit
                    );
                    return None;
                }
                if overlay.end_sec() > limit {
                    warn!(
                        "Clamping overlay '{}' to base track end {:.2}s",
                        overlay.text.trim(),
                        limit
                    );
                    overlay.duration_sec = limit - overlay.start_sec;
                }
                Some(overlay)
            })
            .collect();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::captions::{render_overlays, CaptionMode};
    use crate::core::timing::Segment;

    fn clip(index: usize, duration: f64) -> ImageClip {
        ImageClip::new(index, PathBuf::from(format!("image_{index}.jpg")), duration, true)
    }

    #[test]
    fn test_base_duration_sums_clips() {
        let timeline = Timeline::new(vec![clip(1, 2.0), clip(2, 3.5)], PathBuf::from("vo.mp3"));
        assert_eq!(timeline.base_duration(), 5.5);
    }

    #[test]
    fn test_attach_overlays_keeps_in_range() {
        let mut timeline = Timeline::new(vec![clip(1, 4.0)], PathBuf::from("vo.mp3"));
        let segments = vec![Segment::new(0.0, 4.0, "inside")];
        timeline.attach_overlays(render_overlays(&segments, CaptionMode::Sentence));

        assert_eq!(timeline.overlays.len(), 1);
        assert_eq!(timeline.overlays[0].duration_sec, 4.0);
    }

    #[test]
    fn test_attach_overlays_clamps_overrun() {
        // Base track is shorter than the segment span (a clip was skipped).
        let mut timeline = Timeline::new(vec![clip(1, 3.0)], PathBuf::from("vo.mp3"));
        let segments = vec![
            Segment::new(0.0, 2.0, "kept"),
            Segment::new(2.0, 5.0, "clamped"),
            Segment::new(5.0, 6.0, "dropped"),
        ];
        timeline.attach_overlays(render_overlays(&segments, CaptionMode::Sentence));

        assert_eq!(timeline.overlays.len(), 2);
        assert_eq!(timeline.overlays[0].duration_sec, 2.0);
        assert!((timeline.overlays[1].end_sec() - 3.0).abs() < 1e-9);
    }
}

//! Segment Timing
//!
//! Converts script lines into timed segments matching a known audio duration,
//! and persists them as the timestamps hand-off artifact.

mod estimator;
mod store;

pub use estimator::{
    ProportionalEstimator, TimingSource, DURATION_TOLERANCE_SEC, MIN_SEGMENT_SEC, WORDS_PER_SECOND,
};
pub use store::{load_or_estimate, load_segments, save_segments};

use serde::{Deserialize, Serialize};

use super::TimeSec;

/// A contiguous time-bounded unit of script text.
///
/// Segments are created once by a [`TimingSource`], persisted as a JSON
/// array, and consumed read-only downstream; they are never mutated after
/// creation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start time in seconds
    pub start: TimeSec,
    /// End time in seconds (>= start)
    pub end: TimeSec,
    /// Script text covered by this segment
    pub text: String,
}

impl Segment {
    pub fn new(start: TimeSec, end: TimeSec, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Returns the duration of this segment in seconds
    pub fn duration(&self) -> TimeSec {
        self.end - self.start
    }
}

/// Total duration spanned by an ordered segment sequence.
pub fn total_duration(segments: &[Segment]) -> TimeSec {
    segments.last().map(|s| s.end).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_duration() {
        let seg = Segment::new(1.5, 4.0, "hello");
        assert_eq!(seg.duration(), 2.5);
    }

    #[test]
    fn test_total_duration() {
        let segments = vec![
            Segment::new(0.0, 2.0, "a"),
            Segment::new(2.0, 5.5, "b"),
        ];
        assert_eq!(total_duration(&segments), 5.5);
        assert_eq!(total_duration(&[]), 0.0);
    }

    #[test]
    fn test_segment_serialization_uses_plain_keys() {
        let seg = Segment::new(0.0, 1.0, "hi");
        let json = serde_json::to_string(&seg).unwrap();
        assert!(json.contains("\"start\""));
        assert!(json.contains("\"end\""));
        assert!(json.contains("\"text\""));
    }
}

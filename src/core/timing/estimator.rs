//! Proportional Segment Timing Estimator
//!
//! Allocates per-line durations proportional to word count at a fixed
//! speaking rate, rescaled so the total matches the measured audio duration.
//!
//! The estimator is the canonical timing strategy. A speech-recognition
//! aligner can replace it behind the same [`TimingSource`] contract without
//! touching downstream consumers.

use tracing::debug;

use super::Segment;
use crate::core::{CoreError, CoreResult, TimeSec};

/// Assumed speaking rate used for the initial proportional allocation
pub const WORDS_PER_SECOND: f64 = 2.5;

/// Minimum duration any segment may have
pub const MIN_SEGMENT_SEC: f64 = 0.5;

/// Allowed deviation between the segment sum and the target duration
pub const DURATION_TOLERANCE_SEC: f64 = 0.05;

/// A source of timed segments for a list of script lines.
pub trait TimingSource {
    /// Produces an ordered, contiguous segment sequence whose total duration
    /// matches `total_duration` within [`DURATION_TOLERANCE_SEC`] (except
    /// when the minimum-duration floor forces an overrun).
    fn estimate(&self, lines: &[String], total_duration: TimeSec) -> CoreResult<Vec<Segment>>;
}

/// Word-count-proportional estimator with a minimum-duration floor.
#[derive(Clone, Copy, Debug)]
pub struct ProportionalEstimator {
    words_per_second: f64,
    min_segment_sec: f64,
}

impl Default for ProportionalEstimator {
    fn default() -> Self {
        Self {
            words_per_second: WORDS_PER_SECOND,
            min_segment_sec: MIN_SEGMENT_SEC,
        }
    }
}

impl ProportionalEstimator {
    pub fn new(words_per_second: f64, min_segment_sec: f64) -> Self {
        Self {
            words_per_second,
            min_segment_sec,
        }
    }

    /// Distributes `total` seconds over the raw weights, clamping any share
    /// below the floor and redistributing the remainder proportionally over
    /// the unclamped segments. Iterates until no new segment falls below the
    /// floor, so the floor property holds for every output duration.
    fn allocate(&self, weights: &[f64], total: TimeSec) -> Vec<TimeSec> {
        let n = weights.len();
        let mut clamped = vec![false; n];

        loop {
            let clamped_count = clamped.iter().filter(|c| **c).count();
            if clamped_count == n {
                break;
            }

            let free_budget = total - self.min_segment_sec * clamped_count as f64;
            let free_weight: f64 = weights
                .iter()
                .zip(&clamped)
                .filter(|(_, c)| !**c)
                .map(|(w, _)| *w)
                .sum();

            if free_budget <= 0.0 || free_weight <= 0.0 {
                // Nothing left to share out; everything ends up at the floor.
                clamped.iter_mut().for_each(|c| *c = true);
                break;
            }

            let mut newly_clamped = false;
            for (i, weight) in weights.iter().enumerate() {
                if clamped[i] {
                    continue;
                }
                let share = weight / free_weight * free_budget;
                if share < self.min_segment_sec {
                    clamped[i] = true;
                    newly_clamped = true;
                }
            }

            if !newly_clamped {
                let mut durations = vec![self.min_segment_sec; n];
                for (i, weight) in weights.iter().enumerate() {
                    if !clamped[i] {
                        durations[i] = weight / free_weight * free_budget;
                    }
                }
                return durations;
            }
        }

        vec![self.min_segment_sec; n]
    }
}

impl TimingSource for ProportionalEstimator {
    fn estimate(&self, lines: &[String], total_duration: TimeSec) -> CoreResult<Vec<Segment>> {
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(CoreError::InvalidDuration(total_duration));
        }

        let lines: Vec<&str> = lines
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();

        if lines.is_empty() {
            return Ok(Vec::new());
        }

        // A punctuation-only line still needs screen time; give it one word
        // of weight so the allocation stays strictly positive.
        let weights: Vec<f64> = lines
            .iter()
            .map(|line| line.split_whitespace().count().max(1) as f64 / self.words_per_second)
            .collect();

        let durations = self.allocate(&weights, total_duration);

        let mut segments = Vec::with_capacity(lines.len());
        let mut cursor = 0.0;
        for (line, duration) in lines.iter().zip(durations) {
            let start = cursor;
            cursor += duration;
            segments.push(Segment::new(start, cursor, *line));
        }

        debug!(
            segments = segments.len(),
            target = total_duration,
            actual = cursor,
            "estimated segment timing"
        );

        Ok(segments)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    fn assert_contiguous(segments: &[Segment]) {
        for pair in segments.windows(2) {
            assert!(
                (pair[1].start - pair[0].end).abs() < 1e-9,
                "segments not contiguous: {:?}",
                pair
            );
        }
        if let Some(first) = segments.first() {
            assert_eq!(first.start, 0.0);
        }
    }

    #[test]
    fn test_sum_matches_total_within_tolerance() {
        let estimator = ProportionalEstimator::default();
        let input = lines(&[
            "The quick brown fox jumps over the lazy dog",
            "A much shorter line",
            "And one final line to close things out properly",
        ]);
        let segments = estimator.estimate(&input, 42.0).unwrap();

        let sum: f64 = segments.iter().map(Segment::duration).sum();
        assert!((sum - 42.0).abs() <= DURATION_TOLERANCE_SEC);
        assert_contiguous(&segments);
    }

    #[test]
    fn test_duration_proportional_to_word_count() {
        let estimator = ProportionalEstimator::default();
        let input = lines(&["one two three four five six seven eight", "one two"]);
        let segments = estimator.estimate(&input, 10.0).unwrap();

        assert_eq!(segments.len(), 2);
        // 8 words vs 2 words: 8.0s vs 2.0s
        assert!((segments[0].duration() - 8.0).abs() < 1e-9);
        assert!((segments[1].duration() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_floor_enforced_and_redistributed() {
        let estimator = ProportionalEstimator::default();
        // 40 words vs 1 word over 10s: the raw share for the short line is
        // 10 * 1/41 ≈ 0.24s, below the floor.
        let long: String = vec!["word"; 40].join(" ");
        let input = vec![long, "hi".to_string()];
        let segments = estimator.estimate(&input, 10.0).unwrap();

        assert!((segments[1].duration() - MIN_SEGMENT_SEC).abs() < 1e-9);
        assert!((segments[0].duration() - 9.5).abs() < 1e-9);

        let sum: f64 = segments.iter().map(Segment::duration).sum();
        assert!((sum - 10.0).abs() <= DURATION_TOLERANCE_SEC);
        assert_contiguous(&segments);
    }

    #[test]
    fn test_all_segments_respect_floor() {
        let estimator = ProportionalEstimator::default();
        let input = lines(&["a", "b b", "c c c", "d d d d", "e"]);
        let segments = estimator.estimate(&input, 3.0).unwrap();

        for seg in &segments {
            assert!(
                seg.duration() >= MIN_SEGMENT_SEC - 1e-9,
                "segment below floor: {:?}",
                seg
            );
        }
        assert_contiguous(&segments);
    }

    #[test]
    fn test_floor_wins_when_total_is_too_small() {
        let estimator = ProportionalEstimator::default();
        let input = lines(&["one", "two", "three", "four"]);
        // 4 segments need at least 2.0s; the target is smaller.
        let segments = estimator.estimate(&input, 1.0).unwrap();

        assert_eq!(segments.len(), 4);
        for seg in &segments {
            assert!((seg.duration() - MIN_SEGMENT_SEC).abs() < 1e-9);
        }
        assert_contiguous(&segments);
    }

    #[test]
    fn test_single_line_spans_whole_duration() {
        let estimator = ProportionalEstimator::default();
        let segments = estimator
            .estimate(&lines(&["only one line here"]), 12.5)
            .unwrap();

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start, 0.0);
        assert!((segments[0].end - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_lines_produce_empty_sequence() {
        let estimator = ProportionalEstimator::default();
        assert!(estimator.estimate(&[], 10.0).unwrap().is_empty());
        assert!(estimator
            .estimate(&lines(&["  ", "\t"]), 10.0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let estimator = ProportionalEstimator::default();
        let input = lines(&["hello"]);

        assert!(matches!(
            estimator.estimate(&input, 0.0),
            Err(CoreError::InvalidDuration(_))
        ));
        assert!(matches!(
            estimator.estimate(&input, -3.0),
            Err(CoreError::InvalidDuration(_))
        ));
        assert!(matches!(
            estimator.estimate(&input, f64::NAN),
            Err(CoreError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_deterministic() {
        let estimator = ProportionalEstimator::default();
        let input = lines(&["alpha beta gamma", "delta", "epsilon zeta eta theta iota"]);

        let a = estimator.estimate(&input, 33.3).unwrap();
        let b = estimator.estimate(&input, 33.3).unwrap();
        assert_eq!(a, b);
    }
}

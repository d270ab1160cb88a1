//! Timestamps Persistence
//!
//! The timestamps file is the hand-off artifact between the estimator and the
//! caption/timeline consumers: a JSON array of `{start, end, text}` objects
//! in chronological order. An existing file short-circuits re-estimation so a
//! partially completed pipeline can resume.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::info;

use super::{Segment, TimingSource};
use crate::core::{CoreResult, TimeSec};

/// Loads segments from a timestamps file.
pub fn load_segments(path: &Path) -> CoreResult<Vec<Segment>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Writes segments atomically (temp file + rename).
pub fn save_segments(path: &Path, segments: &[Segment]) -> CoreResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(serde_json::to_string_pretty(segments)?.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Returns the persisted segments when the timestamps file already exists,
/// otherwise estimates, persists, and returns fresh ones.
///
/// The existing file is returned unchanged and is never overwritten; stale
/// timestamps are regenerated wholesale by deleting the file first.
pub fn load_or_estimate(
    path: &Path,
    source: &dyn TimingSource,
    lines: &[String],
    total_duration: TimeSec,
) -> CoreResult<Vec<Segment>> {
    if path.exists() {
        info!("Using existing timestamps from {}", path.display());
        return load_segments(path);
    }

    let segments = source.estimate(lines, total_duration)?;
    save_segments(path, &segments)?;
    info!(
        "Saved {} segment timestamps to {}",
        segments.len(),
        path.display()
    );
    Ok(segments)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timing::ProportionalEstimator;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timestamps.json");

        let segments = vec![
            Segment::new(0.0, 2.5, "first"),
            Segment::new(2.5, 6.0, "second"),
        ];
        save_segments(&path, &segments).unwrap();

        let loaded = load_segments(&path).unwrap();
        assert_eq!(loaded, segments);
    }

    #[test]
    fn test_existing_file_short_circuits_estimation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timestamps.json");

        let existing = vec![Segment::new(0.0, 9.0, "persisted earlier")];
        save_segments(&path, &existing).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        // Lines and duration that would produce something entirely different.
        let estimator = ProportionalEstimator::default();
        let lines = vec!["a new line".to_string(), "another".to_string()];
        let result = load_or_estimate(&path, &estimator, &lines, 30.0).unwrap();

        assert_eq!(result, existing);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_missing_file_estimates_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timestamps.json");

        let estimator = ProportionalEstimator::default();
        let lines = vec!["hello world".to_string()];
        let segments = load_or_estimate(&path, &estimator, &lines, 5.0).unwrap();

        assert_eq!(segments.len(), 1);
        assert!(path.exists());
        assert_eq!(load_segments(&path).unwrap(), segments);
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timestamps.json");

        save_segments(&path, &[Segment::new(0.0, 1.0, "x")]).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
    }
}

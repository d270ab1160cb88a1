//! Audio Utilities
//!
//! Duration probing and background-music discovery. WAV files are read
//! natively through their headers; everything else goes through ffprobe.

mod mixer;

pub use mixer::{build_bgm_args, plan_mix, MixPlan};

use std::path::{Path, PathBuf};

use crate::core::ffmpeg::FFmpegRunner;
use crate::core::{CoreError, CoreResult, TimeSec};

/// Audio file extensions considered BGM candidates
const BGM_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "flac"];

/// Reads the duration of a WAV file from its header.
pub fn wav_duration(path: &Path) -> CoreResult<TimeSec> {
    let reader = hound::WavReader::open(path)
        .map_err(|e| CoreError::ProbeFailed(format!("{}: {e}", path.display())))?;
    let spec = reader.spec();
    Ok(reader.duration() as f64 / spec.sample_rate as f64)
}

/// Returns a media file's duration in seconds.
///
/// WAV is handled natively; other containers are probed with ffprobe.
pub async fn media_duration(runner: &FFmpegRunner, path: &Path) -> CoreResult<TimeSec> {
    if !path.exists() {
        return Err(CoreError::FileNotFound(path.display().to_string()));
    }

    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));

    if is_wav {
        return wav_duration(path);
    }
    Ok(runner.probe(path).await?.duration_sec)
}

/// Lists candidate BGM files in a directory, sorted by name.
pub fn available_bgm_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| BGM_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
        })
        .collect();
    files.sort();
    files
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_wav(path: &Path, seconds: f64, sample_rate: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let samples = (seconds * sample_rate as f64) as usize;
        for _ in 0..samples {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_wav_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 2.5, 16_000);

        let duration = wav_duration(&path).unwrap();
        assert!((duration - 2.5).abs() < 0.01);
    }

    #[test]
    fn test_wav_duration_rejects_non_wav_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.wav");
        fs::write(&path, b"not a wav file").unwrap();

        assert!(matches!(
            wav_duration(&path),
            Err(CoreError::ProbeFailed(_))
        ));
    }

    #[test]
    fn test_available_bgm_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.mp3"), b"x").unwrap();
        fs::write(dir.path().join("a.WAV"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let files = available_bgm_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.WAV"));
        assert!(files[1].ends_with("b.mp3"));
    }

    #[test]
    fn test_available_bgm_files_missing_dir() {
        assert!(available_bgm_files(Path::new("/no/such/dir")).is_empty());
    }
}

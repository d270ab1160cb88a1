//! FFmpeg Integration
//!
//! Locates the `ffmpeg`/`ffprobe` binaries, runs encoder invocations, and
//! probes media files. The engine builds argument vectors and filter graphs;
//! all encoding and decoding stays in the external binaries.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Deserialize;
use tracing::{debug, error, info};

use super::{CoreError, CoreResult};

// =============================================================================
// Detection
// =============================================================================

/// Resolved FFmpeg installation
#[derive(Debug, Clone)]
pub struct FFmpegInfo {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
}

impl FFmpegInfo {
    /// Uses explicit binary paths (config override).
    pub fn at(ffmpeg_path: PathBuf, ffprobe_path: PathBuf) -> CoreResult<Self> {
        if !ffmpeg_path.exists() || !ffprobe_path.exists() {
            return Err(CoreError::FFmpegNotFound);
        }
        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
        })
    }

    /// Finds `ffmpeg` and `ffprobe` on PATH.
    pub fn detect() -> CoreResult<Self> {
        let ffmpeg_path = find_on_path("ffmpeg").ok_or(CoreError::FFmpegNotFound)?;
        let ffprobe_path = find_on_path("ffprobe").ok_or(CoreError::FFmpegNotFound)?;
        info!("Using FFmpeg at {}", ffmpeg_path.display());
        Ok(Self {
            ffmpeg_path,
            ffprobe_path,
        })
    }
}

fn find_on_path(binary: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&paths) {
        let candidate = dir.join(binary);
        if candidate.is_file() {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let candidate = dir.join(format!("{binary}.exe"));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

// =============================================================================
// Probe Output
// =============================================================================

/// Media information extracted by ffprobe
#[derive(Debug, Clone)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration_sec: f64,
    /// Video stream info (if present)
    pub video: Option<VideoStreamInfo>,
    /// Whether an audio stream is present
    pub has_audio: bool,
}

/// Video stream information
#[derive(Debug, Clone)]
pub struct VideoStreamInfo {
    pub width: u32,
    pub height: u32,
}

#[derive(Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

fn parse_probe_output(raw: &str) -> CoreResult<MediaInfo> {
    let parsed: ProbeOutput =
        serde_json::from_str(raw).map_err(|e| CoreError::ProbeFailed(e.to_string()))?;

    let duration_sec = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .and_then(|s| {
            Some(VideoStreamInfo {
                width: s.width?,
                height: s.height?,
            })
        });

    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(MediaInfo {
        duration_sec,
        video,
        has_audio,
    })
}

// =============================================================================
// Runner
// =============================================================================

/// Executes FFmpeg commands for rendering and probing.
#[derive(Debug, Clone)]
pub struct FFmpegRunner {
    info: FFmpegInfo,
}

impl FFmpegRunner {
    pub fn new(info: FFmpegInfo) -> Self {
        Self { info }
    }

    pub fn info(&self) -> &FFmpegInfo {
        &self.info
    }

    /// Runs ffmpeg with the given arguments, surfacing stderr on failure.
    pub async fn run(&self, args: &[String]) -> CoreResult<()> {
        debug!("ffmpeg {}", args.join(" "));

        let output = tokio::process::Command::new(&self.info.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("ffmpeg failed: {}", stderr);
            return Err(CoreError::FFmpegFailed(
                stderr.lines().last().unwrap_or("unknown error").to_string(),
            ));
        }
        Ok(())
    }

    /// Probes a media file for duration, video dimensions, and audio
    /// presence.
    pub async fn probe(&self, input: &Path) -> CoreResult<MediaInfo> {
        if !input.exists() {
            return Err(CoreError::FileNotFound(input.display().to_string()));
        }

        let output = tokio::process::Command::new(&self.info.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(input)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::ProbeFailed(stderr.trim().to_string()));
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_output_full() {
        let raw = r#"{
            "format": { "duration": "52.416000" },
            "streams": [
                { "codec_type": "video", "width": 1080, "height": 1920 },
                { "codec_type": "audio" }
            ]
        }"#;
        let info = parse_probe_output(raw).unwrap();

        assert!((info.duration_sec - 52.416).abs() < 1e-9);
        let video = info.video.unwrap();
        assert_eq!(video.width, 1080);
        assert_eq!(video.height, 1920);
        assert!(info.has_audio);
    }

    #[test]
    fn test_parse_probe_output_audio_only() {
        let raw = r#"{
            "format": { "duration": "10.0" },
            "streams": [ { "codec_type": "audio" } ]
        }"#;
        let info = parse_probe_output(raw).unwrap();

        assert!(info.video.is_none());
        assert!(info.has_audio);
        assert_eq!(info.duration_sec, 10.0);
    }

    #[test]
    fn test_parse_probe_output_garbage_fails() {
        assert!(matches!(
            parse_probe_output("not json"),
            Err(CoreError::ProbeFailed(_))
        ));
    }

    #[test]
    fn test_explicit_paths_must_exist() {
        let result = FFmpegInfo::at(
            PathBuf::from("/definitely/missing/ffmpeg"),
            PathBuf::from("/definitely/missing/ffprobe"),
        );
        assert!(matches!(result, Err(CoreError::FFmpegNotFound)));
    }
}

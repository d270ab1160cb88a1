//! Background Music Mixer
//!
//! Reconciles the BGM track length against the video and composites it under
//! the voiceover. A BGM shorter than the video is tiled end to end and
//! trimmed to the exact video duration; a longer one is trimmed from the
//! start; a missing file degrades to the voiceover alone.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::TimeSec;

/// How the BGM track is stretched or cut to cover the video.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixPlan {
    /// Number of end-to-end BGM repetitions needed to cover the video
    pub loops: u32,
    /// Final BGM length, equal to the video duration
    pub trim_to_sec: TimeSec,
}

/// Computes the loop/trim plan for a BGM of `bgm_duration` against a video
/// of `video_duration`. Pure and idempotent.
pub fn plan_mix(bgm_duration: TimeSec, video_duration: TimeSec) -> MixPlan {
    let loops = if bgm_duration <= 0.0 {
        1
    } else if bgm_duration < video_duration {
        (video_duration / bgm_duration).ceil() as u32
    } else {
        1
    };

    MixPlan {
        loops,
        trim_to_sec: video_duration,
    }
}

/// Builds the FFmpeg invocation that mixes the BGM under the voiceover.
///
/// The video stream is copied untouched; only the audio is re-encoded. Both
/// tracks play simultaneously for the full video duration as a plain
/// additive overlay (`amix` normalization is disabled so the configured
/// volumes survive).
pub fn build_bgm_args(
    video_in: &Path,
    bgm_path: &Path,
    plan: MixPlan,
    voiceover_volume: f64,
    bgm_volume: f64,
    output: &Path,
) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        video_in.to_string_lossy().to_string(),
    ];

    // Tiling happens at the demuxer: play the BGM input `loops` times.
    if plan.loops > 1 {
        args.push("-stream_loop".to_string());
        args.push((plan.loops - 1).to_string());
    }
    args.push("-i".to_string());
    args.push(bgm_path.to_string_lossy().to_string());

    let filter = format!(
        "[0:a]volume={voiceover_volume}[vo];\
         [1:a]volume={bgm_volume},atrim=0:{trim:.3},asetpts=PTS-STARTPTS[bg];\
         [vo][bg]amix=inputs=2:duration=first:normalize=0[outa]",
        trim = plan.trim_to_sec,
    );

    args.extend([
        "-filter_complex".to_string(),
        filter,
        "-map".to_string(),
        "0:v".to_string(),
        "-map".to_string(),
        "[outa]".to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-y".to_string(),
        output.to_string_lossy().to_string(),
    ]);

    args
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_bgm_tiled_and_trimmed() {
        // 10s BGM against a 25s video: tile 3x, trim to exactly 25.0s.
        let plan = plan_mix(10.0, 25.0);
        assert_eq!(plan.loops, 3);
        assert_eq!(plan.trim_to_sec, 25.0);
    }

    #[test]
    fn test_long_bgm_trimmed_from_start() {
        let plan = plan_mix(90.0, 25.0);
        assert_eq!(plan.loops, 1);
        assert_eq!(plan.trim_to_sec, 25.0);
    }

    #[test]
    fn test_equal_durations_used_as_is() {
        let plan = plan_mix(25.0, 25.0);
        assert_eq!(plan.loops, 1);
        assert_eq!(plan.trim_to_sec, 25.0);
    }

    #[test]
    fn test_exact_multiple_needs_no_extra_loop() {
        let plan = plan_mix(5.0, 25.0);
        assert_eq!(plan.loops, 5);
    }

    #[test]
    fn test_plan_is_idempotent() {
        assert_eq!(plan_mix(10.0, 25.0), plan_mix(10.0, 25.0));
    }

    #[test]
    fn test_degenerate_bgm_duration() {
        let plan = plan_mix(0.0, 25.0);
        assert_eq!(plan.loops, 1);
    }

    #[test]
    fn test_args_loop_count_at_demuxer() {
        let args = build_bgm_args(
            Path::new("video.mp4"),
            Path::new("music.mp3"),
            plan_mix(10.0, 25.0),
            1.0,
            0.3,
            Path::new("out.mp4"),
        );

        let loop_index = args.iter().position(|a| a == "-stream_loop").unwrap();
        assert_eq!(args[loop_index + 1], "2"); // 3 plays = 2 extra loops
    }

    #[test]
    fn test_args_no_stream_loop_when_single_play() {
        let args = build_bgm_args(
            Path::new("video.mp4"),
            Path::new("music.mp3"),
            plan_mix(30.0, 25.0),
            1.0,
            0.3,
            Path::new("out.mp4"),
        );
        assert!(!args.contains(&"-stream_loop".to_string()));
    }

    #[test]
    fn test_args_filter_applies_volumes_and_trim() {
        let args = build_bgm_args(
            Path::new("video.mp4"),
            Path::new("music.mp3"),
            plan_mix(10.0, 25.0),
            1.0,
            0.3,
            Path::new("out.mp4"),
        );

        let fc_index = args.iter().position(|a| a == "-filter_complex").unwrap();
        let filter = &args[fc_index + 1];
        assert!(filter.contains("volume=1[vo]"));
        assert!(filter.contains("volume=0.3"));
        assert!(filter.contains("atrim=0:25.000"));
        assert!(filter.contains("normalize=0"));
    }

    #[test]
    fn test_args_copy_video_stream() {
        let args = build_bgm_args(
            Path::new("video.mp4"),
            Path::new("music.mp3"),
            plan_mix(10.0, 25.0),
            1.0,
            0.3,
            Path::new("out.mp4"),
        );

        let cv_index = args.iter().position(|a| a == "-c:v").unwrap();
        assert_eq!(args[cv_index + 1], "copy");
    }
}

//! Timeline Export
//!
//! Builds complete FFmpeg invocations from a timeline: the base render
//! (image clips + voiceover), and the caption burn-in pass. Argument
//! construction is pure and unit-tested; only the final run touches the
//! encoder.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::info;

use crate::core::captions::{CaptionStyle, OverlayClip};
use crate::core::config::VideoConfig;
use crate::core::ffmpeg::FFmpegRunner;
use crate::core::timeline::Timeline;
use crate::core::{Canvas, CoreError, CoreResult};

use super::{caption_chain, clip_filter_chain, concat_filter, AnimationStyle};

/// Render parameters shared by every clip in a run.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Output canvas size
    pub canvas: Canvas,
    /// Output frame rate
    pub fps: f64,
    /// Target width:height ratio for every clip
    pub target_ratio: f64,
    /// Pre-crop scale factor absorbing the animation zoom
    pub scale_factor: f64,
    /// Animation variant applied per clip
    pub animation: AnimationStyle,
    /// Encoding quality preset name ("standard" or "high")
    pub quality: String,
}

impl RenderSettings {
    pub fn from_config(config: &VideoConfig) -> Self {
        Self {
            canvas: config.canvas,
            fps: config.fps,
            target_ratio: config.target_ratio,
            scale_factor: config.scale_factor,
            animation: AnimationStyle::from_name(&config.animation),
            quality: config.quality.clone(),
        }
    }

    /// x264 preset for the configured quality tier
    fn x264_preset(&self) -> &'static str {
        match self.quality.as_str() {
            "high" => "medium",
            _ => "ultrafast",
        }
    }

    /// Encoder thread count for the configured quality tier
    fn threads(&self) -> usize {
        match self.quality.as_str() {
            "high" => 8,
            _ => 4,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from_config(&VideoConfig::default())
    }
}

/// Renders timelines through FFmpeg.
#[derive(Debug, Clone)]
pub struct Exporter {
    runner: FFmpegRunner,
}

impl Exporter {
    pub fn new(runner: FFmpegRunner) -> Self {
        Self { runner }
    }

    /// Renders the base video: animated image clips concatenated in segment
    /// order with the full voiceover bound untrimmed.
    pub async fn export_timeline(
        &self,
        timeline: &Timeline,
        settings: &RenderSettings,
        output: &Path,
    ) -> CoreResult<()> {
        if timeline.clips.is_empty() {
            return Err(CoreError::NoClips);
        }
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let dims = self.probe_clip_dimensions(timeline).await?;
        let args = build_timeline_args(timeline, &dims, settings, output);

        info!(
            "Rendering {} clips to {}",
            timeline.clips.len(),
            output.display()
        );
        self.runner.run(&args).await
    }

    /// Burns caption overlays into an already-rendered video.
    pub async fn burn_captions(
        &self,
        video_in: &Path,
        overlays: &[OverlayClip],
        style: &CaptionStyle,
        output: &Path,
    ) -> CoreResult<()> {
        let probed = self.runner.probe(video_in).await?;
        let canvas = probed
            .video
            .map(|v| Canvas::new(v.width, v.height))
            .ok_or_else(|| {
                CoreError::ProbeFailed(format!("no video stream in {}", video_in.display()))
            })?;

        let args = build_caption_args(video_in, overlays, style, canvas, output);

        info!(
            "Burning {} caption overlay(s) into {}",
            overlays.len(),
            output.display()
        );
        self.runner.run(&args).await
    }

    /// Probes every clip's source dimensions, bounded by the core count.
    /// Results come back in clip order regardless of completion order.
    async fn probe_clip_dimensions(&self, timeline: &Timeline) -> CoreResult<Vec<(u32, u32)>> {
        let semaphore = Arc::new(Semaphore::new(num_cpus::get().max(1)));
        let mut tasks = tokio::task::JoinSet::new();

        for (i, clip) in timeline.clips.iter().enumerate() {
            let runner = self.runner.clone();
            let source = clip.source.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire().await;
                let info = runner.probe(&source).await?;
                let video = info.video.ok_or_else(|| {
                    CoreError::ProbeFailed(format!("no video stream in {}", source.display()))
                })?;
                Ok::<(usize, (u32, u32)), CoreError>((i, (video.width, video.height)))
            });
        }

        let mut dims = vec![(0u32, 0u32); timeline.clips.len()];
        while let Some(joined) = tasks.join_next().await {
            let (i, size) = joined
                .map_err(|e| CoreError::ProbeFailed(e.to_string()))??;
            dims[i] = size;
        }
        Ok(dims)
    }
}

/// Builds the full argument vector for the base timeline render.
pub fn build_timeline_args(
    timeline: &Timeline,
    dims: &[(u32, u32)],
    settings: &RenderSettings,
    output: &Path,
) -> Vec<String> {
    let mut args = Vec::new();

    // One looped still-image input per clip, bounded by the clip duration.
    for clip in &timeline.clips {
        args.push("-loop".to_string());
        args.push("1".to_string());
        args.push("-t".to_string());
        args.push(format!("{:.3}", clip.duration_sec));
        args.push("-i".to_string());
        args.push(clip.source.to_string_lossy().to_string());
    }

    // Voiceover is the last input, bound whole and never trimmed.
    let audio_index = timeline.clips.len();
    args.push("-i".to_string());
    args.push(timeline.audio_path.to_string_lossy().to_string());

    let mut filter_parts = Vec::new();
    let mut labels = Vec::new();
    for (i, clip) in timeline.clips.iter().enumerate() {
        let label = format!("v{i}");
        let (w, h) = dims[i];
        filter_parts.push(clip_filter_chain(clip, w, h, settings, i, &label));
        labels.push(label);
    }
    filter_parts.push(concat_filter(&labels));

    args.push("-filter_complex".to_string());
    args.push(filter_parts.join(";"));

    args.push("-map".to_string());
    args.push("[outv]".to_string());
    args.push("-map".to_string());
    args.push(format!("{audio_index}:a"));

    args.push("-c:v".to_string());
    args.push("libx264".to_string());
    args.push("-preset".to_string());
    args.push(settings.x264_preset().to_string());
    args.push("-crf".to_string());
    args.push("23".to_string());
    args.push("-r".to_string());
    args.push(format!("{}", settings.fps));
    args.push("-pix_fmt".to_string());
    args.push("yuv420p".to_string());
    args.push("-c:a".to_string());
    args.push("aac".to_string());
    args.push("-threads".to_string());
    args.push(settings.threads().to_string());

    args.push("-y".to_string());
    args.push(output.to_string_lossy().to_string());

    args
}

/// Builds the argument vector for the caption burn-in pass.
pub fn build_caption_args(
    video_in: &Path,
    overlays: &[OverlayClip],
    style: &CaptionStyle,
    canvas: Canvas,
    output: &Path,
) -> Vec<String> {
    vec![
        "-i".to_string(),
        video_in.to_string_lossy().to_string(),
        "-filter_complex".to_string(),
        caption_chain(overlays, style, canvas, "0:v", "outv"),
        "-map".to_string(),
        "[outv]".to_string(),
        "-map".to_string(),
        "0:a?".to_string(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "ultrafast".to_string(),
        "-c:a".to_string(),
        "copy".to_string(),
        "-y".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

// =============================================================================
// Tests
// =============================================================================

//! Pipeline Orchestration
//!
//! Runs the stages strictly in sequence: script, voiceover, timing, images,
//! video assembly, captions, and background music. Each stage's output is
//! the next stage's required input, hand-offs go through the scratch
//! workspace, and stages short-circuit when their artifact already exists so
//! an interrupted run can resume.

mod history;
mod tracker;
mod workspace;

pub use history::{append_record, load_records, GenerationRecord};
pub use tracker::{format_duration, Stage, StageTracker};
pub use workspace::Workspace;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::core::audio;
use crate::core::captions::{render_overlays, CaptionMode, StyleRegistry};
use crate::core::config::PipelineConfig;
use crate::core::ffmpeg::FFmpegRunner;
use crate::core::providers::{image_file_path, with_retries, ProviderSet};
use crate::core::render::{Exporter, RenderSettings};
use crate::core::script;
use crate::core::timeline::{assemble, Timeline};
use crate::core::timing::{load_or_estimate, ProportionalEstimator, Segment};
use crate::core::{CoreError, CoreResult};

/// Per-run switches layered over the config.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Burn captions into the output
    pub captions: bool,
    /// Mix background music under the voiceover
    pub bgm: bool,
    /// Keep the scratch workspace (enables resuming the next run)
    pub keep_workdir: bool,
    /// Output file name (defaults to a name derived from the topic)
    pub output_name: Option<String>,
    /// Caption style override
    pub style: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            captions: true,
            bgm: true,
            keep_workdir: false,
            output_name: None,
            style: None,
        }
    }
}

/// The topic-to-video pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    providers: ProviderSet,
    runner: FFmpegRunner,
    exporter: Exporter,
    workspace: Workspace,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, providers: ProviderSet, runner: FFmpegRunner) -> Self {
        let workspace = Workspace::new(&config.workdir);
        let exporter = Exporter::new(runner.clone());
        Self {
            config,
            providers,
            runner,
            exporter,
            workspace,
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Runs the full pipeline for a topic and returns the finished video
    /// path inside the history directory.
    pub async fn run(&self, topic: &str, options: &PipelineOptions) -> CoreResult<PathBuf> {
        let mut tracker = StageTracker::new(topic);

        if !options.keep_workdir {
            self.workspace.clear()?;
        }
        self.workspace.ensure()?;

        tracker.begin(Stage::Script);
        let lines = self.script_stage(topic).await?;

        tracker.begin(Stage::Voiceover);
        let audio_path = self.voiceover_stage(&lines).await?;

        tracker.begin(Stage::Timing);
        let total_duration = audio::media_duration(&self.runner, &audio_path).await?;
        let estimator = ProportionalEstimator::default();
        let segments = load_or_estimate(
            &self.workspace.timestamps_path(),
            &estimator,
            &lines,
            total_duration,
        )?;

        tracker.begin(Stage::ImageGen);
        let image_paths = self.image_stage(&lines).await?;

        tracker.begin(Stage::Video);
        let mut timeline = assemble(&segments, &image_paths, &audio_path)?;
        let settings = RenderSettings::from_config(&self.config.video);
        let base_path = self.workspace.video_dir().join("output_video.mp4");
        if base_path.exists() {
            info!("Using existing base render at {}", base_path.display());
        } else {
            self.exporter
                .export_timeline(&timeline, &settings, &base_path)
                .await?;
        }
        let mut video_path = base_path;

        if options.captions && self.config.captions.enabled {
            tracker.begin(Stage::Captions);
            match self
                .caption_stage(&mut timeline, &segments, &video_path, options)
                .await
            {
                Ok(path) => video_path = path,
                Err(e) => warn!("Captioning failed, keeping uncaptioned video: {}", e),
            }
        } else {
            info!("Skipping caption generation");
        }

        if options.bgm && self.config.bgm.enabled {
            tracker.begin(Stage::Bgm);
            match self.bgm_stage(&video_path).await {
                Ok(Some(path)) => video_path = path,
                Ok(None) => {}
                Err(e) => warn!("BGM mixing failed, keeping video without music: {}", e),
            }
        } else {
            info!("Skipping background music");
        }

        let final_path = self.finalize_output(topic, &video_path, options)?;
        append_record(
            &self.workspace.history_dir(),
            GenerationRecord::completed(topic, &final_path),
        )?;

        if !options.keep_workdir {
            tracker.begin(Stage::Cleanup);
            self.workspace.clear()?;
        }

        tracker.complete(Some(final_path.as_path()));
        Ok(final_path)
    }

    /// Generates the script, or resumes from an existing formatted one.
    async fn script_stage(&self, topic: &str) -> CoreResult<Vec<String>> {
        let script_path = self.workspace.script_path();
        if script_path.exists() {
            info!("Using existing script at {}", script_path.display());
            return script::load_script_lines(&script_path);
        }

        let raw = with_retries("script generation", self.config.retry, || {
            let provider = Arc::clone(&self.providers.script);
            let topic = topic.to_string();
            async move { provider.generate_script(&topic).await }
        })
        .await?;

        let lines = script::save_formatted_script(&raw, &script_path)?;
        if lines.is_empty() {
            return Err(CoreError::provider(
                self.providers.script.name(),
                "script formatted to zero usable lines",
            ));
        }
        info!("Script formatted into {} line(s)", lines.len());
        Ok(lines)
    }

    /// Synthesizes the voiceover, or resumes from an existing audio file.
    async fn voiceover_stage(&self, lines: &[String]) -> CoreResult<PathBuf> {
        if let Some(existing) = self.workspace.find_voiceover() {
            info!("Using existing voiceover at {}", existing.display());
            return Ok(existing);
        }

        let text = lines.join(" ");
        with_retries("voiceover synthesis", self.config.retry, || {
            let provider = Arc::clone(&self.providers.voice);
            let voice = self.config.voiceover.voice.clone();
            let dir = self.workspace.voiceover_dir();
            let text = text.clone();
            async move { provider.synthesize(&text, &voice, &dir).await }
        })
        .await
    }

    /// Downloads one image per line, rate limited, skipping any that already
    /// exist. A failed download is logged and leaves a gap; the assembler
    /// skips it later.
    async fn image_stage(&self, lines: &[String]) -> CoreResult<Vec<PathBuf>> {
        let prompts = script::image_prompts(lines);
        let images_dir = self.workspace.images_dir();
        let delay = Duration::from_millis(self.config.image.request_delay_ms);

        let mut paths = Vec::with_capacity(prompts.len());
        for (i, prompt) in prompts.iter().enumerate() {
            let index = i + 1;
            let expected = image_file_path(&images_dir, index);
            if expected.exists() {
                info!("Image {} already present, skipping download", index);
                paths.push(expected);
                continue;
            }

            info!("Generating image {}/{}", index, prompts.len());
            let result = with_retries("image download", self.config.retry, || {
                let provider = Arc::clone(&self.providers.image);
                let prompt = prompt.clone();
                let dir = images_dir.clone();
                async move { provider.fetch_image(&prompt, index, &dir).await }
            })
            .await;

            match result {
                Ok(path) => paths.push(path),
                Err(e) => {
                    warn!("Image {} failed: {}; continuing without it", index, e);
                    paths.push(expected);
                }
            }

            if index < prompts.len() && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(paths)
    }

    /// Burns captions into the rendered video.
    async fn caption_stage(
        &self,
        timeline: &mut Timeline,
        segments: &[Segment],
        video_in: &Path,
        options: &PipelineOptions,
    ) -> CoreResult<PathBuf> {
        let registry = match &self.config.captions.style_file {
            Some(path) if path.exists() => StyleRegistry::with_overlay_file(path)?,
            _ => StyleRegistry::builtin(),
        };
        let style_name = options
            .style
            .as_deref()
            .unwrap_or(&self.config.captions.style);
        let style = registry.get(style_name)?;
        let mode = CaptionMode::from_name(&self.config.captions.mode);

        timeline.attach_overlays(render_overlays(segments, mode));

        let output = self.workspace.video_dir().join("output_video_captioned.mp4");
        self.exporter
            .burn_captions(video_in, &timeline.overlays, style, &output)
            .await?;
        Ok(output)
    }

    /// Mixes the configured BGM under the voiceover. A missing file is a
    /// graceful skip, not a failure.
    async fn bgm_stage(&self, video_in: &Path) -> CoreResult<Option<PathBuf>> {
        let Some(bgm_path) = self.config.bgm.path.as_deref() else {
            warn!("No BGM file configured, keeping voiceover only");
            return Ok(None);
        };
        if !bgm_path.exists() {
            warn!(
                "BGM file {} not found, keeping voiceover only",
                bgm_path.display()
            );
            return Ok(None);
        }

        let video_duration = self.runner.probe(video_in).await?.duration_sec;
        let bgm_duration = audio::media_duration(&self.runner, bgm_path).await?;
        let plan = audio::plan_mix(bgm_duration, video_duration);

        let output = self.workspace.video_dir().join("output_video_with_bgm.mp4");
        let args = audio::build_bgm_args(
            video_in,
            bgm_path,
            plan,
            self.config.bgm.voiceover_volume,
            self.config.bgm.volume,
            &output,
        );
        self.runner.run(&args).await?;
        Ok(Some(output))
    }

    /// Moves the finished video into the history directory before the
    /// scratch area is cleared.
    fn finalize_output(
        &self,
        topic: &str,
        video_path: &Path,
        options: &PipelineOptions,
    ) -> CoreResult<PathBuf> {
        let name = options
            .output_name
            .clone()
            .unwrap_or_else(|| format!("{}_video.mp4", sanitize_topic(topic)));
        let final_path = self.workspace.history_dir().join(name);

        if std::fs::rename(video_path, &final_path).is_err() {
            // Rename fails across filesystems; fall back to copy + delete.
            std::fs::copy(video_path, &final_path)?;
            std::fs::remove_file(video_path)?;
        }
        Ok(final_path)
    }
}

/// Reduces a topic to a filesystem-safe file-name stem.
fn sanitize_topic(topic: &str) -> String {
    let stem: String = topic
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "video".to_string()
    } else {
        stem
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Pipeline Configuration
//!
//! Provides the configuration object passed into each pipeline stage with:
//! - Per-field serde defaults so partial config files load cleanly
//! - A normalization pass that corrects bad values instead of failing
//! - Atomic file persistence (temp file + rename)
//!
//! Stages receive the config by reference and never mutate it at runtime;
//! stage-local overrides are layered on copies.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{CoreError, CoreResult};

/// Config schema version for migration support
pub const CONFIG_VERSION: u32 = 1;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Script generation settings
    #[serde(default)]
    pub script: ScriptConfig,

    /// Voiceover synthesis settings
    #[serde(default)]
    pub voiceover: VoiceoverConfig,

    /// Image generation settings
    #[serde(default)]
    pub image: ImageConfig,

    /// Video assembly settings
    #[serde(default)]
    pub video: VideoConfig,

    /// Caption settings
    #[serde(default)]
    pub captions: CaptionConfig,

    /// Background music settings
    #[serde(default)]
    pub bgm: BgmConfig,

    /// Provider retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Scratch directory for intermediate artifacts
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_workdir() -> PathBuf {
    PathBuf::from("data/temp")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            script: ScriptConfig::default(),
            voiceover: VoiceoverConfig::default(),
            image: ImageConfig::default(),
            video: VideoConfig::default(),
            captions: CaptionConfig::default(),
            bgm: BgmConfig::default(),
            retry: RetryConfig::default(),
            workdir: default_workdir(),
        }
    }
}

impl PipelineConfig {
    /// Loads a config file, or returns defaults when the path does not exist.
    pub fn load_or_default(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::normalized_default());
        }
        let raw = fs::read_to_string(path)?;
        let mut config: PipelineConfig = serde_json::from_str(&raw)?;
        config.normalize();
        Ok(config)
    }

    /// Default config with normalization applied
    pub fn normalized_default() -> Self {
        let mut config = Self::default();
        config.normalize();
        config
    }

    /// Persists the config atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Normalizes and clamps settings so loaded state is always valid.
    ///
    /// Intentionally tolerant: corrects bad values instead of failing, so
    /// hand-edited or stale config files don't brick the pipeline.
    pub fn normalize(&mut self) {
        self.version = CONFIG_VERSION;

        self.image.width = self.image.width.clamp(64, 4096);
        self.image.height = self.image.height.clamp(64, 4096);
        self.image.request_delay_ms = self.image.request_delay_ms.clamp(0, 60_000);

        self.video.fps = clamp_f64(self.video.fps, 1.0, 120.0);
        self.video.target_ratio = clamp_f64(self.video.target_ratio, 0.1, 10.0);
        self.video.scale_factor = clamp_f64(self.video.scale_factor, 1.0, 2.0);
        self.video.quality = normalize_enum(
            &self.video.quality,
            &["standard", "high"],
            default_quality(),
        );

        self.captions.mode = normalize_enum(
            &self.captions.mode,
            &["sentence", "word"],
            default_caption_mode(),
        );

        self.bgm.volume = clamp_f64(self.bgm.volume, 0.0, 1.0);
        self.bgm.voiceover_volume = clamp_f64(self.bgm.voiceover_volume, 0.0, 2.0);

        self.retry.max_attempts = self.retry.max_attempts.clamp(1, 10);
        self.retry.delay_secs = self.retry.delay_secs.clamp(0, 300);
    }

    /// Returns `true` when either side of the validation would change a value.
    pub fn is_normalized(&self) -> bool {
        let mut copy = self.clone();
        copy.normalize();
        copy == *self
    }
}

fn clamp_f64(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return min;
    }
    value.clamp(min, max)
}

fn normalize_enum(value: &str, allowed: &[&str], fallback: String) -> String {
    if allowed.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        value.to_ascii_lowercase()
    } else {
        fallback
    }
}

// =============================================================================
// Stage Sections
// =============================================================================

/// Script generation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScriptConfig {
    /// Provider name resolved through the provider registry
    #[serde(default = "default_script_provider")]
    pub provider: String,

    /// Model identifier passed to the provider
    #[serde(default = "default_script_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_script_key_env")]
    pub api_key_env: String,

    /// Base URL override (None = provider default)
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            provider: default_script_provider(),
            model: default_script_model(),
            api_key_env: default_script_key_env(),
            base_url: None,
        }
    }
}

fn default_script_provider() -> String {
    "openrouter".to_string()
}

fn default_script_model() -> String {
    "mistralai/devstral-2512:free".to_string()
}

fn default_script_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

/// Voiceover synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoiceoverConfig {
    /// Provider name resolved through the provider registry
    #[serde(default = "default_voice_provider")]
    pub provider: String,

    /// Voice identifier (provider-specific)
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Base URL override (None = provider default)
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for VoiceoverConfig {
    fn default() -> Self {
        Self {
            provider: default_voice_provider(),
            voice: default_voice(),
            base_url: None,
        }
    }
}

fn default_voice_provider() -> String {
    "http-tts".to_string()
}

fn default_voice() -> String {
    "en-US-JennyNeural".to_string()
}

/// Image generation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// Provider name resolved through the provider registry
    #[serde(default = "default_image_provider")]
    pub provider: String,

    /// Model identifier passed to the provider
    #[serde(default = "default_image_model")]
    pub model: String,

    /// Requested image width in pixels
    #[serde(default = "default_image_width")]
    pub width: u32,

    /// Requested image height in pixels
    #[serde(default = "default_image_height")]
    pub height: u32,

    /// Fixed delay between image requests (service quota courtesy)
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Environment variable holding the API key (if the provider needs one)
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Base URL override (None = provider default)
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            provider: default_image_provider(),
            model: default_image_model(),
            width: default_image_width(),
            height: default_image_height(),
            request_delay_ms: default_request_delay(),
            api_key_env: None,
            base_url: None,
        }
    }
}

fn default_image_provider() -> String {
    "pollinations".to_string()
}

fn default_image_model() -> String {
    "stabilityai/stable-diffusion-xl-base-1.0".to_string()
}

fn default_image_width() -> u32 {
    1080
}

fn default_image_height() -> u32 {
    1920
}

fn default_request_delay() -> u64 {
    1000
}

/// Video assembly settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoConfig {
    /// Output frame rate
    #[serde(default = "default_fps")]
    pub fps: f64,

    /// Encoding quality preset ("standard" or "high")
    #[serde(default = "default_quality")]
    pub quality: String,

    /// Target width:height ratio for every clip
    #[serde(default = "default_target_ratio")]
    pub target_ratio: f64,

    /// Output canvas size
    #[serde(default)]
    pub canvas: super::Canvas,

    /// Animation variant name
    #[serde(default = "default_animation")]
    pub animation: String,

    /// Pre-crop scale factor absorbing the animation zoom
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            quality: default_quality(),
            target_ratio: default_target_ratio(),
            canvas: super::Canvas::default(),
            animation: default_animation(),
            scale_factor: default_scale_factor(),
        }
    }
}

fn default_fps() -> f64 {
    30.0
}

fn default_quality() -> String {
    "standard".to_string()
}

fn default_target_ratio() -> f64 {
    9.0 / 16.0
}

fn default_animation() -> String {
    "zoom_fade_mix".to_string()
}

fn default_scale_factor() -> f64 {
    1.1
}

/// Caption settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaptionConfig {
    /// Whether captions are burned into the output
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Style name resolved through the style registry
    #[serde(default = "default_caption_style")]
    pub style: String,

    /// Overlay granularity: "sentence" or "word"
    #[serde(default = "default_caption_mode")]
    pub mode: String,

    /// Optional JSON file with extra styles layered over the builtins
    #[serde(default)]
    pub style_file: Option<PathBuf>,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            style: default_caption_style(),
            mode: default_caption_mode(),
            style_file: None,
        }
    }
}

fn default_caption_style() -> String {
    "comic".to_string()
}

fn default_caption_mode() -> String {
    "word".to_string()
}

/// Background music settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BgmConfig {
    /// Whether a BGM track is mixed under the voiceover
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path to the music file (absent file degrades gracefully)
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// BGM volume (0.0 - 1.0)
    #[serde(default = "default_bgm_volume")]
    pub volume: f64,

    /// Voiceover volume (0.0 - 2.0)
    #[serde(default = "default_voiceover_volume")]
    pub voiceover_volume: f64,
}

impl Default for BgmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            volume: default_bgm_volume(),
            voiceover_volume: default_voiceover_volume(),
        }
    }
}

fn default_bgm_volume() -> f64 {
    0.3
}

fn default_voiceover_volume() -> f64 {
    1.0
}

/// Provider retry policy: bounded attempts with a fixed delay
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Total attempts per network call
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts in seconds
    #[serde(default = "default_retry_delay")]
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_secs: default_retry_delay(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    3
}

fn default_true() -> bool {
    true
}

impl PipelineConfig {
    /// Resolves an API key from the configured environment variable.
    pub fn script_api_key(&self) -> CoreResult<String> {
        std::env::var(&self.script.api_key_env).map_err(|_| {
            CoreError::Config(format!(
                "API key not found: set the {} environment variable",
                self.script.api_key_env
            ))
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_normalized() {
        let config = PipelineConfig::normalized_default();
        assert!(config.is_normalized());
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.video.quality, "standard");
        assert_eq!(config.captions.mode, "word");
    }

    #[test]
    fn test_normalize_clamps_out_of_range_values() {
        let mut config = PipelineConfig::default();
        config.video.fps = 0.0;
        config.video.scale_factor = 9.0;
        config.bgm.volume = 4.2;
        config.retry.max_attempts = 0;
        config.normalize();

        assert_eq!(config.video.fps, 1.0);
        assert_eq!(config.video.scale_factor, 2.0);
        assert_eq!(config.bgm.volume, 1.0);
        assert_eq!(config.retry.max_attempts, 1);
    }

    #[test]
    fn test_normalize_rejects_unknown_enum_values() {
        let mut config = PipelineConfig::default();
        config.video.quality = "ludicrous".to_string();
        config.captions.mode = "paragraph".to_string();
        config.normalize();

        assert_eq!(config.video.quality, "standard");
        assert_eq!(config.captions.mode, "word");
    }

    #[test]
    fn test_normalize_handles_non_finite_floats() {
        let mut config = PipelineConfig::default();
        config.video.target_ratio = f64::NAN;
        config.normalize();
        assert_eq!(config.video.target_ratio, 0.1);
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let raw = r#"{ "video": { "fps": 24.0 } }"#;
        let mut config: PipelineConfig = serde_json::from_str(raw).unwrap();
        config.normalize();

        assert_eq!(config.video.fps, 24.0);
        assert_eq!(config.image.width, 1080);
        assert_eq!(config.bgm.volume, 0.3);
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = PipelineConfig::normalized_default();
        config.video.fps = 24.0;
        config.save(&path).unwrap();

        let loaded = PipelineConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::load_or_default(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, PipelineConfig::normalized_default());
    }
}

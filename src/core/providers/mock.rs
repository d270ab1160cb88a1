//! Mock Providers
//!
//! Offline stand-ins that write real artifacts, so the pipeline runs end to
//! end without network access. The mock voice writes a playable WAV whose
//! length tracks the text's word count at the assumed speaking rate.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{image_file_path, ImageProvider, ScriptProvider, VoiceProvider};
use crate::core::timing::WORDS_PER_SECOND;
use crate::core::{CoreError, CoreResult};

/// Minimal valid JPEG stream (SOI + EOI) for placeholder images
const PLACEHOLDER_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xD9];

/// Script provider returning a canned script.
pub struct MockScriptProvider {
    script: String,
}

impl MockScriptProvider {
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl Default for MockScriptProvider {
    fn default() -> Self {
        Self::new(
            "Every short video starts with a hook. This one is no different. \
             The middle explains the idea in plain words. The ending lands the point.",
        )
    }
}

#[async_trait]
impl ScriptProvider for MockScriptProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate_script(&self, _topic: &str) -> CoreResult<String> {
        Ok(self.script.clone())
    }
}

/// Voice provider writing silent WAV audio sized to the text length.
#[derive(Default)]
pub struct MockVoiceProvider;

#[async_trait]
impl VoiceProvider for MockVoiceProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn synthesize(&self, text: &str, _voice: &str, out_dir: &Path) -> CoreResult<PathBuf> {
        let words = text.split_whitespace().count().max(1);
        let seconds = words as f64 / WORDS_PER_SECOND;
        let sample_rate = 16_000u32;

        std::fs::create_dir_all(out_dir)?;
        let out_path = out_dir.join("voiceover.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&out_path, spec)
            .map_err(|e| CoreError::provider("mock", e))?;
        for _ in 0..(seconds * sample_rate as f64) as usize {
            writer
                .write_sample(0i16)
                .map_err(|e| CoreError::provider("mock", e))?;
        }
        writer
            .finalize()
            .map_err(|e| CoreError::provider("mock", e))?;
        Ok(out_path)
    }
}

/// Image provider writing placeholder JPEG files.
#[derive(Default, Debug)]
pub struct MockImageProvider;

#[async_trait]
impl ImageProvider for MockImageProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_image(
        &self,
        _prompt: &str,
        index: usize,
        out_dir: &Path,
    ) -> CoreResult<PathBuf> {
        std::fs::create_dir_all(out_dir)?;
        let path = image_file_path(out_dir, index);
        std::fs::write(&path, PLACEHOLDER_JPEG)?;
        Ok(path)
    }
}

// =============================================================================
// Tests
// =============================================================================

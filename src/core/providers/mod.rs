//! Generation Providers
//!
//! Provider abstraction for the external script, voice, and image services.
//! Each capability is a trait; implementations are chosen by name through a
//! registry of factory functions resolved once at configuration time.

mod image;
mod mock;
mod registry;
mod retry;
mod script;
mod voice;

pub use image::{PollinationsImageProvider, WorkersAiImageProvider};
pub use mock::{MockImageProvider, MockScriptProvider, MockVoiceProvider};
pub use registry::{ProviderRegistry, ProviderSet};
pub use retry::with_retries;
pub use script::OpenRouterScriptProvider;
pub use voice::HttpTtsProvider;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::CoreResult;

/// Request timeout applied to provider HTTP clients
pub const PROVIDER_TIMEOUT_SECS: u64 = 60;

/// Generates a voiceover script for a topic.
#[async_trait]
pub trait ScriptProvider: Send + Sync {
    /// Returns the provider's registered name
    fn name(&self) -> &str;

    /// Generates the full script text for the given topic.
    async fn generate_script(&self, topic: &str) -> CoreResult<String>;
}

/// Synthesizes speech audio from text.
#[async_trait]
pub trait VoiceProvider: Send + Sync {
    /// Returns the provider's registered name
    fn name(&self) -> &str;

    /// Synthesizes `text` with the given voice, writes the audio file under
    /// `out_dir` (container format is the provider's choice), and returns
    /// the written path.
    async fn synthesize(&self, text: &str, voice: &str, out_dir: &Path) -> CoreResult<PathBuf>;
}

/// Fetches one generated image per prompt.
#[async_trait]
pub trait ImageProvider: Send + Sync + std::fmt::Debug {
    /// Returns the provider's registered name
    fn name(&self) -> &str;

    /// Generates an image for `prompt` and writes it to the conventional
    /// `image_{index}.jpg` path under `out_dir`, returning that path.
    async fn fetch_image(&self, prompt: &str, index: usize, out_dir: &Path)
        -> CoreResult<PathBuf>;
}

/// Path convention shared by image providers and the assembler.
pub fn image_file_path(out_dir: &Path, index: usize) -> PathBuf {
    out_dir.join(format!("image_{index}.jpg"))
}

//! Voice Providers
//!
//! Speech synthesis over a simple HTTP TTS gateway: POST text and voice
//! name, receive audio bytes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::{VoiceProvider, PROVIDER_TIMEOUT_SECS};
use crate::core::{CoreError, CoreResult};

/// Voice provider speaking to an HTTP TTS service.
pub struct HttpTtsProvider {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTtsProvider {
    /// Default gateway address for a locally hosted TTS frontend
    pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:5050/v1/audio/speech";

    pub fn new(base_url: Option<String>) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            client,
        })
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    input: &'a str,
    voice: &'a str,
}

#[async_trait]
impl VoiceProvider for HttpTtsProvider {
    fn name(&self) -> &str {
        "http-tts"
    }

    async fn synthesize(&self, text: &str, voice: &str, out_dir: &Path) -> CoreResult<PathBuf> {
        let response = self
            .client
            .post(&self.base_url)
            .json(&SpeechRequest { input: text, voice })
            .send()
            .await
            .map_err(|e| CoreError::provider(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::provider(
                self.name(),
                format!("status {status}"),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CoreError::provider(self.name(), e))?;
        if bytes.is_empty() {
            return Err(CoreError::provider(self.name(), "empty audio response"));
        }

        std::fs::create_dir_all(out_dir)?;
        let out_path = out_dir.join("voiceover.mp3");
        std::fs::write(&out_path, &bytes)?;
        info!(
            "Voiceover saved to {} ({} bytes)",
            out_path.display(),
            bytes.len()
        );
        Ok(out_path)
    }
}

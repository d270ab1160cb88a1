//! Image Providers
//!
//! Fetches one generated image per script line. Two HTTP shapes are
//! supported: a GET service with query parameters (Pollinations) and a
//! bearer-authenticated POST service returning raw image bytes
//! (Cloudflare Workers AI style).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::{image_file_path, ImageProvider, PROVIDER_TIMEOUT_SECS};
use crate::core::{CoreError, CoreResult};

fn build_client() -> CoreResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(PROVIDER_TIMEOUT_SECS))
        .build()
        .map_err(|e| CoreError::Config(format!("Failed to create HTTP client: {e}")))
}

fn write_image(out_dir: &Path, index: usize, bytes: &[u8]) -> CoreResult<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let path = image_file_path(out_dir, index);
    std::fs::write(&path, bytes)?;
    info!("Image {} saved to {} ({} bytes)", index, path.display(), bytes.len());
    Ok(path)
}

// =============================================================================
// Pollinations
// =============================================================================

/// GET-based image provider (Pollinations API shape).
#[derive(Debug)]
pub struct PollinationsImageProvider {
    base_url: String,
    model: String,
    width: u32,
    height: u32,
    client: reqwest::Client,
}

impl PollinationsImageProvider {
    /// Default Pollinations endpoint
    pub const DEFAULT_BASE_URL: &'static str = "https://image.pollinations.ai/prompt/";

    pub fn new(
        base_url: Option<String>,
        model: String,
        width: u32,
        height: u32,
    ) -> CoreResult<Self> {
        Ok(Self {
            base_url: base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            model,
            width,
            height,
            client: build_client()?,
        })
    }
}

#[async_trait]
impl ImageProvider for PollinationsImageProvider {
    fn name(&self) -> &str {
        "pollinations"
    }

    async fn fetch_image(
        &self,
        prompt: &str,
        index: usize,
        out_dir: &Path,
    ) -> CoreResult<PathBuf> {
        // The segment index doubles as the seed, so each image varies while
        // a re-run reproduces the same set.
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("prompt", prompt),
                ("width", &self.width.to_string()),
                ("height", &self.height.to_string()),
                ("model", &self.model),
                ("nologo", "true"),
                ("seed", &index.to_string()),
            ])
            .send()
            .await
            .map_err(|e| CoreError::provider(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::provider(
                self.name(),
                format!("status {status} for image {index}"),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CoreError::provider(self.name(), e))?;
        write_image(out_dir, index, &bytes)
    }
}

// =============================================================================
// Workers AI
// =============================================================================

/// POST-based image provider returning raw bytes (Workers AI shape).
#[derive(Debug)]
pub struct WorkersAiImageProvider {
    endpoint: String,
    api_key: String,
    width: u32,
    height: u32,
    client: reqwest::Client,
}

impl WorkersAiImageProvider {
    pub fn new(endpoint: String, api_key: String, width: u32, height: u32) -> CoreResult<Self> {
        if api_key.is_empty() {
            return Err(CoreError::Config(
                "Workers AI API key cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            endpoint,
            api_key,
            width,
            height,
            client: build_client()?,
        })
    }
}

#[derive(Serialize)]
struct WorkersAiRequest<'a> {
    prompt: &'a str,
    num_steps: u32,
    width: u32,
    height: u32,
}

#[async_trait]
impl ImageProvider for WorkersAiImageProvider {
    fn name(&self) -> &str {
        "workers-ai"
    }

    async fn fetch_image(
        &self,
        prompt: &str,
        index: usize,
        out_dir: &Path,
    ) -> CoreResult<PathBuf> {
        // Lightning-style models take a compact prompt; keep the subject,
        // drop the trailing tag soup.
        let subject = prompt.split(',').next().unwrap_or(prompt);
        let subject: String = subject.chars().take(100).collect();

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&WorkersAiRequest {
                prompt: &subject,
                num_steps: 4,
                width: self.width,
                height: self.height,
            })
            .send()
            .await
            .map_err(|e| CoreError::provider(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::provider(
                self.name(),
                format!("status {status} for image {index}"),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CoreError::provider(self.name(), e))?;
        write_image(out_dir, index, &bytes)
    }
}

// =============================================================================
// Tests
// =============================================================================

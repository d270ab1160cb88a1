//! Script Providers
//!
//! LLM-backed script generation over OpenAI-compatible chat-completions
//! endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ScriptProvider, PROVIDER_TIMEOUT_SECS};
use crate::core::{CoreError, CoreResult};

/// Instructions sent as the system message with every script request
const SYSTEM_PROMPT: &str = "You are a professional YouTube script writer. Write a compelling \
     and curiosity-driven voiceover script for a YouTube Shorts video, about 45 to 60 seconds \
     long. The script must hook from the very first line, use simple and clear language, and \
     explain the topic fully in a short and impactful way. Do NOT include stage directions, \
     timestamps, or sound cues. Output plain text in a single paragraph without line breaks \
     or bullet points. The script must stand alone and fully cover the topic within 60 seconds.";

/// Script provider for OpenRouter's OpenAI-compatible chat API.
pub struct OpenRouterScriptProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenRouterScriptProvider {
    /// Default OpenRouter API base URL
    pub const DEFAULT_BASE_URL: &'static str = "https://openrouter.ai/api/v1";

    pub fn new(api_key: String, base_url: Option<String>, model: String) -> CoreResult<Self> {
        if api_key.is_empty() {
            return Err(CoreError::Config(
                "OpenRouter API key cannot be empty".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .build()
            .map_err(|e| CoreError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string()),
            model,
            client,
        })
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl ScriptProvider for OpenRouterScriptProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn generate_script(&self, topic: &str) -> CoreResult<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: topic.to_string(),
                },
            ],
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 1000,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CoreError::provider(self.name(), e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CoreError::provider(
                self.name(),
                format!("status {status}: {body}"),
            ));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CoreError::provider(self.name(), e))?;

        let script = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if script.trim().is_empty() {
            return Err(CoreError::provider(self.name(), "empty completion"));
        }
        Ok(script)
    }
}

// =============================================================================
// Tests
// =============================================================================

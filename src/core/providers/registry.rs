//! Provider Registry
//!
//! Maps provider names to factory functions, resolved once at configuration
//! time. Unknown names fail with the list of registered alternatives instead
//! of a bare lookup error.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::config::PipelineConfig;
use crate::core::{CoreError, CoreResult};

use super::{
    HttpTtsProvider, ImageProvider, MockImageProvider, MockScriptProvider, MockVoiceProvider,
    OpenRouterScriptProvider, PollinationsImageProvider, ScriptProvider, VoiceProvider,
    WorkersAiImageProvider,
};

type ScriptFactory =
    Box<dyn Fn(&PipelineConfig) -> CoreResult<Arc<dyn ScriptProvider>> + Send + Sync>;
type VoiceFactory =
    Box<dyn Fn(&PipelineConfig) -> CoreResult<Arc<dyn VoiceProvider>> + Send + Sync>;
type ImageFactory =
    Box<dyn Fn(&PipelineConfig) -> CoreResult<Arc<dyn ImageProvider>> + Send + Sync>;

/// The resolved providers a pipeline run works with.
#[derive(Clone)]
pub struct ProviderSet {
    pub script: Arc<dyn ScriptProvider>,
    pub voice: Arc<dyn VoiceProvider>,
    pub image: Arc<dyn ImageProvider>,
}

impl ProviderSet {
    /// Fully mocked set for offline runs and tests.
    pub fn mocked() -> Self {
        Self {
            script: Arc::new(MockScriptProvider::default()),
            voice: Arc::new(MockVoiceProvider),
            image: Arc::new(MockImageProvider),
        }
    }
}

/// Named constructors for every provider capability.
pub struct ProviderRegistry {
    script: HashMap<String, ScriptFactory>,
    voice: HashMap<String, VoiceFactory>,
    image: HashMap<String, ImageFactory>,
}

impl ProviderRegistry {
    /// Registry with the builtin providers.
    pub fn builtin() -> Self {
        let mut registry = Self {
            script: HashMap::new(),
            voice: HashMap::new(),
            image: HashMap::new(),
        };

        registry.register_script("openrouter", |config| {
            let api_key = config.script_api_key()?;
            Ok(Arc::new(OpenRouterScriptProvider::new(
                api_key,
                config.script.base_url.clone(),
                config.script.model.clone(),
            )?))
        });
        registry.register_script("mock", |_| Ok(Arc::new(MockScriptProvider::default())));

        registry.register_voice("http-tts", |config| {
            Ok(Arc::new(HttpTtsProvider::new(
                config.voiceover.base_url.clone(),
            )?))
        });
        registry.register_voice("mock", |_| Ok(Arc::new(MockVoiceProvider)));

        registry.register_image("pollinations", |config| {
            Ok(Arc::new(PollinationsImageProvider::new(
                config.image.base_url.clone(),
                config.image.model.clone(),
                config.image.width,
                config.image.height,
            )?))
        });
        registry.register_image("workers-ai", |config| {
            let endpoint = config.image.base_url.clone().ok_or_else(|| {
                CoreError::Config("workers-ai requires image.baseUrl".to_string())
            })?;
            let key_env = config.image.api_key_env.clone().ok_or_else(|| {
                CoreError::Config("workers-ai requires image.apiKeyEnv".to_string())
            })?;
            let api_key = std::env::var(&key_env).map_err(|_| {
                CoreError::Config(format!(
                    "API key not found: set the {key_env} environment variable"
                ))
            })?;
            Ok(Arc::new(WorkersAiImageProvider::new(
                endpoint,
                api_key,
                config.image.width,
                config.image.height,
            )?))
        });
        registry.register_image("mock", |_| Ok(Arc::new(MockImageProvider)));

        registry
    }

    pub fn register_script<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&PipelineConfig) -> CoreResult<Arc<dyn ScriptProvider>> + Send + Sync + 'static,
    {
        self.script.insert(name.to_string(), Box::new(factory));
    }

    pub fn register_voice<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&PipelineConfig) -> CoreResult<Arc<dyn VoiceProvider>> + Send + Sync + 'static,
    {
        self.voice.insert(name.to_string(), Box::new(factory));
    }

    pub fn register_image<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&PipelineConfig) -> CoreResult<Arc<dyn ImageProvider>> + Send + Sync + 'static,
    {
        self.image.insert(name.to_string(), Box::new(factory));
    }

    /// Builds the script provider named in the config.
    pub fn script(&self, config: &PipelineConfig) -> CoreResult<Arc<dyn ScriptProvider>> {
        let name = &config.script.provider;
        match self.script.get(name) {
            Some(factory) => factory(config),
            None => Err(unknown(name, self.script.keys())),
        }
    }

    /// Builds the voice provider named in the config.
    pub fn voice(&self, config: &PipelineConfig) -> CoreResult<Arc<dyn VoiceProvider>> {
        let name = &config.voiceover.provider;
        match self.voice.get(name) {
            Some(factory) => factory(config),
            None => Err(unknown(name, self.voice.keys())),
        }
    }

    /// Builds the image provider named in the config.
    pub fn image(&self, config: &PipelineConfig) -> CoreResult<Arc<dyn ImageProvider>> {
        let name = &config.image.provider;
        match self.image.get(name) {
            Some(factory) => factory(config),
            None => Err(unknown(name, self.image.keys())),
        }
    }

    /// Resolves the full provider set for a config.
    pub fn resolve(&self, config: &PipelineConfig) -> CoreResult<ProviderSet> {
        Ok(ProviderSet {
            script: self.script(config)?,
            voice: self.voice(config)?,
            image: self.image(config)?,
        })
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn unknown<'a>(name: &str, known: impl Iterator<Item = &'a String>) -> CoreError {
    let mut names: Vec<&str> = known.map(String::as_str).collect();
    names.sort_unstable();
    CoreError::UnknownProvider(format!("{name} (known: {})", names.join(", ")))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_config() -> PipelineConfig {
        let mut config = PipelineConfig::normalized_default();
        config.script.provider = "mock".to_string();
        config.voiceover.provider = "mock".to_string();
        config.image.provider = "mock".to_string();
        config
    }

    #[test]
    fn test_resolve_mock_set() {
        let registry = ProviderRegistry::builtin();
        let set = registry.resolve(&mock_config()).unwrap();

        assert_eq!(set.script.name(), "mock");
        assert_eq!(set.voice.name(), "mock");
        assert_eq!(set.image.name(), "mock");
    }

    #[test]
    fn test_unknown_provider_lists_alternatives() {
        let registry = ProviderRegistry::builtin();
        let mut config = mock_config();
        config.image.provider = "dalle9".to_string();

        let err = registry.image(&config).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("dalle9"));
        assert!(message.contains("pollinations"));
        assert!(message.contains("mock"));
    }

    #[test]
    fn test_custom_registration() {
        let mut registry = ProviderRegistry::builtin();
        registry.register_script("canned", |_| {
            Ok(Arc::new(MockScriptProvider::new("fixed output")))
        });

        let mut config = mock_config();
        config.script.provider = "canned".to_string();
        let provider = registry.script(&config).unwrap();
        assert_eq!(provider.name(), "mock");
    }

    #[test]
    fn test_workers_ai_requires_endpoint() {
        let registry = ProviderRegistry::builtin();
        let mut config = mock_config();
        config.image.provider = "workers-ai".to_string();
        config.image.base_url = None;

        assert!(matches!(
            registry.image(&config),
            Err(CoreError::Config(_))
        ));
    }
}

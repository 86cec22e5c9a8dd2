//! Provider profiles as they appear in configuration.

use crate::error::PipelineError;
use crate::provider::{CompletionOptions, ModelProvider};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    OpenAI,
    Anthropic,
    Ollama,
    /// Any server speaking the OpenAI chat-completions protocol (Gemini's compatibility
    /// endpoint, vLLM, LM Studio).
    Custom,
}

impl ProviderType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderType::OpenAI => "openai",
            ProviderType::Anthropic => "anthropic",
            ProviderType::Ollama => "ollama",
            ProviderType::Custom => "custom",
        }
    }

    fn requires_api_key(self) -> bool {
        matches!(self, ProviderType::OpenAI | ProviderType::Anthropic)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Filled from the table key when omitted.
    #[serde(default)]
    pub provider_name: Option<String>,
    pub provider_type: ProviderType,
    pub model: String,
    /// Literal key. Prefer `api_key_env` so keys stay out of config files.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable holding the key.
    #[serde(default)]
    pub api_key_env: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub default_options: CompletionOptions,
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(format!("Endpoint must be an http(s) URL: {}", endpoint));
            }
        }
        if self.provider_type == ProviderType::Custom && self.endpoint.is_none() {
            return Err("Custom providers require an endpoint".to_string());
        }
        if let Some(temp) = self.default_options.temperature {
            if !(0.0..=2.0).contains(&temp) {
                return Err(format!("Temperature must be between 0.0 and 2.0, got {}", temp));
            }
        }
        if self.provider_type.requires_api_key()
            && self.api_key.is_none()
            && self.api_key_env.is_none()
        {
            return Err(format!(
                "{} providers need api_key or api_key_env",
                self.provider_type.as_str()
            ));
        }
        Ok(())
    }

    /// Resolve the API key: literal value first, then the named environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key.clone().or_else(|| {
            self.api_key_env
                .as_ref()
                .and_then(|var| std::env::var(var).ok())
                .filter(|key| !key.is_empty())
        })
    }

    pub fn to_model_provider(&self) -> Result<ModelProvider, PipelineError> {
        let name = self.provider_name.as_deref().unwrap_or(self.provider_type.as_str());
        let required_key = || {
            self.resolve_api_key().ok_or_else(|| {
                PipelineError::ProviderNotConfigured(format!("No API key available for provider '{}'", name))
            })
        };

        Ok(match self.provider_type {
            ProviderType::OpenAI => ModelProvider::OpenAI {
                model: self.model.clone(),
                api_key: required_key()?,
                base_url: self.endpoint.clone(),
            },
            ProviderType::Anthropic => ModelProvider::Anthropic {
                model: self.model.clone(),
                api_key: required_key()?,
            },
            ProviderType::Ollama => ModelProvider::Ollama {
                model: self.model.clone(),
                base_url: self.endpoint.clone(),
            },
            ProviderType::Custom => ModelProvider::Custom {
                model: self.model.clone(),
                endpoint: self.endpoint.clone().ok_or_else(|| {
                    PipelineError::ProviderNotConfigured(format!("Provider '{}' has no endpoint", name))
                })?,
                api_key: self.resolve_api_key(),
            },
        })
    }
}

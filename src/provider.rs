//! Model Provider Abstraction
//!
//! One interface over the chat-completion providers the generation stages talk to. Which
//! model a stage uses is configuration; nothing here chooses one.

use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub mod clients;
pub mod profile;

pub use clients::{AnthropicClient, OpenAICompatibleClient};
pub use profile::{ProviderConfig, ProviderType};

/// Resolved provider connection details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelProvider {
    OpenAI {
        model: String,
        api_key: String,
        base_url: Option<String>,
    },
    Anthropic {
        model: String,
        api_key: String,
    },
    Ollama {
        model: String,
        base_url: Option<String>, // Default: http://localhost:11434
    },
    Custom {
        model: String,
        endpoint: String,
        api_key: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: Option<f32>, // 0.0-2.0
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub stop: Option<Vec<String>>,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: Some(0.7),
            max_tokens: None,
            top_p: None,
            stop: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
}

#[async_trait]
pub trait ModelProviderClient: Send + Sync {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, PipelineError>;

    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;
}

pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_client(provider: &ModelProvider) -> Result<Arc<dyn ModelProviderClient>, PipelineError> {
        let client: Arc<dyn ModelProviderClient> = match provider {
            ModelProvider::OpenAI {
                model,
                api_key,
                base_url,
            } => Arc::new(OpenAICompatibleClient::openai(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
            )?),
            ModelProvider::Anthropic { model, api_key } => {
                Arc::new(AnthropicClient::new(model.clone(), api_key.clone())?)
            }
            ModelProvider::Ollama { model, base_url } => {
                Arc::new(OpenAICompatibleClient::ollama(model.clone(), base_url.clone())?)
            }
            ModelProvider::Custom {
                model,
                endpoint,
                api_key,
            } => Arc::new(OpenAICompatibleClient::custom(
                model.clone(),
                endpoint.clone(),
                api_key.clone(),
            )?),
        };
        Ok(client)
    }
}

/// Named provider configurations, shared across stages.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, ProviderConfig>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_configs(configs: &HashMap<String, ProviderConfig>) -> Self {
        let mut registry = Self::new();
        for (name, config) in configs {
            registry.insert(name, config.clone());
        }
        registry
    }

    pub fn insert(&mut self, name: &str, mut config: ProviderConfig) {
        if config.provider_name.is_none() {
            config.provider_name = Some(name.to_string());
        }
        self.providers.insert(name.to_string(), config);
    }

    pub fn get(&self, provider_name: &str) -> Option<&ProviderConfig> {
        self.providers.get(provider_name)
    }

    pub fn get_or_error(&self, provider_name: &str) -> Result<&ProviderConfig, PipelineError> {
        self.get(provider_name).ok_or_else(|| {
            PipelineError::ProviderNotConfigured(format!("Provider not found: {}", provider_name))
        })
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn create_client(&self, provider_name: &str) -> Result<Arc<dyn ModelProviderClient>, PipelineError> {
        let model_provider = self.get_or_error(provider_name)?.to_model_provider()?;
        ProviderFactory::create_client(&model_provider)
    }
}

// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    responses: Vec<String>,
    current: parking_lot::Mutex<usize>,
    pub seen: parking_lot::Mutex<Vec<Vec<ChatMessage>>>,
}

#[cfg(test)]
impl MockProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            current: parking_lot::Mutex::new(0),
            seen: parking_lot::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl ModelProviderClient for MockProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, PipelineError> {
        self.seen.lock().push(messages);
        let mut idx = self.current.lock();
        let content = self
            .responses
            .get(*idx)
            .cloned()
            .unwrap_or_else(|| "Mock response".to_string());
        *idx += 1;

        Ok(CompletionResponse {
            content,
            model: "mock-model".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 20,
                total_tokens: 30,
            },
            finish_reason: Some("stop".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

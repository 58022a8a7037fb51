use async_trait::async_trait;
use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::anthropic;
use std::time::Duration;

use crate::domain::{ports::LlmService, DomainError};
use crate::infrastructure::config::LlmConfig;

/// Hosted generation with bounded output and low sampling temperature.
/// The request is capped by a client-side timeout; there is no retry.
pub struct AnthropicLlm {
    model: String,
    max_tokens: u64,
    temperature: f64,
    timeout: Duration,
}

impl AnthropicLlm {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: 500,
            temperature: 0.3,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn default_model() -> Self {
        Self::new("claude-3-opus-20240229")
    }

    async fn prompt_agent(
        &self,
        system: Option<&str>,
        prompt: &str,
    ) -> Result<String, DomainError> {
        let client = anthropic::Client::from_env();
        let mut builder = client
            .agent(&self.model)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens);
        if let Some(system) = system {
            builder = builder.preamble(system);
        }
        let agent = builder.build();

        tokio::time::timeout(self.timeout, agent.prompt(prompt))
            .await
            .map_err(|_| DomainError::timeout("generation timed out"))?
            .map_err(|e| DomainError::external(e.to_string()))
    }
}

#[async_trait]
impl LlmService for AnthropicLlm {
    async fn complete(&self, prompt: &str) -> Result<String, DomainError> {
        self.prompt_agent(None, prompt).await
    }

    async fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> Result<String, DomainError> {
        self.prompt_agent(Some(system), prompt).await
    }
}

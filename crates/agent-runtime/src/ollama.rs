//! Ollama LLM Provider
//!
//! Implementation of `LlmProvider` for local Ollama inference. The ReAct
//! prompt goes out as a single plain generation request.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    provider::{Completion, GenerationOptions, LlmProvider, ModelInfo},
};
use async_trait::async_trait;
use ollama_rs::{
    generation::{
        completion::{GenerationResponse, request::GenerationRequest},
    },
    models::ModelOptions as OllamaOptions,
    Ollama,
};
use reqwest::Url;

/// Ollama provider configuration
#[derive(Clone, Debug)]
pub struct OllamaConfig {
    /// Ollama host URL
    pub host: String,

    /// Ollama port
    pub port: u16,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost".into(),
            port: 11434,
            timeout_secs: 120,
        }
    }
}

impl OllamaConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost".into());
        let port = std::env::var("OLLAMA_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(11434);

        Self {
            host,
            port,
            ..Default::default()
        }
    }

    /// Host must be an absolute http(s) URL that can carry a port
    fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.host)
            .map_err(|e| AgentError::Config(format!("invalid OLLAMA_HOST '{}': {e}", self.host)))?;

        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(AgentError::Config(format!(
                "OLLAMA_HOST must be an http(s) URL, got '{}'",
                self.host
            )));
        }
        Ok(())
    }
}

/// Ollama LLM provider
pub struct OllamaProvider {
    client: Ollama,
    config: OllamaConfig,
}

impl OllamaProvider {
    /// Create a new Ollama provider with custom host/port
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self> {
        Self::from_config(OllamaConfig {
            host: host.into(),
            port,
            ..Default::default()
        })
    }

    /// Create from configuration
    pub fn from_config(config: OllamaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: Ollama::new(config.host.as_str(), config.port),
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(OllamaConfig::from_env())
    }

    /// Create with default localhost settings
    pub fn localhost() -> Result<Self> {
        Self::from_config(OllamaConfig::default())
    }

    pub const fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Build Ollama generation options
    fn build_options(opts: &GenerationOptions) -> OllamaOptions {
        OllamaOptions::default()
            .temperature(opts.temperature)
            .num_predict(i32::try_from(opts.max_tokens).unwrap_or(i32::MAX))
            .stop(opts.stop_sequences.clone())
    }

    fn convert_completion(response: GenerationResponse, model: &str) -> Completion {
        Completion {
            content: response.response,
            model: model.to_string(),
            usage: None,
        }
    }

    /// Bound a backend call by the configured timeout
    async fn bounded<T, E, F>(&self, call: F) -> Result<T>
    where
        F: std::future::Future<Output = std::result::Result<T, E>>,
        E: std::fmt::Display,
    {
        let limit = Duration::from_secs(self.config.timeout_secs);
        match tokio::time::timeout(limit, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AgentError::ModelUnavailable(format!("Ollama: {e}"))),
            Err(_) => Err(AgentError::ModelUnavailable(format!(
                "Ollama did not answer within {limit:?}"
            ))),
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn health_check(&self) -> Result<bool> {
        match self.bounded(self.client.list_local_models()).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<Completion> {
        let request = GenerationRequest::new(options.model.clone(), prompt.to_owned())
            .options(Self::build_options(options));
        let response = self.bounded(self.client.generate(request)).await?;

        Ok(Self::convert_completion(response, &options.model))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let models = self.bounded(self.client.list_local_models()).await?;

        Ok(models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name.clone(),
                name: m.name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = OllamaConfig::default();
        assert_eq!(config.host, "http://localhost");
        assert_eq!(config.port, 11434);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_host_is_config_error() {
        for host in ["localhost:11434", "mailto:ops@example.com", "ftp://models"] {
            let err = OllamaProvider::new(host, 11434).err();
            assert!(
                matches!(err, Some(AgentError::Config(_))),
                "{host} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_model_unavailable() {
        let provider = OllamaProvider::new("http://127.0.0.1", 9).unwrap();
        let err = provider
            .complete("oi", &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert!(!provider.health_check().await.unwrap());
    }
}

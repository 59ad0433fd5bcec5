//! OpenAI-compatible Provider
//!
//! Sends the whole ReAct prompt as a single user message to a
//! `/chat/completions` endpoint. Works with OpenAI and any compatible server.

use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    provider::{Completion, GenerationOptions, LlmProvider, ModelInfo, TokenUsage},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::http;

/// OpenAI provider configuration
#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,

    /// API root, e.g. `https://api.openai.com/v1`
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".into(),
            timeout_secs: 60,
        }
    }

    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AgentError::Config("OPENAI_API_KEY is not set".into()))?;

        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// OpenAI chat-completions provider
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    pub fn from_config(config: OpenAiConfig) -> Result<Self> {
        Ok(Self {
            client: http::client(Duration::from_secs(config.timeout_secs))?,
            config,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(OpenAiConfig::from_env()?)
    }

    fn build_request<'a>(prompt: &'a str, options: &'a GenerationOptions) -> ChatRequest<'a> {
        ChatRequest {
            model: &options.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            // the API accepts at most four stop sequences
            stop: (!options.stop_sequences.is_empty())
                .then(|| &options.stop_sequences[..options.stop_sequences.len().min(4)]),
        }
    }

    fn convert_completion(response: ChatResponse) -> Result<Completion> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AgentError::Provider("completion has no choices".into()))?;

        Ok(Completion {
            content,
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<Completion> {
        let response = self
            .client
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&Self::build_request(prompt, options))
            .send()
            .await
            .map_err(|e| http::transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http::status_error(status, &body));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("invalid OpenAI response: {e}")))?;

        Self::convert_completion(body)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self
            .client
            .get(self.config.endpoint("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| http::transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(http::status_error(status, &body));
        }

        let models: ModelsResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("invalid OpenAI response: {e}")))?;

        Ok(models
            .data
            .into_iter()
            .map(|m| ModelInfo {
                name: m.id.clone(),
                id: m.id,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join() {
        let mut config = OpenAiConfig::new("sk-test");
        config.base_url = "http://localhost:8080/v1/".into();
        assert_eq!(
            config.endpoint("chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
        assert!(!format!("{config:?}").contains("sk-test"));
    }

    #[test]
    fn test_request_shape() {
        let options = GenerationOptions::default();
        let json = serde_json::to_value(OpenAiProvider::build_request("Question: oi", &options)).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Question: oi");
        assert_eq!(json["stop"][0], "\nObservation:");
    }

    #[test]
    fn test_empty_choices_is_provider_error() {
        let response: ChatResponse =
            serde_json::from_str(r#"{"model":"gpt-4o-mini","choices":[]}"#).unwrap();
        assert!(matches!(
            OpenAiProvider::convert_completion(response),
            Err(AgentError::Provider(_))
        ));
    }

    #[test]
    fn test_completion_conversion() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"model":"gpt-4o-mini","choices":[{"index":0,"message":{"role":"assistant","content":"Final Answer: 3"}}],
               "usage":{"prompt_tokens":7,"completion_tokens":3,"total_tokens":10}}"#,
        )
        .unwrap();

        let completion = OpenAiProvider::convert_completion(response).unwrap();
        assert_eq!(completion.content, "Final Answer: 3");
        assert_eq!(completion.usage.unwrap().total_tokens, 10);
    }
}

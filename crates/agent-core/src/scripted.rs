//! Scripted Provider
//!
//! Deterministic `LlmProvider` that replays a fixed queue of responses and
//! records every prompt it was given. Used by tests and offline demos.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AgentError, Result};
use crate::provider::{Completion, GenerationOptions, LlmProvider, ModelInfo};

/// Replays canned responses in order
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    #[must_use]
    pub fn then(self, response: impl Into<String>) -> Self {
        self.push(Ok(response.into()));
        self
    }

    /// Queue a failure
    #[must_use]
    pub fn then_fail(self, error: AgentError) -> Self {
        self.push(Err(error));
        self
    }

    fn push(&self, item: Result<String>) {
        self.responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push_back(item);
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Number of `complete` calls so far
    pub fn calls(&self) -> usize {
        self.prompts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(&self, prompt: &str, options: &GenerationOptions) -> Result<Completion> {
        self.prompts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(prompt.to_string());

        let next = self
            .responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front();

        match next {
            Some(Ok(content)) => Ok(Completion::text(content, &options.model)),
            Some(Err(err)) => Err(err),
            None => Err(AgentError::ModelUnavailable("script exhausted".into())),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: "scripted".into(),
            name: "scripted".into(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order() {
        let provider = ScriptedProvider::new(["um"])
            .then_fail(AgentError::RateLimited("429".into()))
            .then("dois");
        let opts = GenerationOptions::default();

        assert_eq!(provider.complete("p1", &opts).await.unwrap().content, "um");
        assert!(matches!(
            provider.complete("p2", &opts).await,
            Err(AgentError::RateLimited(_))
        ));
        assert_eq!(provider.complete("p3", &opts).await.unwrap().content, "dois");
        assert!(matches!(
            provider.complete("p4", &opts).await,
            Err(AgentError::ModelUnavailable(_))
        ));
        assert_eq!(provider.prompts(), vec!["p1", "p2", "p3", "p4"]);
    }
}

//! Runtime settings
//!
//! Resolved from CLI flags, which fall back to environment variables (and a
//! `.env` file loaded before parsing). Backend connection details stay with
//! the providers: `OLLAMA_HOST`/`OLLAMA_PORT` and `OPENAI_API_KEY`/`OPENAI_BASE_URL`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use agent_core::{AgentConfig, EarlyStopping, LlmProvider};
use agent_runtime::{OllamaProvider, OpenAiProvider};
use clap::ValueEnum;

use crate::Args;

/// Model backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    #[value(name = "openai")]
    OpenAi,
    #[value(name = "ollama")]
    Ollama,
}

impl ProviderKind {
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Ollama => "llama3.2",
        }
    }

    /// Connect using the backend's own environment variables
    pub fn connect(self) -> agent_core::Result<Arc<dyn LlmProvider>> {
        let provider: Arc<dyn LlmProvider> = match self {
            Self::OpenAi => Arc::new(OpenAiProvider::from_env()?),
            Self::Ollama => Arc::new(OllamaProvider::from_env()?),
        };
        Ok(provider)
    }
}

/// Everything the binary needs to build the agent
#[derive(Clone, Debug)]
pub struct Settings {
    pub provider: ProviderKind,
    pub model: String,
    pub data_path: PathBuf,
    pub max_iterations: usize,
    pub run_timeout: Option<Duration>,
    pub early_stopping: EarlyStopping,
}

impl Settings {
    pub fn from_args(args: &Args) -> anyhow::Result<Self> {
        anyhow::ensure!(args.max_iterations > 0, "max iterations must be at least 1");

        Ok(Self {
            provider: args.provider,
            model: args
                .model
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| args.provider.default_model().to_string()),
            data_path: args.data.clone(),
            max_iterations: args.max_iterations,
            run_timeout: args
                .timeout_secs
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs),
            early_stopping: if args.summarize_on_limit {
                EarlyStopping::Generate
            } else {
                EarlyStopping::Fail
            },
        })
    }

    pub fn agent_config(&self) -> AgentConfig {
        let mut config = AgentConfig {
            system_prompt: sales_analytics::SALES_ANALYST_PROMPT.into(),
            max_iterations: self.max_iterations,
            early_stopping: self.early_stopping,
            run_timeout: self.run_timeout,
            ..AgentConfig::default()
        };
        config.generation.model.clone_from(&self.model);
        config
    }
}

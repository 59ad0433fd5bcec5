//! # agent-runtime
//!
//! Model backends for the sales agent.
//!
//! ## Providers
//!
//! - **OpenAI** (default for the CLI): any `/chat/completions` compatible API
//! - **Ollama**: local inference through `ollama-rs`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::OllamaProvider;
//!
//! let provider = OllamaProvider::new("http://localhost", 11434)?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

#[cfg(feature = "openai")]
mod http;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "ollama")]
pub use ollama::{OllamaConfig, OllamaProvider};

#[cfg(feature = "openai")]
pub use openai::{OpenAiConfig, OpenAiProvider};

// Re-export core types for convenience
pub use agent_core::{Agent, AgentError, LlmProvider, Result, Session, Tool, ToolRegistry};

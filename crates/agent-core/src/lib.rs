//! # agent-core
//!
//! ReAct agent core: a text-protocol reasoning loop that alternates model
//! calls and tool calls until the model produces a final answer.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Session                              │
//! │   Transcript (append-only)                                   │
//! │  ┌──────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning   │  │    Tool     │  │   LlmProvider       │  │
//! │  │    Loop      │──│  Registry   │  │   (Strategy)        │  │
//! │  └──────┬───────┘  └─────────────┘  └─────────────────────┘  │
//! │         └── Protocol parser (Thought / Action / Final Answer)│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `LlmProvider` trait enables swapping between Ollama, OpenAI, or a
//! scripted test double without changing agent logic.

pub mod error;
pub mod protocol;
pub mod provider;
pub mod reasoning;
pub mod scripted;
pub mod session;
pub mod tool;
pub mod transcript;

pub use error::{AgentError, Result};
pub use protocol::ParseError;
pub use provider::{GenerationOptions, LlmProvider, RetryPolicy};
pub use reasoning::{Agent, AgentBuilder, AgentConfig, AgentRunResult, EarlyStopping};
pub use scripted::ScriptedProvider;
pub use session::{Session, SessionId};
pub use tool::{FnTool, Tool, ToolError, ToolRegistry};
pub use transcript::{Step, Transcript, Turn};

/// Re-exported so callers can cancel runs without depending on tokio-util
pub use tokio_util::sync::CancellationToken;

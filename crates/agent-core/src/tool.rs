//! Tool System
//!
//! Tools are named, synchronous, side-effect-free capabilities the model can
//! request by name. Every tool takes the raw `Action Input` text and returns
//! the observation text, or a [`ToolError`] that the reasoning loop turns into
//! an observation.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::error::{AgentError, Result};

/// Failure raised by a tool invocation. Always recoverable from the loop's side.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Action Input could not be interpreted
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Tool ran but could not produce a result
    #[error("execution failed: {0}")]
    Execution(String),
}

/// Tool trait - implement to add new capabilities
pub trait Tool: Send + Sync {
    /// Unique tool identifier, as the model writes it after `Action:`
    fn name(&self) -> &str;

    /// Human-readable description (shown to the model)
    fn description(&self) -> &str;

    /// Run the tool against the raw Action Input text
    fn invoke(&self, input: &str) -> std::result::Result<String, ToolError>;
}

type ToolFn = dyn Fn(&str) -> std::result::Result<String, ToolError> + Send + Sync;

/// Adapter turning a closure into a [`Tool`]
pub struct FnTool {
    name: String,
    description: String,
    func: Box<ToolFn>,
}

impl FnTool {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<String, ToolError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            func: Box::new(func),
        }
    }
}

impl fmt::Debug for FnTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn invoke(&self, input: &str) -> std::result::Result<String, ToolError> {
        (self.func)(input)
    }
}

/// Registry for available tools.
///
/// Tools are kept in registration order; the name index points into that
/// arena. The agent only ever sees the registry behind an `Arc`, so it is
/// frozen once construction is over.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a shared tool
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(AgentError::DuplicateTool(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Register a closure as a tool
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        func: F,
    ) -> Result<()>
    where
        F: Fn(&str) -> std::result::Result<String, ToolError> + Send + Sync + 'static,
    {
        self.register(FnTool::new(name, description, func))
    }

    /// Get a tool by name
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.tools[i]))
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))
    }

    /// `(name, description)` pairs in registration order
    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.tools.iter().map(|t| (t.name(), t.description()))
    }

    /// Tool names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.list().map(|(name, _)| name).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool catalogue section of the system prompt
    pub fn catalogue(&self) -> String {
        let mut section = String::from("Ferramentas disponíveis:\n");
        for (name, description) in self.list() {
            section.push_str("- ");
            section.push_str(name);
            section.push_str(": ");
            section.push_str(description.trim());
            section.push('\n');
        }
        section
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) dispatch loop:
//!
//! ```text
//! AWAITING_MODEL ──► PARSING ──► DISPATCHING_TOOL ──┐
//!       ▲                 │                          │
//!       │                 └──► TERMINAL              │
//!       └────────────────────────────────────────────┘
//! ```
//!
//! Every model round sees the system prompt, the tool catalogue and the whole
//! transcript. Protocol errors, unknown tools and tool failures all come back
//! to the model as observations; only transport failures, exhaustion,
//! cancellation and timeouts end a run with an error.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{AgentError, Result};
use crate::protocol;
use crate::provider::{Completion, GenerationOptions, LlmProvider, RetryPolicy};
use crate::tool::{Tool, ToolRegistry};
use crate::transcript::{Step, Transcript, Turn};

/// Observation sent back when a response could not be parsed
pub const FORMAT_REMINDER: &str = "Resposta fora do formato. Responda EXATAMENTE com \
'Thought:', 'Action:' e 'Action Input:' para usar uma ferramenta, ou com \
'Final Answer:' para encerrar.";

/// Observation closing the last turn when the iteration cap stops the run
pub const CAP_OBSERVATION: &str = "Limite de passos atingido; ferramenta não executada.";

/// Instruction appended for the forced-summary round of [`EarlyStopping::Generate`]
pub const FORCE_FINAL_PROMPT: &str = "Limite de passos atingido. Não use mais ferramentas. \
Com base apenas nas observações acima, responda agora no formato 'Final Answer: <resposta>'.";

/// What to do when the iteration cap is reached without a final answer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyStopping {
    /// Fail with `MaxIterationsExceeded` and the partial transcript
    #[default]
    Fail,
    /// Make exactly one more model call asking for a summary answer
    Generate,
}

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Fixed instruction text placed before the tool catalogue
    pub system_prompt: String,

    /// Maximum model rounds per `ask`
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Retry policy for transport failures
    pub retry: RetryPolicy,

    pub early_stopping: EarlyStopping,

    /// Wall-clock bound for a whole `ask`
    pub run_timeout: Option<Duration>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 10,
            generation: GenerationOptions::default(),
            retry: RetryPolicy::default(),
            early_stopping: EarlyStopping::default(),
            run_timeout: None,
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r"Você é um assistente que responde usando ferramentas.

Siga EXATAMENTE este formato:
Thought: <seu raciocínio curto>
Action: <nome_da_ferramenta ou None>
Action Input: <texto ou string vazia>
Observation: <resultado da ferramenta>
... (repita Thought/Action/Action Input/Observation quando precisar)
Final Answer: <resposta final. AO FINAL, cite explicitamente quais ferramentas você utilizou.>";

/// Outcome of a successful run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRunResult {
    pub final_answer: String,
    /// Every tool invoked, in call order, duplicates kept
    pub tools_invoked: Vec<String>,
    /// Model rounds used
    pub iterations: usize,
}

/// The main Agent struct
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(provider: Arc<dyn LlmProvider>, tools: Arc<ToolRegistry>) -> Self {
        Self::new(provider, tools, AgentConfig::default())
    }

    /// Full prompt for the next model round; a pure function of the transcript
    pub fn build_prompt(&self, transcript: &Transcript) -> String {
        let mut prompt = self.config.system_prompt.trim().to_string();

        if !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.catalogue());
        }

        prompt.push_str("\n\n");
        prompt.push_str(&transcript.render());
        prompt.push('\n');
        prompt
    }

    /// Answer `question` on a fresh transcript
    pub async fn ask(&self, question: &str) -> Result<AgentRunResult> {
        let mut transcript = Transcript::new();
        self.run(&mut transcript, question, &CancellationToken::new())
            .await
    }

    /// Append `question` to `transcript` and drive the loop to a final answer.
    ///
    /// Turns are appended as they complete, so on error the transcript still
    /// holds everything the model saw.
    pub async fn run(
        &self,
        transcript: &mut Transcript,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<AgentRunResult> {
        match self.config.run_timeout {
            Some(limit) => tokio::time::timeout(limit, self.run_loop(transcript, question, cancel))
                .await
                .map_err(|_| AgentError::Timeout(limit))?,
            None => self.run_loop(transcript, question, cancel).await,
        }
    }

    async fn run_loop(
        &self,
        transcript: &mut Transcript,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<AgentRunResult> {
        transcript.push_question(question);

        let max = self.config.max_iterations.max(1);
        let mut tools_invoked = Vec::new();
        let mut iteration = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(AgentError::Cancelled);
            }
            iteration += 1;

            let prompt = self.build_prompt(transcript);
            tracing::debug!(iteration, prompt_len = prompt.len(), "Awaiting model");
            let completion = self.call_model(&prompt, cancel).await?;

            let turn = match protocol::parse(&completion.content) {
                Ok(turn) => turn,
                Err(err) => {
                    tracing::warn!(iteration, error = %err, "Malformed model response");
                    Turn::malformed(completion.content)
                }
            };

            let observation = match &turn.step {
                Step::Finish { answer } => {
                    let final_answer = answer.clone();
                    transcript.append_turn(turn);
                    tracing::debug!(iteration, tools = ?tools_invoked, "Final answer");
                    return Ok(AgentRunResult {
                        final_answer,
                        tools_invoked,
                        iterations: iteration,
                    });
                }
                _ if iteration >= max => {
                    let closing = match turn.step {
                        Step::Act { .. } => CAP_OBSERVATION,
                        _ => FORMAT_REMINDER,
                    };
                    transcript.append_turn(turn.with_observation(closing));
                    return self
                        .stop_early(transcript, tools_invoked, iteration, cancel)
                        .await;
                }
                Step::Act { tool, input } => {
                    if cancel.is_cancelled() {
                        return Err(AgentError::Cancelled);
                    }
                    self.dispatch(tool, input, &mut tools_invoked)
                }
                Step::Malformed { .. } => FORMAT_REMINDER.to_string(),
            };

            transcript.append_turn(turn.with_observation(observation));
        }
    }

    /// Model call with bounded exponential backoff on retryable failures
    async fn call_model(&self, prompt: &str, cancel: &CancellationToken) -> Result<Completion> {
        let mut attempt = 1;

        loop {
            match self.provider.complete(prompt, &self.config.generation).await {
                Ok(completion) => return Ok(completion),
                Err(err) if err.is_retryable() && attempt < self.config.retry.max_attempts => {
                    let delay = self.config.retry.backoff(attempt);
                    tracing::warn!(
                        provider = self.provider.name(),
                        attempt,
                        ?delay,
                        error = %err,
                        "Model call failed, retrying"
                    );
                    tokio::select! {
                        () = cancel.cancelled() => return Err(AgentError::Cancelled),
                        () = tokio::time::sleep(delay) => {}
                    }
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(provider = self.provider.name(), attempt, error = %err, "Model call failed");
                    return Err(err);
                }
            }
        }
    }

    /// Run one tool request and produce its observation
    fn dispatch(&self, tool: &str, input: &str, tools_invoked: &mut Vec<String>) -> String {
        let handle = match self.tools.lookup(tool) {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!(tool, error = %err, "Model requested an unknown tool");
                return format!(
                    "A ferramenta '{tool}' não existe. Ferramentas disponíveis: {}. \
                     Use exatamente um destes nomes em 'Action:'.",
                    self.tools.names().join(", ")
                );
            }
        };

        tools_invoked.push(tool.to_string());
        tracing::debug!(tool, input, "Invoking tool");

        match handle.invoke(input) {
            Ok(output) if output.trim().is_empty() => "(sem resultado)".to_string(),
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(tool, error = %err, "Tool failed");
                format!("Erro ao executar '{tool}': {err}")
            }
        }
    }

    async fn stop_early(
        &self,
        transcript: &mut Transcript,
        tools_invoked: Vec<String>,
        iteration: usize,
        cancel: &CancellationToken,
    ) -> Result<AgentRunResult> {
        tracing::warn!(iteration, strategy = ?self.config.early_stopping, "Iteration cap reached");

        match self.config.early_stopping {
            EarlyStopping::Fail => Err(AgentError::MaxIterationsExceeded {
                max: self.config.max_iterations,
                transcript: transcript.render(),
            }),
            EarlyStopping::Generate => {
                if cancel.is_cancelled() {
                    return Err(AgentError::Cancelled);
                }
                let mut prompt = self.build_prompt(transcript);
                prompt.push('\n');
                prompt.push_str(FORCE_FINAL_PROMPT);
                prompt.push('\n');

                let completion = self.call_model(&prompt, cancel).await?;
                let final_answer = match protocol::parse(&completion.content) {
                    Ok(Turn {
                        step: Step::Finish { answer },
                        ..
                    }) => answer,
                    _ => completion.content.trim().to_string(),
                };
                transcript.append_turn(Turn::finish(final_answer.clone()));

                Ok(AgentRunResult {
                    final_answer,
                    tools_invoked,
                    iterations: iteration + 1,
                })
            }
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get the provider
    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
    error: Option<AgentError>,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
            error: None,
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Register one tool; a duplicate name is reported by [`build`](Self::build)
    #[must_use]
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        if let Err(err) = self.tools.register(tool) {
            self.error.get_or_insert(err);
        }
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    #[must_use]
    pub const fn early_stopping(mut self, early_stopping: EarlyStopping) -> Self {
        self.config.early_stopping = early_stopping;
        self
    }

    #[must_use]
    pub const fn run_timeout(mut self, limit: Duration) -> Self {
        self.config.run_timeout = Some(limit);
        self
    }

    pub fn build(self) -> Result<Agent> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedProvider;
    use crate::tool::ToolError;

    fn agent_with(provider: Arc<ScriptedProvider>, max_iterations: usize) -> Agent {
        AgentBuilder::new()
            .provider(provider)
            .tool(crate::tool::FnTool::new("dobro", "Dobra um número", |input| {
                input
                    .trim()
                    .parse::<i64>()
                    .map(|n| (n * 2).to_string())
                    .map_err(|e| ToolError::InvalidInput(e.to_string()))
            }))
            .max_iterations(max_iterations)
            .retry(RetryPolicy::none())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_tool_error_becomes_observation() {
        let provider = Arc::new(ScriptedProvider::new([
            "Action: dobro\nAction Input: abc",
            "Final Answer: não consegui. Ferramentas utilizadas: dobro",
        ]));
        let agent = agent_with(provider.clone(), 5);

        let mut transcript = Transcript::new();
        let result = agent
            .run(&mut transcript, "dobro de abc?", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.tools_invoked, vec!["dobro"]);
        let first = transcript.turns().next().unwrap();
        assert!(first
            .observation
            .as_deref()
            .unwrap()
            .starts_with("Erro ao executar 'dobro': invalid input"));
    }

    #[tokio::test]
    async fn test_malformed_response_gets_reminder() {
        let provider = Arc::new(ScriptedProvider::new([
            "Acho que a resposta é 4.",
            "Thought: agora no formato\nFinal Answer: 4",
        ]));
        let agent = agent_with(provider.clone(), 5);

        let result = agent.ask("2+2?").await.unwrap();

        assert_eq!(result.final_answer, "4");
        assert!(result.tools_invoked.is_empty());
        assert_eq!(result.iterations, 2);
        assert!(provider.prompts()[1].contains(FORMAT_REMINDER));
    }

    #[tokio::test]
    async fn test_prompt_grows_monotonically() {
        let provider = Arc::new(ScriptedProvider::new([
            "Action: dobro\nAction Input: 2",
            "Action: dobro\nAction Input: 4",
            "Final Answer: 8",
        ]));
        let agent = agent_with(provider.clone(), 5);

        agent.ask("dobro do dobro de 2?").await.unwrap();

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 3);
        for pair in prompts.windows(2) {
            assert!(pair[1].starts_with(pair[0].trim_end()));
            assert!(pair[1].len() > pair[0].len());
        }
    }

    #[tokio::test]
    async fn test_generate_early_stopping_forces_summary() {
        let provider = Arc::new(ScriptedProvider::new([
            "Action: dobro\nAction Input: 2",
            "Final Answer: o dobro é 4",
        ]));
        let agent = AgentBuilder::new()
            .provider(provider.clone())
            .tool(crate::tool::FnTool::new("dobro", "d", |_| Ok("4".into())))
            .max_iterations(1)
            .early_stopping(EarlyStopping::Generate)
            .build()
            .unwrap();

        let result = agent.ask("dobro de 2?").await.unwrap();

        assert_eq!(result.final_answer, "o dobro é 4");
        assert!(result.tools_invoked.is_empty());
        assert_eq!(provider.calls(), 2);
        assert!(provider.prompts()[1].contains(FORCE_FINAL_PROMPT));
        assert!(provider.prompts()[1].contains(CAP_OBSERVATION));
    }

    #[tokio::test]
    async fn test_builder_reports_duplicate_tool() {
        let result = AgentBuilder::new()
            .provider(Arc::new(ScriptedProvider::default()))
            .tool(crate::tool::FnTool::new("a", "", |_| Ok(String::new())))
            .tool(crate::tool::FnTool::new("a", "", |_| Ok(String::new())))
            .build();

        assert!(matches!(result, Err(AgentError::DuplicateTool(name)) if name == "a"));
    }

    #[test]
    fn test_builder_requires_provider() {
        assert!(matches!(AgentBuilder::new().build(), Err(AgentError::Config(_))));
    }
}

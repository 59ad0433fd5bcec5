//! Conversation Transcript
//!
//! The append-only record replayed to the model on every iteration: user
//! questions interleaved with the reasoning turns they produced.

use serde::{Deserialize, Serialize};

use crate::protocol::{ACTION, ACTION_INPUT, FINAL_ANSWER, OBSERVATION, THOUGHT};

/// Prefix for user questions in the rendered transcript
pub const QUESTION: &str = "Question:";

/// What a single model response resolved to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Tool request; `input` is the exact Action Input text (possibly empty)
    Act { tool: String, input: String },
    /// Terminal answer
    Finish { answer: String },
    /// Response the parser rejected, kept verbatim
    Malformed { raw: String },
}

/// One reasoning step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub thought: Option<String>,
    pub step: Step,
    pub observation: Option<String>,
}

impl Turn {
    pub const fn new(thought: Option<String>, step: Step) -> Self {
        Self {
            thought,
            step,
            observation: None,
        }
    }

    pub fn act(tool: impl Into<String>, input: impl Into<String>) -> Self {
        Self::new(
            None,
            Step::Act {
                tool: tool.into(),
                input: input.into(),
            },
        )
    }

    pub fn finish(answer: impl Into<String>) -> Self {
        Self::new(
            None,
            Step::Finish {
                answer: answer.into(),
            },
        )
    }

    pub fn malformed(raw: impl Into<String>) -> Self {
        Self::new(None, Step::Malformed { raw: raw.into() })
    }

    #[must_use]
    pub fn with_thought(mut self, thought: impl Into<String>) -> Self {
        self.thought = Some(thought.into());
        self
    }

    #[must_use]
    pub fn with_observation(mut self, observation: impl Into<String>) -> Self {
        self.observation = Some(observation.into());
        self
    }

    pub const fn is_final(&self) -> bool {
        matches!(self.step, Step::Finish { .. })
    }

    /// Complete once observed or terminal
    pub const fn is_complete(&self) -> bool {
        self.observation.is_some() || self.is_final()
    }

    /// Final answer text, if this turn is terminal
    pub fn final_answer(&self) -> Option<&str> {
        match &self.step {
            Step::Finish { answer } => Some(answer),
            _ => None,
        }
    }

    /// The model-side text of this turn, in protocol format
    pub fn render_response(&self) -> String {
        let mut out = String::new();
        if let Some(thought) = &self.thought {
            push_field(&mut out, THOUGHT, thought);
        }
        match &self.step {
            Step::Act { tool, input } => {
                push_field(&mut out, ACTION, tool);
                push_field(&mut out, ACTION_INPUT, input);
            }
            Step::Finish { answer } => push_field(&mut out, FINAL_ANSWER, answer),
            Step::Malformed { raw } => {
                out.push_str(raw.trim());
                out.push('\n');
            }
        }
        out.truncate(out.trim_end().len());
        out
    }

    /// Model-side text followed by the observation, if any
    pub fn render(&self) -> String {
        let mut out = self.render_response();
        if let Some(observation) = &self.observation {
            if !out.is_empty() {
                out.push('\n');
            }
            push_field(&mut out, OBSERVATION, observation);
            out.truncate(out.trim_end().len());
        }
        out
    }
}

fn push_field(out: &mut String, prefix: &str, value: &str) {
    out.push_str(prefix);
    if !value.is_empty() {
        out.push(' ');
        out.push_str(value);
    }
    out.push('\n');
}

/// A transcript entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entry {
    Question { text: String },
    Turn { turn: Turn },
}

impl Entry {
    fn render(&self) -> String {
        match self {
            Self::Question { text } => format!("{QUESTION} {}", text.trim()),
            Self::Turn { turn } => turn.render(),
        }
    }
}

/// Append-only conversation transcript
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new top-level question; prior turns stay visible
    pub fn push_question(&mut self, question: impl Into<String>) {
        self.entries.push(Entry::Question {
            text: question.into(),
        });
    }

    /// Record a reasoning turn
    pub fn append_turn(&mut self, turn: Turn) {
        self.entries.push(Entry::Turn { turn });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// All turns, across every question
    pub fn turns(&self) -> impl Iterator<Item = &Turn> + '_ {
        self.entries.iter().filter_map(|e| match e {
            Entry::Turn { turn } => Some(turn),
            Entry::Question { .. } => None,
        })
    }

    /// All questions asked so far, oldest first
    pub fn questions(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().filter_map(|e| match e {
            Entry::Question { text } => Some(text.as_str()),
            Entry::Turn { .. } => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact text sent to the model; a pure function of the entries
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(Entry::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

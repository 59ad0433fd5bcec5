//! Session Management
//!
//! A session is one long-lived conversation: an agent plus the transcript
//! that every follow-up question is appended to. Asks on the same session are
//! serialized by the transcript lock so turns never interleave.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::Result;
use crate::reasoning::{Agent, AgentRunResult};
use crate::transcript::Transcript;

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct SessionState {
    transcript: Transcript,
    updated_at: DateTime<Utc>,
    questions: usize,
}

/// A conversation with cross-question memory
pub struct Session {
    id: SessionId,
    agent: Arc<Agent>,
    state: Mutex<SessionState>,
    created_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session
    pub fn new(agent: Arc<Agent>) -> Self {
        Self::with_id(SessionId::new(), agent)
    }

    /// Create with specific ID
    pub fn with_id(id: SessionId, agent: Arc<Agent>) -> Self {
        let now = Utc::now();
        Self {
            id,
            agent,
            state: Mutex::new(SessionState {
                transcript: Transcript::new(),
                updated_at: now,
                questions: 0,
            }),
            created_at: now,
        }
    }

    /// Ask a question; earlier questions and turns stay visible to the model
    pub async fn ask(&self, question: &str) -> Result<AgentRunResult> {
        self.ask_with_cancel(question, &CancellationToken::new())
            .await
    }

    /// Ask with a caller-owned cancellation token
    pub async fn ask_with_cancel(
        &self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<AgentRunResult> {
        let mut state = self.state.lock().await;
        state.questions += 1;
        state.updated_at = Utc::now();

        tracing::info!(session = %self.id, question_no = state.questions, "New question");
        let result = self
            .agent
            .run(&mut state.transcript, question, cancel)
            .await;
        state.updated_at = Utc::now();
        result
    }

    /// Snapshot of the transcript
    pub async fn transcript(&self) -> Transcript {
        self.state.lock().await.transcript.clone()
    }

    /// Number of questions asked, including failed ones
    pub async fn question_count(&self) -> usize {
        self.state.lock().await.questions
    }

    /// Last activity timestamp
    pub async fn updated_at(&self) -> DateTime<Utc> {
        self.state.lock().await.updated_at
    }

    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}

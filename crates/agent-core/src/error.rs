//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// A tool with the same name is already registered
    #[error("Duplicate tool: {0}")]
    DuplicateTool(String),

    /// Tool not found in registry
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Model output carried neither an Action nor a Final Answer
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    /// Iteration cap reached before a Final Answer; carries the partial transcript
    #[error("Maximum iterations ({max}) reached without a final answer")]
    MaxIterationsExceeded { max: usize, transcript: String },

    /// Model backend unreachable or returned a server error
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Model backend rejected the request for rate limiting
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Model backend rejected the credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Model backend answered with something that is not a completion
    #[error("Provider error: {0}")]
    Provider(String),

    /// Run cancelled by the caller
    #[error("Run cancelled")]
    Cancelled,

    /// Run exceeded the configured wall-clock bound
    #[error("Run timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

}

impl AgentError {
    /// Check if error is retryable
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ModelUnavailable(_) | Self::RateLimited(_))
    }

    /// Transport-level failure talking to the model backend
    pub const fn is_model_unavailable(&self) -> bool {
        matches!(
            self,
            Self::ModelUnavailable(_) | Self::RateLimited(_) | Self::Auth(_)
        )
    }

    /// Partial transcript attached to an exhausted run
    pub fn transcript(&self) -> Option<&str> {
        match self {
            Self::MaxIterationsExceeded { transcript, .. } => Some(transcript),
            _ => None,
        }
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::ModelUnavailable(_) | Self::Provider(_) => {
                "O serviço de IA está indisponível no momento. Tente novamente.".into()
            }
            Self::RateLimited(_) => {
                "Muitas requisições ao serviço de IA. Aguarde um momento.".into()
            }
            Self::Auth(_) => "Falha de autenticação. Verifique a chave da API.".into(),
            Self::MaxIterationsExceeded { .. } => {
                "A pergunta exigiu passos demais. Tente uma pergunta mais simples.".into()
            }
            Self::MalformedResponse(_) => {
                "O modelo respondeu fora do formato esperado.".into()
            }
            Self::UnknownTool(name) => format!("A ferramenta '{name}' não está disponível."),
            Self::Cancelled => "Pergunta cancelada.".into(),
            Self::Timeout(_) => "A pergunta excedeu o tempo limite.".into(),
            _ => "Ocorreu um erro inesperado.".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(AgentError::ModelUnavailable("down".into()).is_retryable());
        assert!(AgentError::RateLimited("429".into()).is_retryable());
        assert!(!AgentError::Auth("401".into()).is_retryable());
        assert!(AgentError::Auth("401".into()).is_model_unavailable());
        assert!(!AgentError::Cancelled.is_retryable());
    }

    #[test]
    fn test_setup_errors_are_not_retryable() {
        for err in [
            AgentError::Config("missing key".into()),
            AgentError::DuplicateTool("soma".into()),
        ] {
            assert!(!err.is_retryable());
            assert!(!err.is_model_unavailable());
            assert_eq!(err.user_message(), "Ocorreu um erro inesperado.");
        }
    }

    #[test]
    fn test_transcript_only_on_exhaustion() {
        let err = AgentError::MaxIterationsExceeded {
            max: 2,
            transcript: "Question: x".into(),
        };
        assert_eq!(err.transcript(), Some("Question: x"));
        assert!(AgentError::Cancelled.transcript().is_none());
    }
}

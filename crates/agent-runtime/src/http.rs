//! Shared HTTP plumbing for the providers

use std::time::Duration;

use agent_core::AgentError;
use reqwest::{Client, StatusCode};

/// Build the pooled client a provider keeps for its lifetime
pub fn client(timeout: Duration) -> Result<Client, AgentError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AgentError::Config(format!("failed to build HTTP client: {e}")))
}

/// Map a transport error onto the agent's error taxonomy
pub fn transport_error(err: &reqwest::Error) -> AgentError {
    if let Some(status) = err.status() {
        return status_error(status, &err.to_string());
    }
    AgentError::ModelUnavailable(err.to_string())
}

/// Map a non-success HTTP status onto the agent's error taxonomy
pub fn status_error(status: StatusCode, body: &str) -> AgentError {
    let detail = format!("{status}: {}", body.trim());
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(detail),
        StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(detail),
        StatusCode::REQUEST_TIMEOUT => AgentError::ModelUnavailable(detail),
        s if s.is_server_error() => AgentError::ModelUnavailable(detail),
        _ => AgentError::Provider(detail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            AgentError::Auth(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            AgentError::RateLimited(_)
        ));
        assert!(status_error(StatusCode::BAD_GATEWAY, "").is_retryable());
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "bad model"),
            AgentError::Provider(msg) if msg.contains("bad model")
        ));
    }
}

//! Error handling for the agent core
//!
//! This module provides the error taxonomy shared by every layer:
//! - Configuration errors are fatal and never retried
//! - Transport errors (network, timeout, rate limit, upstream service) are
//!   retried by the resilience layer and finally degraded to a user-facing
//!   apology by the response parser
//! - Validation errors block a submission before any network call
//!
//! Errors can carry an [`ErrorContext`] describing where they happened.

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub mod mapping;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Main error type for the agent core
#[derive(Error, Debug)]
pub enum AgentError {
    /// Missing or invalid configuration (e.g. no API key)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network or connection errors
    #[error("Network error: {0}")]
    Network(String),

    /// Request or attempt exceeded its time budget
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Upstream rejected the credentials
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Upstream quota exhausted
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Upstream returned an error status
    #[error("Service error: {0}")]
    Service(String),

    /// Upstream payload could not be decoded
    #[error("Parsing error: {0}")]
    Parsing(String),

    /// Upstream returned no text at all
    #[error("Empty response from generation service")]
    EmptyResponse,

    /// Caller supplied invalid input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A generation call is already pending for this session
    #[error("A turn is already in flight for session {0}")]
    TurnInFlight(String),

    /// Errors with additional context
    #[error("{inner}")]
    WithContext {
        inner: Box<AgentError>,
        context: ErrorContext,
    },
}

impl AgentError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        AgentError::Configuration(message.into())
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        AgentError::Network(message.into())
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        AgentError::Timeout(message.into())
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        AgentError::Authentication(message.into())
    }

    /// Create a rate limit error
    pub fn rate_limit(message: impl Into<String>) -> Self {
        AgentError::RateLimit(message.into())
    }

    /// Create an upstream service error
    pub fn service(message: impl Into<String>) -> Self {
        AgentError::Service(message.into())
    }

    /// Create a parsing error
    pub fn parsing(message: impl Into<String>) -> Self {
        AgentError::Parsing(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        AgentError::Validation(message.into())
    }

    /// Add context to an existing error
    pub fn with_context(self, context: ErrorContext) -> Self {
        AgentError::WithContext {
            inner: Box::new(self),
            context,
        }
    }

    /// Add a single context key/value to an existing error
    pub fn with_context_value(self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        let mut context = ErrorContext::new();
        context.add(key, value);
        self.with_context(context)
    }

    /// The innermost error, with any context layers removed
    pub fn root(&self) -> &AgentError {
        match self {
            AgentError::WithContext { inner, .. } => inner.root(),
            other => other,
        }
    }

    /// Get the service name if available
    pub fn service_name(&self) -> Option<&str> {
        match self {
            AgentError::WithContext { context, .. } => Some(&context.service),
            _ => None,
        }
    }

    /// Get the HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AgentError::WithContext { context, inner } => {
                context.status_code.or_else(|| inner.status_code())
            }
            _ => None,
        }
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::Network(_) => true,
            AgentError::Timeout(_) => true,
            AgentError::RateLimit(_) => true,
            AgentError::Service(_) => true,
            AgentError::WithContext { inner, .. } => inner.is_retryable(),
            _ => false,
        }
    }

    /// Fatal errors must reach the caller instead of being degraded to text
    pub fn is_fatal(&self) -> bool {
        matches!(self.root(), AgentError::Configuration(_))
    }

    /// Anything that went wrong talking to the remote service
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self.root(),
            AgentError::Network(_)
                | AgentError::Timeout(_)
                | AgentError::Authentication(_)
                | AgentError::RateLimit(_)
                | AgentError::Service(_)
                | AgentError::Parsing(_)
                | AgentError::EmptyResponse
        )
    }
}

/// Error context information
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Service that generated the error
    pub service: String,

    /// When the error was recorded
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,

    /// HTTP status code if applicable
    pub status_code: Option<u16>,

    /// Upstream status string (e.g. "INVALID_ARGUMENT")
    pub error_code: Option<String>,

    /// Endpoint that was called
    pub endpoint: Option<String>,

    /// Additional context data
    pub data: HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            service: "unknown".to_string(),
            timestamp: Some(chrono::Utc::now()),
            status_code: None,
            error_code: None,
            endpoint: None,
            data: HashMap::new(),
        }
    }
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new error context for a specific service
    pub fn for_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            ..Self::default()
        }
    }

    pub fn status_code(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Add a context value
    pub fn add<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: fmt::Display,
    {
        self.data.insert(key.into(), value.to_string());
    }
}

/// Convert reqwest errors to AgentError
impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        let context = ErrorContext::for_service("http_client");
        let message = crate::util::sanitize_for_logging(&err.to_string());

        let agent_error = if err.is_timeout() {
            AgentError::timeout(format!("Request timed out: {}", message))
        } else if err.is_connect() {
            AgentError::network(format!("Connection error: {}", message))
        } else if err.is_request() {
            AgentError::network(format!("Request failed: {}", message))
        } else if err.is_redirect() {
            AgentError::network(format!("Too many redirects: {}", message))
        } else if err.is_decode() {
            AgentError::parsing(format!("Response decode error: {}", message))
        } else {
            AgentError::service(format!("HTTP client error: {}", message))
        };

        if let Some(status) = err.status() {
            agent_error.with_context(context.status_code(status.as_u16()))
        } else {
            agent_error.with_context(context)
        }
    }
}

/// Convert serde_json errors to AgentError
impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::parsing(format!("JSON error: {}", err))
            .with_context(ErrorContext::for_service("json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let network_err = AgentError::network("Connection failed");
        let config_err = AgentError::configuration("API key is missing");
        let validation_err = AgentError::validation("complainant is required");

        assert_eq!(network_err.to_string(), "Network error: Connection failed");
        assert!(network_err.is_retryable());
        assert!(network_err.is_transport_failure());
        assert!(!network_err.is_fatal());

        assert!(!config_err.is_retryable());
        assert!(config_err.is_fatal());
        assert!(!config_err.is_transport_failure());

        assert!(!validation_err.is_retryable());
        assert!(!validation_err.is_transport_failure());
    }

    #[test]
    fn test_context_is_transparent() {
        let err = AgentError::timeout("attempt exceeded 30s")
            .with_context(ErrorContext::for_service("gemini").status_code(504))
            .with_context_value("attempts", 2);

        assert!(err.is_retryable());
        assert!(err.is_transport_failure());
        assert_eq!(err.status_code(), Some(504));
        assert!(matches!(err.root(), AgentError::Timeout(_)));
        assert!(err.to_string().contains("attempt exceeded 30s"));
    }

    #[test]
    fn test_configuration_stays_fatal_under_context() {
        let err = AgentError::configuration("Gemini API key is required")
            .with_context(ErrorContext::for_service("gemini"));
        assert!(err.is_fatal());
        assert_eq!(err.service_name(), Some("gemini"));
    }
}

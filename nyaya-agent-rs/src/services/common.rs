//! Common utilities for service clients
//!
//! This module provides shared HTTP plumbing for the remote generation client.

use std::fmt;
use std::time::Duration;

use reqwest::{header, Client};

use crate::error::{AgentError, ErrorContext};

/// UserAgent structure for identifying the client to upstream services
#[derive(Debug, Clone)]
pub struct UserAgent {
    /// Application name
    pub app_name: String,

    /// Version string
    pub version: String,

    /// Optional extra info
    pub extra: Option<String>,
}

impl Default for UserAgent {
    fn default() -> Self {
        Self {
            app_name: "Nyaya-Sahayak".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            extra: Some("agent-core".to_string()),
        }
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_name, self.version)?;

        if let Some(ref extra) = self.extra {
            write!(f, " ({})", extra)?;
        }

        Ok(())
    }
}

/// Build a standard HTTP client with default settings
///
/// The client-level timeout is a backstop; per-attempt limits are enforced by
/// [`crate::resilience::Resilience`].
pub fn build_http_client(user_agent: Option<UserAgent>, timeout: Option<Duration>) -> Result<Client, AgentError> {
    let mut headers = header::HeaderMap::new();
    let ua = user_agent.unwrap_or_default().to_string();

    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_str(&ua)
            .map_err(|e| AgentError::configuration(format!("Invalid user agent: {}", e)))?,
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout.unwrap_or_else(|| Duration::from_secs(60)))
        .gzip(true)
        .build()
        .map_err(|e| AgentError::configuration(format!("Failed to build HTTP client: {}", e)))
}

/// Create error context for HTTP requests
pub fn create_error_context(service_name: &str, status: Option<reqwest::StatusCode>) -> ErrorContext {
    let mut context = ErrorContext::for_service(service_name);

    if let Some(status_code) = status {
        context = context.status_code(status_code.as_u16());
    }

    context
}

/// Parse error response from HTTP response
pub async fn parse_error_response(service_name: &str, endpoint: &str, response: reqwest::Response) -> AgentError {
    let status = response.status();
    let mut context = create_error_context(service_name, Some(status)).endpoint(endpoint);

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => format!("Failed to read error response: {}", e),
    };

    log::debug!(
        "{} returned {}: {}",
        service_name,
        status,
        crate::util::truncate_string(&crate::util::sanitize_for_logging(&body), 200)
    );

    crate::error::mapping::map_http_error(status, &body, &mut context).with_context(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_display() {
        let ua = UserAgent {
            app_name: "Nyaya-Sahayak".to_string(),
            version: "1.2.3".to_string(),
            extra: None,
        };
        assert_eq!(ua.to_string(), "Nyaya-Sahayak/1.2.3");
        assert!(UserAgent::default().to_string().contains("(agent-core)"));
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(None, Some(Duration::from_secs(5))).is_ok());
    }
}

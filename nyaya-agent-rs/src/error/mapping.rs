//! Error mapping for the generation service
//!
//! Converts HTTP error responses from the Generative Language API into the
//! normalized [`AgentError`] type.

use reqwest::StatusCode;
use serde_json::Value;

use super::{AgentError, ErrorContext};

/// Map a Gemini error envelope to an AgentError
///
/// The API wraps errors as `{"error": {"code": 400, "message": "...", "status": "INVALID_ARGUMENT"}}`.
pub fn map_gemini_error(status: StatusCode, json: &Value, context: &mut ErrorContext) -> AgentError {
    context.service = "gemini".to_string();

    let error = json.get("error").unwrap_or(json);

    if let Some(code) = error.get("status").and_then(|s| s.as_str()) {
        context.error_code = Some(code.to_string());
    }

    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown Gemini error");

    // An invalid key comes back as 400 INVALID_ARGUMENT with a reason of API_KEY_INVALID
    let key_rejected = error
        .get("details")
        .and_then(|d| d.as_array())
        .map(|details| {
            details.iter().any(|d| {
                d.get("reason").and_then(|r| r.as_str()) == Some("API_KEY_INVALID")
            })
        })
        .unwrap_or(false);

    if key_rejected {
        return AgentError::authentication(message);
    }

    map_status(status, message.to_string())
}

/// Map a generic HTTP error to an AgentError
pub fn map_http_error(status: StatusCode, body: &str, context: &mut ErrorContext) -> AgentError {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if context.service == "gemini" || json.get("error").is_some() {
            return map_gemini_error(status, &json, context);
        }

        let message = json
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or(body);
        return map_status(status, message.to_string());
    }

    let message = if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, crate::util::truncate_string(body, 100))
    };

    map_status(status, message)
}

fn map_status(status: StatusCode, message: String) -> AgentError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => AgentError::rate_limit(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => AgentError::timeout(message),
        StatusCode::BAD_REQUEST => AgentError::validation(message),
        _ => AgentError::service(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gemini_envelope_mapping() {
        let body = json!({
            "error": {
                "code": 429,
                "message": "Resource has been exhausted",
                "status": "RESOURCE_EXHAUSTED"
            }
        });
        let mut context = ErrorContext::new();
        let err = map_gemini_error(StatusCode::TOO_MANY_REQUESTS, &body, &mut context);

        assert!(matches!(err, AgentError::RateLimit(_)));
        assert_eq!(context.service, "gemini");
        assert_eq!(context.error_code.as_deref(), Some("RESOURCE_EXHAUSTED"));
    }

    #[test]
    fn test_invalid_key_is_authentication() {
        let body = json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{"reason": "API_KEY_INVALID"}]
            }
        });
        let mut context = ErrorContext::new();
        let err = map_gemini_error(StatusCode::BAD_REQUEST, &body, &mut context);
        assert!(matches!(err, AgentError::Authentication(_)));
    }

    #[test]
    fn test_plain_body_mapping() {
        let mut context = ErrorContext::for_service("gemini");
        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, "upstream overloaded", &mut context);
        assert!(matches!(err, AgentError::Service(_)));
        assert!(err.is_retryable());

        let err = map_http_error(StatusCode::BAD_GATEWAY, "", &mut context);
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_status_mapping() {
        let msg = || "message".to_string();
        assert!(matches!(map_status(StatusCode::FORBIDDEN, msg()), AgentError::Authentication(_)));
        assert!(matches!(map_status(StatusCode::REQUEST_TIMEOUT, msg()), AgentError::Timeout(_)));
        assert!(matches!(map_status(StatusCode::BAD_REQUEST, msg()), AgentError::Validation(_)));
        assert!(!map_status(StatusCode::BAD_REQUEST, msg()).is_retryable());
    }
}

//! Response contract parser
//!
//! The model is asked for JSON but nothing guarantees it. Every outcome of a
//! chat call (good JSON, prose, empty text, transport error) is turned into a
//! well-formed [`StructuredAgentResponse`] here. Only fatal configuration
//! errors get past this boundary.

use log::warn;

use super::types::StructuredAgentResponse;
use crate::error::{AgentError, Result};
use crate::language::Language;
use crate::util::truncate_string;

/// Outcome of decoding model output
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    /// The payload matched the contract
    Structured(StructuredAgentResponse),

    /// The payload was unusable and a substitute was built
    Fallback(StructuredAgentResponse),
}

impl ParseResult {
    pub fn response(&self) -> &StructuredAgentResponse {
        match self {
            ParseResult::Structured(response) | ParseResult::Fallback(response) => response,
        }
    }

    pub fn into_response(self) -> StructuredAgentResponse {
        match self {
            ParseResult::Structured(response) | ParseResult::Fallback(response) => response,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ParseResult::Fallback(_))
    }
}

/// Decode raw model text
///
/// Empty text is an error (`EmptyResponse`); anything else yields a
/// [`ParseResult`]. Markdown code fences around the JSON are tolerated.
pub fn parse(raw: &str) -> Result<ParseResult> {
    if raw.trim().is_empty() {
        return Err(AgentError::EmptyResponse);
    }

    match serde_json::from_str::<StructuredAgentResponse>(strip_code_fence(raw)) {
        Ok(response) => Ok(ParseResult::Structured(response)),
        Err(err) => {
            warn!(
                "Agent response did not match the contract ({}), falling back: {}",
                err,
                truncate_string(raw, 80)
            );
            Ok(ParseResult::Fallback(StructuredAgentResponse::fallback(raw)))
        }
    }
}

/// Resolve the outcome of a chat call into a response
///
/// Transport failures and empty responses become the localised apology with
/// `intent = "error"`. Fatal errors are returned as-is.
pub fn resolve(outcome: Result<String>, language: Language) -> Result<ParseResult> {
    let err = match outcome.and_then(|raw| parse(&raw)) {
        Ok(parsed) => return Ok(parsed),
        Err(err) => err,
    };

    if err.is_fatal() {
        return Err(err);
    }

    warn!("Agent call failed, answering with apology: {}", err);
    Ok(ParseResult::Fallback(StructuredAgentResponse::transport_failure(language)))
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

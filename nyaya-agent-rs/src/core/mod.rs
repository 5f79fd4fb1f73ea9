//! Core abstractions for the agent
//!
//! Every component that talks to the remote model does so through the
//! [`TextGenerator`] trait, which takes a provider-neutral
//! [`GenerationRequest`] and returns the raw generated text. The production
//! implementation is [`crate::services::gemini::GeminiClient`]; tests
//! substitute `MockTextGenerator`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which class of model a request should run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTier {
    /// Low latency model used for translation
    Fast,

    /// Stronger model used for chat turns and document drafting
    Reasoning,
}

/// Author of a content block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One piece of a content block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    InlineData { mime_type: String, data: Vec<u8> },
}

/// A single turn of input to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Concatenated text parts of this block
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A provider-neutral generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub tier: ModelTier,
    pub system_instruction: Option<String>,
    pub contents: Vec<Content>,
    /// Ask the model for `application/json` output
    pub json_response: bool,
}

impl GenerationRequest {
    /// Create an empty request for the given tier
    pub fn new(tier: ModelTier) -> Self {
        Self {
            tier,
            system_instruction: None,
            contents: Vec::new(),
            json_response: false,
        }
    }

    /// Single user prompt request
    pub fn prompt(tier: ModelTier, text: impl Into<String>) -> Self {
        Self::new(tier).with_content(Content::user_text(text))
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.contents.push(content);
        self
    }

    pub fn with_contents(mut self, contents: impl IntoIterator<Item = Content>) -> Self {
        self.contents.extend(contents);
        self
    }

    pub fn expect_json(mut self) -> Self {
        self.json_response = true;
        self
    }

    /// Text of the last content block, usually the prompt
    pub fn last_text(&self) -> Option<String> {
        self.contents.last().map(Content::text)
    }
}

/// Anything that can turn a [`GenerationRequest`] into text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one generation call. Transport problems surface as errors; an
    /// empty string means the service answered with no text.
    async fn generate(&self, request: GenerationRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let request = GenerationRequest::prompt(ModelTier::Fast, "Translate this")
            .with_system_instruction("be brief")
            .expect_json();

        assert_eq!(request.tier, ModelTier::Fast);
        assert_eq!(request.system_instruction.as_deref(), Some("be brief"));
        assert!(request.json_response);
        assert_eq!(request.last_text().as_deref(), Some("Translate this"));
    }

    #[test]
    fn test_content_text_skips_inline_data() {
        let content = Content {
            role: Role::User,
            parts: vec![
                Part::InlineData {
                    mime_type: "application/pdf".to_string(),
                    data: vec![1, 2, 3],
                },
                Part::Text("Analyze this legal document.".to_string()),
            ],
        };
        assert_eq!(content.text(), "Analyze this legal document.");
    }
}

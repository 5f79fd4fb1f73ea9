//! Conversation and response contract types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::language::Language;
use crate::util::generate_id;

/// Workflow signal attached to an agent response
///
/// Wire names are the camelCase strings the model is instructed to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ActionTag {
    #[serde(rename = "generateFIR")]
    GenerateFir,
    #[serde(rename = "generateNotice")]
    GenerateNotice,
    #[serde(rename = "summarizeCase")]
    SummarizeCase,
    #[serde(rename = "analyzeDocument")]
    AnalyzeDocument,
    #[serde(rename = "offenceChecker")]
    OffenceChecker,
    #[serde(rename = "timelineInfo")]
    TimelineInfo,
    #[serde(rename = "rightsInfo")]
    RightsInfo,
    #[serde(rename = "dictionaryLookup")]
    DictionaryLookup,
    #[default]
    #[serde(rename = "generalAnswer")]
    GeneralAnswer,
}

impl ActionTag {
    pub const ALL: [ActionTag; 9] = [
        ActionTag::GenerateFir,
        ActionTag::GenerateNotice,
        ActionTag::SummarizeCase,
        ActionTag::AnalyzeDocument,
        ActionTag::OffenceChecker,
        ActionTag::TimelineInfo,
        ActionTag::RightsInfo,
        ActionTag::DictionaryLookup,
        ActionTag::GeneralAnswer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionTag::GenerateFir => "generateFIR",
            ActionTag::GenerateNotice => "generateNotice",
            ActionTag::SummarizeCase => "summarizeCase",
            ActionTag::AnalyzeDocument => "analyzeDocument",
            ActionTag::OffenceChecker => "offenceChecker",
            ActionTag::TimelineInfo => "timelineInfo",
            ActionTag::RightsInfo => "rightsInfo",
            ActionTag::DictionaryLookup => "dictionaryLookup",
            ActionTag::GeneralAnswer => "generalAnswer",
        }
    }

    /// Exact wire-name lookup; anything outside the vocabulary is `None`
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == s)
    }
}

/// Model's self-reported certainty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
}

/// The structured reply every chat turn resolves to
///
/// `response_text` is the only user-visible payload. `action` and `data` are
/// side-channel signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredAgentResponse {
    #[serde(default = "general_intent")]
    pub intent: String,

    #[serde(default, deserialize_with = "lenient_confidence")]
    pub confidence: Confidence,

    #[serde(default, deserialize_with = "null_as_default")]
    pub required_fields: Vec<String>,

    pub response_text: String,

    #[serde(default, deserialize_with = "lenient_action")]
    pub action: ActionTag,

    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Map<String, Value>,
}

fn general_intent() -> String {
    "general".to_string()
}

// Unknown or future action names degrade to generalAnswer instead of
// rejecting the whole payload.
fn lenient_action<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ActionTag, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(ActionTag::from_wire).unwrap_or_default())
}

fn lenient_confidence<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Confidence, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value.as_str().map(|s| s.trim().to_lowercase()).as_deref() {
        Some("high") => Confidence::High,
        Some("medium") => Confidence::Medium,
        _ => Confidence::Low,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl StructuredAgentResponse {
    /// Response used when the model's text is not a valid payload
    pub fn fallback(raw: &str) -> Self {
        Self {
            intent: general_intent(),
            confidence: Confidence::Low,
            required_fields: Vec::new(),
            response_text: raw.to_string(),
            action: ActionTag::GeneralAnswer,
            data: Map::new(),
        }
    }

    /// Response used when the remote service could not be reached
    pub fn transport_failure(language: Language) -> Self {
        Self {
            intent: "error".to_string(),
            ..Self::fallback(language.apology())
        }
    }

    /// Out-of-order FIR values the model reported, keyed by field name
    ///
    /// Reads `data.collected_fir_fields` when present, otherwise the top level
    /// of `data`. Only non-empty string values are returned.
    pub fn collected_fir_fields(&self) -> Vec<(String, String)> {
        let source = match self.data.get("collected_fir_fields") {
            Some(Value::Object(map)) => map,
            _ => &self.data,
        };

        source
            .iter()
            .filter_map(|(key, value)| match value {
                Value::String(s) if !s.trim().is_empty() => Some((key.clone(), s.trim().to_string())),
                _ => None,
            })
            .collect()
    }
}

/// Author of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionTag>,

    /// Placeholder shown while a turn is in flight; never sent as context
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub pending: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            role: MessageRole::User,
            text: text.into(),
            action: None,
            pending: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            role: MessageRole::Assistant,
            text: text.into(),
            action: None,
            pending: false,
        }
    }

    /// Attach an action; `generalAnswer` carries no signal and is dropped
    pub fn with_action(mut self, action: ActionTag) -> Self {
        self.action = (action != ActionTag::GeneralAnswer).then_some(action);
        self
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

//! Conversational agent
//!
//! One chat turn is one call to the reasoning model with the running
//! transcript, answered with a [`StructuredAgentResponse`] via the
//! [`parser`]. The [`router`] turns the response's action into a navigation
//! target.

pub mod parser;
pub mod router;
pub mod types;

pub use parser::ParseResult;
pub use router::{route, route_tag, Workflow};
pub use types::{ActionTag, Confidence, Message, MessageRole, StructuredAgentResponse};

use std::sync::Arc;

use tracing::debug;

use crate::core::{Content, GenerationRequest, ModelTier, TextGenerator};
use crate::error::{AgentError, Result};
use crate::language::Language;

/// Instruction for chat turns: classify intent and answer in the JSON contract
pub const AGENT_SYSTEM_INSTRUCTION: &str = r#"You are "Nyaya Sahayak AI Agent", an intelligent legal assistant for Indian courts.

1. Detect the user's intention and set "action":
   - FIR drafting -> 'generateFIR'
   - Notice drafting -> 'generateNotice'
   - Case summary generation -> 'summarizeCase'
   - Document analysis -> 'analyzeDocument'
   - Offence classification (bailable/cognizable) -> 'offenceChecker'
   - Court timeline explanation -> 'timelineInfo'
   - Legal rights explanation -> 'rightsInfo'
   - Legal dictionary lookup -> 'dictionaryLookup'
   - General legal question -> 'generalAnswer'

2. FIR requests:
   If the user wants to file an FIR, reply briefly that you can help draft an FIR for the police and that this is informational, not legal advice. Do not ask any questions; the application will collect the details.
   If the user already mentioned any FIR details, put them in "data.collected_fir_fields" using only these keys:
   complainant_name, complainant_father_name, complainant_address, complainant_contact, accused_name, accused_father_name, accused_address, relationship, incident_datetime, incident_place, incident_description, witnesses, property_lost.

3. Answer only from Indian law. Return structured JSON ONLY:
{
  "intent": "string",
  "confidence": "high/medium/low",
  "required_fields": [],
  "response_text": "string (the reply shown to the user)",
  "action": "string",
  "data": { "collected_fir_fields": {} }
}
"#;

/// Chat-turn driver over a [`TextGenerator`]
#[derive(Clone)]
pub struct LegalAgent {
    generator: Arc<dyn TextGenerator>,
}

impl LegalAgent {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Build the chat request for a transcript
    ///
    /// Pending placeholders are skipped, as are assistant messages before the
    /// first user message (the welcome text), since the conversation sent to
    /// the model must open with a user turn.
    pub fn build_request(messages: &[Message], language: Language) -> GenerationRequest {
        let contents = messages
            .iter()
            .filter(|m| !m.pending)
            .skip_while(|m| m.role == MessageRole::Assistant)
            .map(|m| match m.role {
                MessageRole::User => Content::user_text(&m.text),
                MessageRole::Assistant => Content::model_text(&m.text),
            });

        GenerationRequest::new(ModelTier::Reasoning)
            .with_system_instruction(format!(
                "{}{}",
                AGENT_SYSTEM_INSTRUCTION,
                language.response_directive()
            ))
            .with_contents(contents)
            .expect_json()
    }

    /// Answer the transcript's latest user turn
    ///
    /// Never fails on transport or contract problems; those come back as a
    /// [`ParseResult::Fallback`]. Configuration errors are returned.
    pub async fn respond(&self, messages: &[Message], language: Language) -> Result<ParseResult> {
        let request = Self::build_request(messages, language);
        if request.contents.is_empty() {
            return Err(AgentError::validation("transcript has no user message to answer"));
        }

        debug!(turns = request.contents.len(), language = %language, "sending chat turn");
        let outcome = self.generator.generate(request).await;
        parser::resolve(outcome, language)
    }
}

//! Chat session
//!
//! Owns one transcript, the session language, and at most one FIR dialogue.
//! A turn runs to completion before the next is accepted: the session keeps a
//! pending flag that a second submission observes and is rejected on, with no
//! remote call made.

use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::{json, Map};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::agent::{route, ActionTag, Confidence, LegalAgent, Message, StructuredAgentResponse, Workflow};
use crate::config::DialogueConfig;
use crate::error::{AgentError, Result};
use crate::fir::{DialogueState, FirDialogue, FirField, FirRecord};
use crate::language::Language;
use crate::util::generate_id;

/// Intent reported for turns answered by the local FIR dialogue
pub const FIR_COLLECTION_INTENT: &str = "fir_collection";

/// What one submitted turn produced
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub response: StructuredAgentResponse,
    /// Workflow to offer, from the response's action
    pub navigation: Option<Workflow>,
    /// First FIR prompt when this turn started a dialogue
    pub follow_up: Option<String>,
    /// Set once, on the turn that completes the FIR dialogue
    pub fir_ready: Option<FirRecord>,
    /// The model's reply was not a valid payload and was shown verbatim
    pub fallback: bool,
}

#[derive(Debug)]
struct SessionState {
    language: Language,
    messages: Vec<Message>,
    fir: Option<FirDialogue>,
}

/// Clears the pending flag when the turn ends, however it ends
struct PendingGuard<'a>(&'a AtomicBool);

impl<'a> PendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PendingGuard(flag))
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One user's conversation
pub struct ChatSession {
    id: String,
    max_reasks: u32,
    pending: AtomicBool,
    state: Mutex<SessionState>,
}

impl ChatSession {
    /// New session seeded with the localized welcome message
    pub fn new(language: Language, max_reasks: u32) -> Self {
        Self {
            id: generate_id(),
            max_reasks,
            pending: AtomicBool::new(false),
            state: Mutex::new(SessionState {
                language,
                messages: vec![Message::assistant(language.welcome())],
                fir: None,
            }),
        }
    }

    pub fn from_config(config: &DialogueConfig) -> Self {
        Self::new(config.default_language, config.max_reasks)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether a turn is currently in flight
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    pub async fn language(&self) -> Language {
        self.state.lock().await.language
    }

    /// Switch language; an active FIR dialogue follows
    pub async fn set_language(&self, language: Language) {
        let mut state = self.state.lock().await;
        state.language = language;
        if let Some(dialogue) = state.fir.as_mut() {
            dialogue.set_language(language);
        }
        debug!(session = %self.id, language = %language, "language changed");
    }

    pub async fn toggle_language(&self) -> Language {
        let language = self.language().await.toggle();
        self.set_language(language).await;
        language
    }

    /// Snapshot of the transcript
    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.messages.clone()
    }

    pub async fn fir_state(&self) -> Option<DialogueState> {
        self.state.lock().await.fir.as_ref().map(|d| d.state().clone())
    }

    pub async fn fir_record(&self) -> Option<FirRecord> {
        self.state.lock().await.fir.as_ref().map(|d| d.record().clone())
    }

    /// Abandon the FIR dialogue; returns whether one was active
    pub async fn cancel_fir(&self) -> bool {
        let cancelled = self.state.lock().await.fir.take().is_some();
        if cancelled {
            info!(session = %self.id, "FIR dialogue cancelled");
        }
        cancelled
    }

    /// Submit one user message
    ///
    /// While an FIR dialogue is active the local state machine answers and no
    /// remote call is made. Otherwise the agent answers; transport and
    /// contract failures come back as an apology or fallback response, not as
    /// errors.
    #[instrument(skip_all, fields(session = %self.id))]
    pub async fn submit(&self, agent: &LegalAgent, input: &str) -> Result<TurnOutcome> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AgentError::validation("message is empty"));
        }

        let _guard = PendingGuard::acquire(&self.pending).ok_or_else(|| {
            warn!("rejected submission while a turn is pending");
            AgentError::TurnInFlight(self.id.clone())
        })?;

        let mut state = self.state.lock().await;
        state.messages.push(Message::user(input));

        if let Some(outcome) = Self::fir_turn(&mut state, input) {
            return Ok(outcome);
        }

        let mut placeholder = Message::assistant("");
        placeholder.pending = true;
        state.messages.push(placeholder);

        let result = agent.respond(&state.messages, state.language).await;
        state.messages.retain(|m| !m.pending);
        let parsed = match result {
            Ok(parsed) => parsed,
            Err(err) => {
                // Unanswered input would leave two user turns in a row
                state.messages.pop();
                return Err(err);
            }
        };

        let fallback = parsed.is_fallback();
        let response = parsed.into_response();
        let navigation = route(response.action);
        state
            .messages
            .push(Message::assistant(&response.response_text).with_action(response.action));

        let mut follow_up = None;
        if response.action == ActionTag::GenerateFir {
            let (dialogue, prompt) =
                FirDialogue::start(state.language, self.max_reasks, response.collected_fir_fields());
            info!(hints = response.collected_fir_fields().len(), "FIR intent detected");
            state
                .messages
                .push(Message::assistant(&prompt).with_action(ActionTag::GenerateFir));
            state.fir = Some(dialogue);
            follow_up = Some(prompt);
        }

        debug!(action = response.action.as_str(), fallback, "turn complete");
        Ok(TurnOutcome {
            response,
            navigation,
            follow_up,
            fir_ready: None,
            fallback,
        })
    }

    /// Leave manual entry for `field` with a typed value
    pub async fn supply_manual_entry(&self, field: FirField, value: &str) -> Result<String> {
        let _guard = PendingGuard::acquire(&self.pending)
            .ok_or_else(|| AgentError::TurnInFlight(self.id.clone()))?;

        let mut state = self.state.lock().await;
        let dialogue = state
            .fir
            .as_mut()
            .ok_or_else(|| AgentError::validation("no FIR dialogue is active"))?;
        let prompt = dialogue.supply_manual(field, value)?;
        state
            .messages
            .push(Message::assistant(&prompt).with_action(ActionTag::GenerateFir));
        Ok(prompt)
    }

    /// Answer from the FIR dialogue; `None` when no dialogue is active
    fn fir_turn(state: &mut SessionState, input: &str) -> Option<TurnOutcome> {
        let dialogue = state.fir.as_mut()?;

        let prompt = dialogue.handle(input);
        let response = fir_response(dialogue, &prompt);

        let fir_ready = if dialogue.is_complete() {
            let record = dialogue.record().clone();
            state.fir = None;
            Some(record)
        } else {
            None
        };

        state
            .messages
            .push(Message::assistant(&prompt).with_action(ActionTag::GenerateFir));

        Some(TurnOutcome {
            response,
            navigation: None,
            follow_up: None,
            fir_ready,
            fallback: false,
        })
    }
}

fn fir_response(dialogue: &FirDialogue, prompt: &str) -> StructuredAgentResponse {
    let mut data = Map::new();
    data.insert("collected_fir_fields".to_string(), dialogue.record().to_json());
    data.insert("state".to_string(), json!(dialogue.state()));

    StructuredAgentResponse {
        intent: FIR_COLLECTION_INTENT.to_string(),
        confidence: Confidence::High,
        required_fields: dialogue
            .current_field()
            .map(|f| vec![f.key().to_string()])
            .unwrap_or_default(),
        response_text: prompt.to_string(),
        action: ActionTag::GenerateFir,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::MessageRole;
    use crate::core::MockTextGenerator;
    use std::sync::Arc;

    fn agent_replying(body: &'static str) -> LegalAgent {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().returning(move |_| Ok(body.to_string()));
        LegalAgent::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn test_session_seeded_with_welcome() {
        let session = ChatSession::new(Language::Hi, 3);
        let messages = session.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::Assistant);
        assert_eq!(messages[0].text, Language::Hi.welcome());
    }

    #[tokio::test]
    async fn test_fatal_error_leaves_transcript_unchanged() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_| Err(AgentError::configuration("GEMINI_API_KEY is not set")));
        let agent = LegalAgent::new(Arc::new(mock));
        let session = ChatSession::new(Language::En, 3);

        let err = session.submit(&agent, "What is bail?").await.unwrap_err();
        assert!(err.is_fatal());

        let messages = session.messages().await;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::Assistant);
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn test_general_answer_turn() {
        let agent = agent_replying(
            r#"{"intent":"rights","confidence":"high","required_fields":[],"response_text":"You have the right to remain silent.","action":"rightsInfo","data":{}}"#,
        );
        let session = ChatSession::new(Language::En, 3);

        let outcome = session.submit(&agent, "What are my rights on arrest?").await.unwrap();
        assert_eq!(outcome.navigation, Some(Workflow::Rights));
        assert!(!outcome.fallback);
        assert!(outcome.follow_up.is_none());

        let messages = session.messages().await;
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].action, Some(ActionTag::RightsInfo));
        assert!(messages.iter().all(|m| !m.pending));
        assert!(!session.is_pending());
    }

    #[tokio::test]
    async fn test_empty_submission_rejected() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().times(0);
        let agent = LegalAgent::new(Arc::new(mock));

        let session = ChatSession::new(Language::En, 3);
        let err = session.submit(&agent, "   ").await.unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    #[tokio::test]
    async fn test_pending_flag_rejects_second_submission() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().times(0);
        let agent = LegalAgent::new(Arc::new(mock));

        let session = ChatSession::new(Language::En, 3);
        let guard = PendingGuard::acquire(&session.pending).unwrap();
        assert!(session.is_pending());

        let err = session.submit(&agent, "hello").await.unwrap_err();
        assert!(matches!(err, AgentError::TurnInFlight(ref id) if id == session.id()));

        drop(guard);
        assert!(!session.is_pending());
        assert_eq!(session.messages().await.len(), 1);
    }

    #[tokio::test]
    async fn test_fir_turns_stay_local() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().times(1).returning(|_| {
            Ok(r#"{"intent":"fir","confidence":"high","required_fields":[],"response_text":"I can help you draft an FIR.","action":"generateFIR","data":{}}"#.to_string())
        });
        let agent = LegalAgent::new(Arc::new(mock));
        let session = ChatSession::new(Language::En, 3);

        let outcome = session.submit(&agent, "I want to file an FIR").await.unwrap();
        assert_eq!(outcome.navigation, Some(Workflow::FirGenerator));
        assert!(outcome.follow_up.unwrap().contains("(1/13)"));

        // Only one remote call is allowed: the rest is the local dialogue
        let outcome = session.submit(&agent, "Ramesh Kumar").await.unwrap();
        assert_eq!(outcome.response.intent, FIR_COLLECTION_INTENT);
        assert_eq!(outcome.response.required_fields, vec!["complainant_name".to_string()]);
        assert!(outcome.response.response_text.contains("Ramesh Kumar"));

        let outcome = session.submit(&agent, "yes").await.unwrap();
        assert_eq!(
            outcome.response.required_fields,
            vec!["complainant_father_name".to_string()]
        );
        assert_eq!(
            outcome.response.data["collected_fir_fields"]["complainant_name"],
            "Ramesh Kumar"
        );

        assert!(session.cancel_fir().await);
        assert!(session.fir_state().await.is_none());
    }
}

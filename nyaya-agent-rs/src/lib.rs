//! # Nyaya Agent
//!
//! Conversational core of the Nyaya Sahayak legal assistant.
//!
//! This crate provides:
//!
//! - A translation relay between English and Hindi that never fails a turn
//! - A parser for the agent's structured JSON reply, with a verbatim fallback
//! - An intent router from action tags to workflows
//! - A local slot-filling dialogue that collects the thirteen FIR fields
//! - Prompt builders for FIR, notice, summary, document, law and timeline drafts
//!
//! ## Architecture
//!
//! Everything that talks to a model goes through the `TextGenerator` trait.
//! `GeminiClient` implements it over the Generative Language REST API with
//! retry and per-attempt timeouts; tests substitute a mock.
//!
//! - `LegalAgent`: one chat turn, answered as a `StructuredAgentResponse`
//! - `ChatSession`: transcript, language, pending flag and FIR dialogue
//! - `DocumentGenerator`: single-shot drafting workflows
//! - `AgentError`: error type shared by every layer

pub mod core;
pub use core::{Content, GenerationRequest, ModelTier, Part, Role, TextGenerator};

pub mod services;
pub use services::gemini::{GeminiClient, GeminiClientBuilder};

pub mod error;
pub use error::{AgentError, ErrorContext, Result};

pub mod resilience;
pub use resilience::{Resilience, RetryConfig, RetryExecutor};

pub mod config;
pub use config::{ConfigProvider, DialogueConfig, GeminiConfig};

pub mod language;
pub use language::Language;

pub mod translation;
pub use translation::TranslationRelay;

pub mod agent;
pub use agent::{ActionTag, LegalAgent, Message, ParseResult, StructuredAgentResponse, Workflow};

pub mod fir;
pub use fir::{DialogueState, FirDialogue, FirField, FirForm, FirRecord};

pub mod generation;
pub use generation::{DocumentGenerator, DocumentUpload, GenerationOutcome, NoticeType};

pub mod session;
pub use session::{ChatSession, TurnOutcome};

pub mod drafts;
pub use drafts::SavedDraft;

mod util;

#[cfg(test)]
mod tests;

/// Create a Gemini client from environment configuration
pub fn gemini_client() -> Result<GeminiClient> {
    GeminiClient::from_env()
}

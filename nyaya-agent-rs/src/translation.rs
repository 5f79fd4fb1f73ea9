//! Translation relay
//!
//! Wraps the fast model tier with fail-open semantics: whatever goes wrong,
//! the caller gets text back, at worst the untranslated input. Callers that
//! translate before and after a generation call can rely on the pipeline
//! always completing.

use std::sync::Arc;

use log::warn;

use crate::core::{GenerationRequest, ModelTier, TextGenerator};
use crate::language::Language;
use crate::util::truncate_string;

/// Bidirectional English/Hindi translation over a [`TextGenerator`]
#[derive(Clone)]
pub struct TranslationRelay {
    generator: Arc<dyn TextGenerator>,
}

impl TranslationRelay {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Prompt sent to the fast model for one translation
    pub fn build_request(text: &str, target: Language) -> GenerationRequest {
        GenerationRequest::prompt(
            ModelTier::Fast,
            format!(
                "Translate to {}. Only return the translated text. Text: \"{}\"",
                target.name(),
                text
            ),
        )
    }

    /// Translate `text` into `target`
    ///
    /// Empty input returns an empty string without a remote call. Any failure
    /// (transport error, timeout, empty result) returns `text` unchanged.
    pub async fn translate(&self, text: &str, target: Language) -> String {
        if text.is_empty() {
            return String::new();
        }

        match self.generator.generate(Self::build_request(text, target)).await {
            Ok(translated) => {
                let translated = translated.trim();
                if translated.is_empty() {
                    warn!(
                        "Translation to {} returned no text, keeping original: {}",
                        target.name(),
                        truncate_string(text, 60)
                    );
                    text.to_string()
                } else {
                    translated.to_string()
                }
            }
            Err(err) => {
                warn!("Translation to {} failed, keeping original: {}", target.name(), err);
                text.to_string()
            }
        }
    }

    /// Normalise free text from a Hindi session to English
    ///
    /// Every non-blank input goes through the model, including Hindi typed in
    /// Latin script; blank input comes back unchanged.
    pub async fn to_english(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        self.translate(text, Language::En).await
    }
}

//! Single-shot drafting workflows
//!
//! Each workflow builds one English prompt, calls the reasoning tier, and in
//! Hindi mode wraps the call in translation: user free text is normalised to
//! English first, the generated text is translated back afterwards. The three
//! steps run strictly in sequence.
//!
//! Failures never panic or bubble up as raw errors; they come back as
//! [`GenerationOutcome::Failed`] with a localized message. Only fatal errors
//! (missing credentials) are returned as `Err`.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::core::{GenerationRequest, TextGenerator};
use crate::error::{AgentError, Result};
use crate::fir::{FirForm, FirRecord};
use crate::language::Language;
use crate::translation::TranslationRelay;
use crate::util::truncate_string;

pub mod prompts;

/// Kinds of legal notice the notice workflow drafts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeType {
    #[serde(rename = "Money Recovery")]
    MoneyRecovery,
    #[serde(rename = "Property Dispute")]
    PropertyDispute,
    #[serde(rename = "Cheque Bounce")]
    ChequeBounce,
    #[serde(rename = "Harassment/Threat")]
    Harassment,
    #[serde(rename = "Consumer Complaint")]
    ConsumerComplaint,
    #[serde(rename = "Defamation")]
    Defamation,
    #[serde(rename = "Loan Recovery Misuse")]
    LoanRecoveryMisuse,
}

impl NoticeType {
    pub const ALL: [NoticeType; 7] = [
        NoticeType::MoneyRecovery,
        NoticeType::PropertyDispute,
        NoticeType::ChequeBounce,
        NoticeType::Harassment,
        NoticeType::ConsumerComplaint,
        NoticeType::Defamation,
        NoticeType::LoanRecoveryMisuse,
    ];

    pub fn label(self, language: Language) -> &'static str {
        match self {
            NoticeType::MoneyRecovery => language.pick("Money Recovery", "धन वसूली"),
            NoticeType::PropertyDispute => language.pick("Property Dispute", "संपत्ति विवाद"),
            NoticeType::ChequeBounce => language.pick("Cheque Bounce", "चेक बाउंस"),
            NoticeType::Harassment => language.pick("Harassment/Threat", "उत्पीड़न/धमकी"),
            NoticeType::ConsumerComplaint => language.pick("Consumer Complaint", "उपभोक्ता शिकायत"),
            NoticeType::Defamation => language.pick("Defamation", "मानहानि"),
            NoticeType::LoanRecoveryMisuse => language.pick("Loan Recovery Misuse", "ऋण वसूली का दुरुपयोग"),
        }
    }
}

impl fmt::Display for NoticeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(Language::En))
    }
}

/// An uploaded file for analysis
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl DocumentUpload {
    pub fn new(bytes: impl Into<Vec<u8>>, media_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
        }
    }

    /// Images of any kind and PDFs
    pub fn is_supported(&self) -> bool {
        let essence = self
            .media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        essence.starts_with("image/") || essence == "application/pdf"
    }
}

/// Result of one drafting workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated(String),
    Failed {
        /// User-facing, in the session language
        message: String,
        /// Diagnostic detail for logs
        reason: String,
    },
}

impl GenerationOutcome {
    pub fn text(&self) -> &str {
        match self {
            GenerationOutcome::Generated(text) => text,
            GenerationOutcome::Failed { message, .. } => message,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, GenerationOutcome::Generated(_))
    }
}

#[derive(Debug, Clone, Copy)]
enum Workflow {
    Fir,
    Notice,
    Document,
    General,
}

impl Workflow {
    fn failure(self, language: Language) -> &'static str {
        match self {
            Workflow::Fir => language.pick("Error generating FIR", "FIR बनाने में त्रुटि"),
            Workflow::Notice => language.pick("Error generating Notice", "नोटिस बनाने में त्रुटि"),
            Workflow::Document => {
                language.pick("Failed to analyze document.", "दस्तावेज़ का विश्लेषण विफल रहा।")
            }
            Workflow::General => language.pick("An error occurred.", "एक त्रुटि हुई।"),
        }
    }
}

/// Runs the drafting workflows against a [`TextGenerator`]
#[derive(Clone)]
pub struct DocumentGenerator {
    generator: Arc<dyn TextGenerator>,
    relay: TranslationRelay,
}

impl DocumentGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        let relay = TranslationRelay::new(generator.clone());
        Self { generator, relay }
    }

    /// Draft an FIR from a confirmed dialogue record
    #[instrument(skip_all, fields(workflow = "fir", language = %language))]
    pub async fn fir_draft(&self, record: &FirRecord, language: Language) -> Result<GenerationOutcome> {
        let mut normalized = FirRecord::new();
        for (field, value) in record.iter() {
            normalized.set(field, self.normalize(value, language).await);
        }
        let request = prompts::legal_request(prompts::fir_from_record(&normalized));
        self.run(request, language, Workflow::Fir).await
    }

    /// Draft an FIR from the structured form
    ///
    /// The form is validated first; an invalid form is a `Validation` error and
    /// no remote call is made.
    #[instrument(skip_all, fields(workflow = "fir_form", language = %language))]
    pub async fn fir_draft_from_form(&self, form: &FirForm, language: Language) -> Result<GenerationOutcome> {
        form.validate(language)?;

        let normalized = FirForm {
            complainant: self.normalize(&form.complainant, language).await,
            accused: self.normalize(&form.accused, language).await,
            date_time: form.date_time.clone(),
            incident_type: form.incident_type,
            incident_details: self.normalize(&form.incident_details, language).await,
            evidence: self.normalize(&form.evidence, language).await,
        };
        let request = prompts::legal_request(prompts::fir_from_form(&normalized));
        self.run(request, language, Workflow::Fir).await
    }

    #[instrument(skip_all, fields(workflow = "notice", notice_type = %notice_type, language = %language))]
    pub async fn legal_notice(
        &self,
        notice_type: NoticeType,
        details: &str,
        language: Language,
    ) -> Result<GenerationOutcome> {
        let details = self.normalize(details, language).await;
        let request = prompts::legal_request(prompts::legal_notice(notice_type.label(Language::En), &details));
        self.run(request, language, Workflow::Notice).await
    }

    #[instrument(skip_all, fields(workflow = "case_summary", language = %language))]
    pub async fn case_summary(&self, text: &str, language: Language) -> Result<GenerationOutcome> {
        let text = self.normalize(text, language).await;
        let request = prompts::legal_request(prompts::case_summary(&text));
        self.run(request, language, Workflow::General).await
    }

    /// Analyze an image or PDF
    ///
    /// `prompt` overrides the default instruction. Unsupported media types fail
    /// without a remote call.
    #[instrument(skip_all, fields(workflow = "document", media_type = %upload.media_type, language = %language))]
    pub async fn analyze_document(
        &self,
        upload: &DocumentUpload,
        prompt: Option<&str>,
        language: Language,
    ) -> Result<GenerationOutcome> {
        if upload.bytes.is_empty() || !upload.is_supported() {
            warn!(
                "Rejected document upload: {} ({} bytes)",
                upload.media_type,
                upload.bytes.len()
            );
            return Ok(GenerationOutcome::Failed {
                message: language
                    .pick(
                        "Unsupported file. Please upload an image or a PDF.",
                        "असमर्थित फ़ाइल। कृपया छवि या PDF अपलोड करें।",
                    )
                    .to_string(),
                reason: format!("unsupported media type: {}", upload.media_type),
            });
        }

        let prompt = match prompt.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => self.normalize(p, language).await,
            None => prompts::DEFAULT_DOCUMENT_PROMPT.to_string(),
        };
        let request = prompts::document_request(&upload.media_type, &upload.bytes, prompt);
        self.run(request, language, Workflow::Document).await
    }

    /// Which offences an incident description may constitute
    #[instrument(skip_all, fields(workflow = "offence_check", language = %language))]
    pub async fn offence_check(&self, incident: &str, language: Language) -> Result<GenerationOutcome> {
        let incident = self.normalize(incident, language).await;
        let request = prompts::legal_request(prompts::offence_check(&incident));
        self.run(request, language, Workflow::General).await
    }

    /// Stages of a case from filing to judgment
    #[instrument(skip_all, fields(workflow = "timeline", language = %language))]
    pub async fn court_timeline(&self, case_type: &str, language: Language) -> Result<GenerationOutcome> {
        let case_type = self.normalize(case_type, language).await;
        let request = prompts::legal_request(prompts::court_timeline(&case_type));
        self.run(request, language, Workflow::General).await
    }

    async fn normalize(&self, text: &str, language: Language) -> String {
        match language {
            Language::En => text.to_string(),
            Language::Hi => self.relay.to_english(text).await,
        }
    }

    async fn run(
        &self,
        request: GenerationRequest,
        language: Language,
        workflow: Workflow,
    ) -> Result<GenerationOutcome> {
        let failed = |reason: String| GenerationOutcome::Failed {
            message: workflow.failure(language).to_string(),
            reason,
        };

        match self.generator.generate(request).await {
            Ok(text) if !text.trim().is_empty() => {
                debug!("{:?} draft generated: {}", workflow, truncate_string(text.trim(), 80));
                let text = match language {
                    Language::En => text.trim().to_string(),
                    Language::Hi => self.relay.translate(text.trim(), Language::Hi).await,
                };
                Ok(GenerationOutcome::Generated(text))
            }
            Ok(_) => {
                warn!("{:?} generation returned no text", workflow);
                Ok(failed("empty response".to_string()))
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                warn!("{:?} generation failed: {}", workflow, err);
                Ok(failed(error_reason(&err)))
            }
        }
    }
}

fn error_reason(err: &AgentError) -> String {
    match err.status_code() {
        Some(code) => format!("{} (status {})", err.root(), code),
        None => err.root().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MockTextGenerator, ModelTier, Part};
    use crate::error::ErrorContext;
    use crate::fir::{FirField, IncidentType};

    fn valid_form() -> FirForm {
        FirForm {
            complainant: "Ramesh Kumar".to_string(),
            accused: "Unknown".to_string(),
            date_time: "2024-03-12 21:30".to_string(),
            incident_type: Some(IncidentType::Theft),
            incident_details: "Phone snatched near the metro station".to_string(),
            evidence: "CCTV".to_string(),
        }
    }

    #[tokio::test]
    async fn test_english_notice() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .withf(|req| {
                req.tier == ModelTier::Reasoning
                    && req.last_text().as_deref()
                        == Some("Draft formal Legal Notice for: Cheque Bounce. Case: Cheque of Rs. 50,000 dishonoured. Include Header, Sections (e.g. 138 NI), Demand, Warning.")
            })
            .times(1)
            .returning(|_| Ok("LEGAL NOTICE\n...".to_string()));

        let generator = DocumentGenerator::new(Arc::new(mock));
        let outcome = generator
            .legal_notice(NoticeType::ChequeBounce, "Cheque of Rs. 50,000 dishonoured", Language::En)
            .await
            .unwrap();
        assert_eq!(outcome, GenerationOutcome::Generated("LEGAL NOTICE\n...".to_string()));
    }

    #[tokio::test]
    async fn test_hindi_translates_around_generation() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .withf(|req| req.tier == ModelTier::Fast && req.last_text().unwrap().starts_with("Translate to English."))
            .times(1)
            .returning(|_| Ok("My phone was stolen".to_string()));
        mock.expect_generate()
            .withf(|req| {
                req.tier == ModelTier::Reasoning
                    && req.last_text().unwrap().contains("Analyze: \"My phone was stolen\"")
            })
            .times(1)
            .returning(|_| Ok("Section 303 BNS: Theft".to_string()));
        mock.expect_generate()
            .withf(|req| req.tier == ModelTier::Fast && req.last_text().unwrap().starts_with("Translate to Hindi."))
            .times(1)
            .returning(|_| Ok("धारा 303 BNS: चोरी".to_string()));

        let generator = DocumentGenerator::new(Arc::new(mock));
        let outcome = generator
            .offence_check("मेरा फोन चोरी हो गया", Language::Hi)
            .await
            .unwrap();
        assert_eq!(outcome.text(), "धारा 303 BNS: चोरी");
    }

    #[tokio::test]
    async fn test_latin_script_hindi_is_translated() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .withf(|req| {
                req.tier == ModelTier::Fast
                    && req.last_text().unwrap().starts_with("Translate to English.")
                    && req.last_text().unwrap().contains("mera phone chori ho gaya")
            })
            .times(1)
            .returning(|_| Ok("My phone was stolen".to_string()));
        mock.expect_generate()
            .withf(|req| {
                req.tier == ModelTier::Reasoning
                    && req.last_text().unwrap().contains("Analyze: \"My phone was stolen\"")
            })
            .times(1)
            .returning(|_| Ok("Section 303 BNS: Theft".to_string()));
        mock.expect_generate()
            .withf(|req| req.tier == ModelTier::Fast && req.last_text().unwrap().starts_with("Translate to Hindi."))
            .times(1)
            .returning(|_| Ok("धारा 303 BNS: चोरी".to_string()));

        let generator = DocumentGenerator::new(Arc::new(mock));
        let outcome = generator
            .offence_check("mera phone chori ho gaya", Language::Hi)
            .await
            .unwrap();
        assert_eq!(outcome.text(), "धारा 303 BNS: चोरी");
    }

    #[tokio::test]
    async fn test_hindi_failed_translation_falls_through() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .withf(|req| req.tier == ModelTier::Fast)
            .returning(|_| Err(AgentError::timeout("translation")));
        mock.expect_generate()
            .withf(|req| req.tier == ModelTier::Reasoning)
            .times(1)
            .returning(|_| Ok("Stages: filing, evidence, judgment".to_string()));

        let generator = DocumentGenerator::new(Arc::new(mock));
        let outcome = generator.court_timeline("चेक बाउंस", Language::Hi).await.unwrap();
        assert_eq!(
            outcome,
            GenerationOutcome::Generated("Stages: filing, evidence, judgment".to_string())
        );
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_call() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().times(0);

        let generator = DocumentGenerator::new(Arc::new(mock));
        let form = FirForm {
            incident_type: None,
            ..valid_form()
        };
        let err = generator.fir_draft_from_form(&form, Language::En).await.unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    #[tokio::test]
    async fn test_form_draft_and_failure_message() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .withf(|req| req.last_text().unwrap().contains("- Incident Type: Theft / Robbery"))
            .times(1)
            .returning(|_| {
                Err(AgentError::service("model is overloaded")
                    .with_context(ErrorContext::for_service("gemini").status_code(503)))
            });

        let generator = DocumentGenerator::new(Arc::new(mock));
        let outcome = generator.fir_draft_from_form(&valid_form(), Language::En).await.unwrap();
        match outcome {
            GenerationOutcome::Failed { message, reason } => {
                assert_eq!(message, "Error generating FIR");
                assert!(reason.contains("503"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fatal_error_propagates() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .returning(|_| Err(AgentError::configuration("GEMINI_API_KEY is not set")));

        let generator = DocumentGenerator::new(Arc::new(mock));
        let mut record = FirRecord::new();
        record.set(FirField::ComplainantName, "Ramesh Kumar");
        let err = generator.fir_draft(&record, Language::En).await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_empty_generation_is_failure() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate().returning(|_| Ok("  ".to_string()));

        let generator = DocumentGenerator::new(Arc::new(mock));
        let outcome = generator.case_summary("Judgment text", Language::Hi).await.unwrap();
        assert_eq!(outcome.text(), "एक त्रुटि हुई।");
        assert!(!outcome.is_generated());
    }

    #[tokio::test]
    async fn test_document_upload() {
        let mut mock = MockTextGenerator::new();
        mock.expect_generate()
            .withf(|req| {
                matches!(
                    &req.contents[0].parts[0],
                    Part::InlineData { mime_type, data } if mime_type == "application/pdf" && data == b"%PDF"
                ) && req.last_text().as_deref() == Some(prompts::DEFAULT_DOCUMENT_PROMPT)
            })
            .times(1)
            .returning(|_| Ok("Summary: ...".to_string()));

        let generator = DocumentGenerator::new(Arc::new(mock));
        let pdf = DocumentUpload::new(b"%PDF".to_vec(), "application/pdf");
        let outcome = generator.analyze_document(&pdf, None, Language::En).await.unwrap();
        assert!(outcome.is_generated());

        let zip = DocumentUpload::new(b"PK".to_vec(), "application/zip");
        let outcome = generator.analyze_document(&zip, None, Language::En).await.unwrap();
        assert!(!outcome.is_generated());
    }

    #[test]
    fn test_supported_media_types() {
        assert!(DocumentUpload::new(vec![1], "image/jpeg").is_supported());
        assert!(DocumentUpload::new(vec![1], "Application/PDF; charset=binary").is_supported());
        assert!(!DocumentUpload::new(vec![1], "text/plain").is_supported());
    }
}

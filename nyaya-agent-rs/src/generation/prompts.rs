//! Prompt text for the single-shot generation workflows
//!
//! Pure functions: structured inputs go in verbatim, English instruction text
//! comes out. Translation of user text happens before these are called.

use crate::core::{Content, GenerationRequest, ModelTier, Part};
use crate::fir::{FirField, FirForm, FirRecord};
use crate::language::Language;

/// Domain constraints sent with every drafting request
pub const LEGAL_SYSTEM_INSTRUCTION: &str = "You are an Indian legal expert AI named Nyaya Sahayak.
Always answer based strictly on Indian laws, including:
- IPC (Indian Penal Code) / BNS (Bharatiya Nyaya Sanhita)
- CrPC (Code of Criminal Procedure) / BNSS (Bharatiya Nagarik Suraksha Sanhita)
- Indian Evidence Act / BSA (Bharatiya Sakshya Adhiniyam)
- Constitution of India
- IT Act (Cyber Laws)
- Consumer Protection Act
- Negotiable Instruments Act

Do not reference foreign laws (like US/UK law).
Be precise, professional, and empathetic.
Disclaimer: Always start or end with a disclaimer that you are an AI and this is not professional legal advice.
";

pub const DOCUMENT_ANALYSIS_SUFFIX: &str = "\nAnalyze document: Summary, Allegations, Laws, Risk, Next Steps.";

pub const DEFAULT_DOCUMENT_PROMPT: &str = "Analyze this legal document.";

const FIR_HEADER: &str =
    "Draft a formal Police FIR (First Information Report) for an Indian Police Station based on:";

/// FIR prompt from a dialogue record
pub fn fir_from_record(record: &FirRecord) -> String {
    let mut prompt = String::from(FIR_HEADER);
    for field in FirField::ALL {
        prompt.push_str(&format!(
            "\n- {}: {}",
            field.label(Language::En),
            record.get(field).unwrap_or_default()
        ));
    }
    prompt.push_str(
        "\n\nStructure professionally. Suggest and cite relevant Bharatiya Nyaya Sanhita (BNS) and IPC sections that fit the incident description.",
    );
    prompt
}

/// FIR prompt from the structured form
pub fn fir_from_form(form: &FirForm) -> String {
    let incident_type = form
        .incident_type
        .map(|t| t.label(Language::En))
        .unwrap_or_default();
    format!(
        "{}\n- Complainant: {}\n- Accused: {}\n- Date & Time: {}\n- Incident Type: {}\n- Incident Details: {}\n- Evidence: {}\n\nStructure professionally. Suggest and cite relevant Bharatiya Nyaya Sanhita (BNS) and IPC sections specifically for the Incident Type: \"{}\".",
        FIR_HEADER,
        form.complainant,
        form.accused,
        form.date_time,
        incident_type,
        form.incident_details,
        form.evidence,
        incident_type
    )
}

pub fn legal_notice(notice_type: &str, details: &str) -> String {
    format!(
        "Draft formal Legal Notice for: {}. Case: {}. Include Header, Sections (e.g. 138 NI), Demand, Warning.",
        notice_type, details
    )
}

pub fn case_summary(text: &str) -> String {
    format!(
        "Summarize this legal case/text. Identify key arguments, defence points, and evidence: \n\n {}",
        text
    )
}

pub fn offence_check(incident: &str) -> String {
    format!(
        "Analyze: \"{}\". Provide: Sections, Classification, Punishment, Explanation.",
        incident
    )
}

pub fn court_timeline(case_type: &str) -> String {
    format!("Timeline for: {}. Include stages from filing to judgment.", case_type)
}

/// Reasoning-tier request carrying the legal system instruction
pub fn legal_request(prompt: String) -> GenerationRequest {
    GenerationRequest::prompt(ModelTier::Reasoning, prompt).with_system_instruction(LEGAL_SYSTEM_INSTRUCTION)
}

/// Multimodal request: the document bytes, then the instruction
pub fn document_request(media_type: &str, bytes: &[u8], prompt: String) -> GenerationRequest {
    GenerationRequest::new(ModelTier::Reasoning)
        .with_system_instruction(format!("{}{}", LEGAL_SYSTEM_INSTRUCTION, DOCUMENT_ANALYSIS_SUFFIX))
        .with_content(Content {
            role: crate::core::Role::User,
            parts: vec![
                Part::InlineData {
                    mime_type: media_type.to_string(),
                    data: bytes.to_vec(),
                },
                Part::Text(prompt),
            ],
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fir::IncidentType;

    #[test]
    fn test_fir_from_record_lists_fields_in_order() {
        let mut record = FirRecord::new();
        for field in FirField::ALL {
            record.set(field, format!("<{}>", field.key()));
        }
        let prompt = fir_from_record(&record);

        let positions: Vec<usize> = FirField::ALL
            .iter()
            .map(|f| prompt.find(&format!("<{}>", f.key())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(prompt.starts_with(FIR_HEADER));
        assert!(prompt.contains("Bharatiya Nyaya Sanhita (BNS)"));
    }

    #[test]
    fn test_fir_from_form_embeds_verbatim() {
        let form = FirForm {
            complainant: "Ramesh Kumar".to_string(),
            incident_type: Some(IncidentType::Cybercrime),
            incident_details: "UPI fraud of Rs. 25,000".to_string(),
            ..FirForm::default()
        };
        let prompt = fir_from_form(&form);
        assert!(prompt.contains("- Complainant: Ramesh Kumar"));
        assert!(prompt.contains("- Incident Details: UPI fraud of Rs. 25,000"));
        assert!(prompt.contains("for the Incident Type: \"Cybercrime\""));
    }

    #[test]
    fn test_requests_carry_system_instruction() {
        let request = legal_request(court_timeline("Cheque Bounce"));
        assert_eq!(request.tier, ModelTier::Reasoning);
        assert!(request.system_instruction.as_deref().unwrap().contains("Do not reference foreign laws"));
        assert_eq!(
            request.last_text().as_deref(),
            Some("Timeline for: Cheque Bounce. Include stages from filing to judgment.")
        );

        let request = document_request("image/png", &[0x89, 0x50], DEFAULT_DOCUMENT_PROMPT.to_string());
        assert!(request.system_instruction.as_deref().unwrap().ends_with(DOCUMENT_ANALYSIS_SUFFIX));
        assert_eq!(request.contents[0].parts.len(), 2);
    }
}

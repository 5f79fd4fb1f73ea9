//! Bilingual prompt templates for the FIR dialogue

use super::fields::{FirField, FirRecord};
use crate::language::Language;

pub fn intro(language: Language) -> &'static str {
    language.pick(
        "I can help you draft an FIR for the police. This is for informational purposes and is not legal advice. I will ask for 13 details, one at a time.",
        "मैं पुलिस के लिए FIR का ड्राफ्ट बनाने में आपकी मदद कर सकता हूँ। यह केवल जानकारी के लिए है, कानूनी सलाह नहीं। मैं 13 जानकारियाँ एक-एक करके पूछूँगा।",
    )
}

pub fn ask(field: FirField, language: Language) -> String {
    format!("({}/{}) {}", field.index() + 1, FirField::ALL.len(), field.question(language))
}

pub fn echo(field: FirField, value: &str, language: Language) -> String {
    match language {
        Language::En => format!(
            "You said {}: \"{}\". Is that correct? (yes / no, or give the correct value)",
            field.label(language),
            value
        ),
        Language::Hi => format!(
            "आपने बताया {}: \"{}\"। क्या यह सही है? (हाँ / नहीं, या सही जानकारी बताएं)",
            field.label(language),
            value
        ),
    }
}

/// Echo for a value the user gave before its field came up
pub fn echo_hint(field: FirField, value: &str, language: Language) -> String {
    let position = format!("({}/{})", field.index() + 1, FirField::ALL.len());
    match language {
        Language::En => format!(
            "{} Earlier you mentioned {}: \"{}\". Is that correct?",
            position,
            field.label(language),
            value
        ),
        Language::Hi => format!(
            "{} आपने पहले बताया था {}: \"{}\"। क्या यह सही है?",
            position,
            field.label(language),
            value
        ),
    }
}

pub fn noted(field: FirField, language: Language) -> String {
    match language {
        Language::En => format!("Noted {}.", field.label(language)),
        Language::Hi => format!("{} दर्ज किया गया।", field.label(language)),
    }
}

pub fn retry(language: Language) -> &'static str {
    language.pick("Let's try again.", "चलिए फिर से कोशिश करते हैं।")
}

pub fn empty_answer(language: Language) -> &'static str {
    language.pick("I did not catch that.", "मुझे यह समझ नहीं आया।")
}

pub fn manual_entry(field: FirField, language: Language) -> String {
    match language {
        Language::En => format!(
            "I could not confirm the {} after several attempts. Please enter it manually.",
            field.label(language)
        ),
        Language::Hi => format!(
            "कई प्रयासों के बाद भी {} की पुष्टि नहीं हो सकी। कृपया इसे स्वयं दर्ज करें।",
            field.label(language)
        ),
    }
}

pub fn summary(record: &FirRecord, language: Language) -> String {
    let mut text = language
        .pick("Here is the information you provided:", "आपके द्वारा दी गई जानकारी:")
        .to_string();
    for (field, value) in record.iter() {
        text.push_str(&format!("\n{}. {}: {}", field.index() + 1, field.label(language), value));
    }
    text.push_str("\n\n");
    text.push_str(confirm_generate(language));
    text
}

pub fn confirm_generate(language: Language) -> &'static str {
    language.pick("Shall I generate the FIR now?", "क्या मैं अब FIR तैयार करूँ?")
}

pub fn summary_unclear(language: Language) -> &'static str {
    language.pick(
        "Please reply \"yes\" to generate the FIR, or tell me which detail to change.",
        "FIR तैयार करने के लिए \"हाँ\" कहें, या बताएं कि कौन सी जानकारी बदलनी है।",
    )
}

pub fn generating(language: Language) -> &'static str {
    language.pick("Generating your FIR now.", "आपकी FIR अभी तैयार की जा रही है।")
}

pub fn already_complete(language: Language) -> &'static str {
    language.pick(
        "All details are confirmed and the FIR is ready for generation.",
        "सभी जानकारी की पुष्टि हो चुकी है और FIR तैयार करने के लिए तैयार है।",
    )
}

//! The thirteen FIR fields and the record they fill

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::language::Language;

/// One FIR field, in collection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirField {
    ComplainantName,
    ComplainantFatherName,
    ComplainantAddress,
    ComplainantContact,
    AccusedName,
    AccusedFatherName,
    AccusedAddress,
    Relationship,
    IncidentDatetime,
    IncidentPlace,
    IncidentDescription,
    Witnesses,
    PropertyLost,
}

impl FirField {
    pub const ALL: [FirField; 13] = [
        FirField::ComplainantName,
        FirField::ComplainantFatherName,
        FirField::ComplainantAddress,
        FirField::ComplainantContact,
        FirField::AccusedName,
        FirField::AccusedFatherName,
        FirField::AccusedAddress,
        FirField::Relationship,
        FirField::IncidentDatetime,
        FirField::IncidentPlace,
        FirField::IncidentDescription,
        FirField::Witnesses,
        FirField::PropertyLost,
    ];

    /// Canonical key, as used in `data.collected_fir_fields`
    pub fn key(self) -> &'static str {
        match self {
            FirField::ComplainantName => "complainant_name",
            FirField::ComplainantFatherName => "complainant_father_name",
            FirField::ComplainantAddress => "complainant_address",
            FirField::ComplainantContact => "complainant_contact",
            FirField::AccusedName => "accused_name",
            FirField::AccusedFatherName => "accused_father_name",
            FirField::AccusedAddress => "accused_address",
            FirField::Relationship => "relationship",
            FirField::IncidentDatetime => "incident_datetime",
            FirField::IncidentPlace => "incident_place",
            FirField::IncidentDescription => "incident_description",
            FirField::Witnesses => "witnesses",
            FirField::PropertyLost => "property_lost",
        }
    }

    /// Lenient key lookup ("Complainant-Name" finds `complainant_name`)
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized = key
            .trim()
            .to_lowercase()
            .replace(|c: char| !c.is_ascii_alphanumeric(), "_");
        Self::ALL.into_iter().find(|field| field.key() == normalized)
    }

    /// Zero-based position in collection order
    pub fn index(self) -> usize {
        self as usize
    }

    /// The field collected after this one
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    pub fn label(self, language: Language) -> &'static str {
        match self {
            FirField::ComplainantName => language.pick("Complainant Name", "शिकायतकर्ता का नाम"),
            FirField::ComplainantFatherName => {
                language.pick("Complainant's Father's Name", "शिकायतकर्ता के पिता का नाम")
            }
            FirField::ComplainantAddress => language.pick("Complainant Address", "शिकायतकर्ता का पता"),
            FirField::ComplainantContact => {
                language.pick("Complainant Contact Number", "शिकायतकर्ता का संपर्क नंबर")
            }
            FirField::AccusedName => language.pick("Accused Name", "आरोपी का नाम"),
            FirField::AccusedFatherName => language.pick("Accused's Father's Name", "आरोपी के पिता का नाम"),
            FirField::AccusedAddress => language.pick("Accused Address", "आरोपी का पता"),
            FirField::Relationship => language.pick(
                "Relationship between Complainant and Accused",
                "शिकायतकर्ता और आरोपी के बीच संबंध",
            ),
            FirField::IncidentDatetime => language.pick("Date & Time of Incident", "घटना की तारीख और समय"),
            FirField::IncidentPlace => language.pick("Place of Incident", "घटना का स्थान"),
            FirField::IncidentDescription => language.pick("Incident Description", "घटना का विवरण"),
            FirField::Witnesses => language.pick("Witnesses", "गवाह"),
            FirField::PropertyLost => language.pick("Property Lost/Damaged", "खोई/क्षतिग्रस्त संपत्ति"),
        }
    }

    pub fn question(self, language: Language) -> &'static str {
        match self {
            FirField::ComplainantName => language.pick(
                "What is the complainant's full name?",
                "शिकायतकर्ता का पूरा नाम क्या है?",
            ),
            FirField::ComplainantFatherName => language.pick(
                "What is the complainant's father's name?",
                "शिकायतकर्ता के पिता का नाम क्या है?",
            ),
            FirField::ComplainantAddress => language.pick(
                "What is the complainant's full address?",
                "शिकायतकर्ता का पूरा पता क्या है?",
            ),
            FirField::ComplainantContact => language.pick(
                "What is the complainant's contact number?",
                "शिकायतकर्ता का संपर्क नंबर क्या है?",
            ),
            FirField::AccusedName => language.pick(
                "What is the name of the accused? (say \"unknown\" if you do not know)",
                "आरोपी का नाम क्या है? (पता न हो तो \"अज्ञात\" कहें)",
            ),
            FirField::AccusedFatherName => language.pick(
                "What is the accused's father's name? (say \"unknown\" if you do not know)",
                "आरोपी के पिता का नाम क्या है? (पता न हो तो \"अज्ञात\" कहें)",
            ),
            FirField::AccusedAddress => language.pick(
                "What is the accused's address? (say \"unknown\" if you do not know)",
                "आरोपी का पता क्या है? (पता न हो तो \"अज्ञात\" कहें)",
            ),
            FirField::Relationship => language.pick(
                "What is the relationship between the complainant and the accused?",
                "शिकायतकर्ता और आरोपी के बीच क्या संबंध है?",
            ),
            FirField::IncidentDatetime => language.pick(
                "On what date and at what time did the incident happen?",
                "घटना किस तारीख और किस समय हुई?",
            ),
            FirField::IncidentPlace => language.pick(
                "Where did the incident take place?",
                "घटना कहाँ हुई?",
            ),
            FirField::IncidentDescription => language.pick(
                "Please describe the incident in detail.",
                "कृपया घटना का विस्तार से वर्णन करें।",
            ),
            FirField::Witnesses => language.pick(
                "Were there any witnesses? (say \"none\" if there were not)",
                "क्या कोई गवाह थे? (न हों तो \"कोई नहीं\" कहें)",
            ),
            FirField::PropertyLost => language.pick(
                "Was any property lost or damaged? (say \"none\" if not)",
                "क्या कोई संपत्ति खोई या क्षतिग्रस्त हुई? (न हो तो \"कोई नहीं\" कहें)",
            ),
        }
    }

    /// Words a user might use to refer to this field when asking for a change
    fn mentions(self) -> &'static [&'static str] {
        match self {
            FirField::ComplainantName => &["my name", "complainant name", "name", "नाम"],
            FirField::ComplainantFatherName => &["my father", "complainant's father", "father", "पिता"],
            FirField::ComplainantAddress => &["my address", "complainant address", "address", "पता"],
            FirField::ComplainantContact => {
                &["contact", "phone", "mobile", "number", "संपर्क", "फ़ोन", "फोन", "मोबाइल"]
            }
            FirField::AccusedName => &["accused name", "accused's name", "accused", "आरोपी"],
            FirField::AccusedFatherName => &["accused's father", "accused father", "आरोपी के पिता"],
            FirField::AccusedAddress => &["accused's address", "accused address", "आरोपी का पता"],
            FirField::Relationship => &["relationship", "relation", "संबंध", "रिश्ता"],
            FirField::IncidentDatetime => &["date", "time", "when", "तारीख", "समय"],
            FirField::IncidentPlace => &["place", "location", "where", "स्थान", "जगह"],
            FirField::IncidentDescription => &["description", "what happened", "details", "विवरण"],
            FirField::Witnesses => &["witness", "witnesses", "गवाह"],
            FirField::PropertyLost => &["property", "lost", "damaged", "संपत्ति", "नुकसान"],
        }
    }

    /// The field a free-text reply refers to, if any
    ///
    /// The longest matching mention wins, so "accused's address" beats
    /// "address".
    pub fn mentioned_in(text: &str) -> Option<Self> {
        let text = text.to_lowercase();
        MENTIONS
            .iter()
            .filter(|(_, _, pattern)| pattern.is_match(&text))
            .max_by_key(|(_, mention, _)| mention.chars().count())
            .map(|(field, _, _)| *field)
    }
}

/// Mentions compiled to whole-word patterns, so "update" does not name the date
static MENTIONS: Lazy<Vec<(FirField, &'static str, Regex)>> = Lazy::new(|| {
    FirField::ALL
        .into_iter()
        .flat_map(|field| field.mentions().iter().map(move |m| (field, *m)))
        .filter_map(|(field, mention)| {
            let pattern = format!(
                r"(?:^|[^\p{{L}}\p{{M}}\p{{N}}]){}(?:$|[^\p{{L}}\p{{M}}\p{{N}}])",
                regex::escape(mention)
            );
            Regex::new(&pattern).ok().map(|re| (field, mention, re))
        })
        .collect()
});

/// Confirmed FIR values, keyed and ordered by field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FirRecord {
    fields: BTreeMap<FirField, String>,
}

impl FirRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: FirField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: FirField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        FirField::ALL.iter().all(|f| self.fields.contains_key(f))
    }

    /// Fields still missing, in collection order
    pub fn missing(&self) -> Vec<FirField> {
        FirField::ALL
            .into_iter()
            .filter(|f| !self.fields.contains_key(f))
            .collect()
    }

    /// Values in collection order
    pub fn iter(&self) -> impl Iterator<Item = (FirField, &str)> {
        self.fields.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Values as a JSON object keyed by canonical field name
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(field, value)| (field.key().to_string(), serde_json::Value::String(value.to_string())))
                .collect(),
        )
    }
}

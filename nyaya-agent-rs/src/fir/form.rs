//! Structured FIR form entry point
//!
//! The single-screen alternative to the dialogue: six fields, four of them
//! required. Validation runs before any remote call.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::fields::{FirField, FirRecord};
use crate::error::AgentError;
use crate::language::Language;

/// Category of the reported incident
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentType {
    #[serde(rename = "Assault / Physical Violence")]
    Assault,
    #[serde(rename = "Theft / Robbery")]
    Theft,
    #[serde(rename = "Fraud / Financial Crime")]
    Fraud,
    #[serde(rename = "Cybercrime")]
    Cybercrime,
    #[serde(rename = "Harassment / Stalking")]
    Harassment,
    #[serde(rename = "Property Damage / Vandalism")]
    PropertyDamage,
    #[serde(rename = "Domestic Violence")]
    DomesticViolence,
    #[serde(rename = "Cheque Bounce")]
    ChequeBounce,
    #[serde(rename = "Other")]
    Other,
}

impl IncidentType {
    pub const ALL: [IncidentType; 9] = [
        IncidentType::Assault,
        IncidentType::Theft,
        IncidentType::Fraud,
        IncidentType::Cybercrime,
        IncidentType::Harassment,
        IncidentType::PropertyDamage,
        IncidentType::DomesticViolence,
        IncidentType::ChequeBounce,
        IncidentType::Other,
    ];

    pub fn label(self, language: Language) -> &'static str {
        match self {
            IncidentType::Assault => language.pick("Assault / Physical Violence", "हमला / शारीरिक हिंसा"),
            IncidentType::Theft => language.pick("Theft / Robbery", "चोरी / डकैती"),
            IncidentType::Fraud => language.pick("Fraud / Financial Crime", "धोखाधड़ी / वित्तीय अपराध"),
            IncidentType::Cybercrime => language.pick("Cybercrime", "साइबर अपराध"),
            IncidentType::Harassment => language.pick("Harassment / Stalking", "उत्पीड़न / पीछा करना"),
            IncidentType::PropertyDamage => {
                language.pick("Property Damage / Vandalism", "संपत्ति का नुकसान / तोड़फोड़")
            }
            IncidentType::DomesticViolence => language.pick("Domestic Violence", "घरेलू हिंसा"),
            IncidentType::ChequeBounce => language.pick("Cheque Bounce", "चेक बाउंस"),
            IncidentType::Other => language.pick("Other", "अन्य"),
        }
    }
}

impl fmt::Display for IncidentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(Language::En))
    }
}

/// Form fields that can fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Complainant,
    DateTime,
    IncidentType,
    IncidentDetails,
}

/// Per-field validation messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    errors: BTreeMap<FormField, &'static str>,
}

impl FormErrors {
    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    pub fn fields(&self) -> Vec<FormField> {
        self.errors.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self.fields().iter().map(|field| format!("{:?}", field)).collect();
        write!(f, "missing required fields: {}", fields.join(", "))
    }
}

impl std::error::Error for FormErrors {}

impl From<FormErrors> for AgentError {
    fn from(errors: FormErrors) -> Self {
        AgentError::validation(errors.to_string())
    }
}

/// The structured FIR form (`formData` in saved drafts)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FirForm {
    pub complainant: String,
    pub accused: String,
    pub date_time: String,
    /// Unselected is `""` on the wire
    #[serde(deserialize_with = "unselected_as_none")]
    pub incident_type: Option<IncidentType>,
    pub incident_details: String,
    pub evidence: String,
}

fn unselected_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<IncidentType>, D::Error> {
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(label) => IncidentType::ALL
            .into_iter()
            .find(|t| t.label(Language::En) == label)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unknown incident type: {}", label))),
    }
}

impl FirForm {
    /// Check required fields; messages are in `language`
    pub fn validate(&self, language: Language) -> Result<(), FormErrors> {
        let required = language.pick("Required", "अनिवार्य");
        let mut errors = BTreeMap::new();

        if self.complainant.trim().is_empty() {
            errors.insert(FormField::Complainant, required);
        }
        if self.date_time.trim().is_empty() {
            errors.insert(FormField::DateTime, required);
        }
        if self.incident_type.is_none() {
            errors.insert(FormField::IncidentType, required);
        }
        if self.incident_details.trim().is_empty() {
            errors.insert(FormField::IncidentDetails, required);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(FormErrors { errors })
        }
    }

    /// Collapse a dialogue record into the form shape used by saved drafts
    pub fn from_record(record: &FirRecord) -> Self {
        let value = |field: FirField| record.get(field).unwrap_or_default().to_string();
        let joined = |parts: &[FirField]| {
            parts
                .iter()
                .filter_map(|f| record.get(*f))
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(", ")
        };

        Self {
            complainant: joined(&[
                FirField::ComplainantName,
                FirField::ComplainantFatherName,
                FirField::ComplainantAddress,
                FirField::ComplainantContact,
            ]),
            accused: joined(&[
                FirField::AccusedName,
                FirField::AccusedFatherName,
                FirField::AccusedAddress,
                FirField::Relationship,
            ]),
            date_time: value(FirField::IncidentDatetime),
            incident_type: None,
            incident_details: joined(&[FirField::IncidentPlace, FirField::IncidentDescription]),
            evidence: joined(&[FirField::Witnesses, FirField::PropertyLost]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        let form = FirForm {
            complainant: "Ramesh Kumar".to_string(),
            incident_details: "   ".to_string(),
            ..FirForm::default()
        };

        let errors = form.validate(Language::Hi).unwrap_err();
        assert_eq!(
            errors.fields(),
            vec![FormField::DateTime, FormField::IncidentType, FormField::IncidentDetails]
        );
        assert_eq!(errors.get(FormField::DateTime), Some("अनिवार्य"));
        assert_eq!(errors.get(FormField::Complainant), None);

        let err: AgentError = errors.into();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    #[test]
    fn test_valid_form_and_wire_shape() {
        let form = FirForm {
            complainant: "Ramesh Kumar".to_string(),
            accused: "Unknown".to_string(),
            date_time: "2024-03-12 21:30".to_string(),
            incident_type: Some(IncidentType::Theft),
            incident_details: "Phone snatched near the metro station".to_string(),
            evidence: String::new(),
        };
        assert!(form.validate(Language::En).is_ok());

        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["incidentType"], "Theft / Robbery");
        assert_eq!(json["dateTime"], "2024-03-12 21:30");

        let unselected: FirForm =
            serde_json::from_value(serde_json::json!({"complainant": "Ramesh", "incidentType": ""})).unwrap();
        assert_eq!(unselected.incident_type, None);
        let round: FirForm = serde_json::from_value(json).unwrap();
        assert_eq!(round, form);
    }

    #[test]
    fn test_from_record() {
        let mut record = FirRecord::new();
        record.set(FirField::ComplainantName, "Ramesh Kumar");
        record.set(FirField::ComplainantContact, "9876543210");
        record.set(FirField::IncidentDatetime, "12 March, 9pm");

        let form = FirForm::from_record(&record);
        assert_eq!(form.complainant, "Ramesh Kumar, 9876543210");
        assert_eq!(form.date_time, "12 March, 9pm");
        assert!(form.accused.is_empty());
    }
}

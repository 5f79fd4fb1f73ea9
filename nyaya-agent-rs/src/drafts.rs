//! Saved FIR drafts
//!
//! The record shape handed to whatever persists drafts. Drafts are kept as a
//! JSON array under [`DRAFTS_KEY`], newest first.

use chrono::{Local, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fir::FirForm;
use crate::util::generate_id;

/// Storage key for the draft list
pub const DRAFTS_KEY: &str = "nyaya_fir_drafts";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDraft {
    pub id: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub form_data: FirForm,
    pub content: String,
    pub name: String,
}

impl SavedDraft {
    /// New draft named `"<complainant> - <date>"`
    pub fn new(form_data: FirForm, content: impl Into<String>) -> Self {
        let complainant = form_data.complainant.trim();
        let complainant = if complainant.is_empty() { "FIR" } else { complainant };
        let name = format!("{} - {}", complainant, Local::now().format("%d/%m/%Y"));

        Self {
            id: generate_id(),
            timestamp: Utc::now().timestamp_millis(),
            form_data,
            content: content.into(),
            name,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Insert `draft` at the front of a stored list
///
/// `stored` is the current value under [`DRAFTS_KEY`], `None` when nothing
/// has been saved yet. Returns the value to write back.
pub fn prepend_draft(stored: Option<&str>, draft: SavedDraft) -> Result<String> {
    let mut drafts: Vec<SavedDraft> = match stored {
        Some(raw) if !raw.trim().is_empty() => serde_json::from_str(raw)?,
        _ => Vec::new(),
    };
    drafts.retain(|d| d.id != draft.id);
    drafts.insert(0, draft);
    Ok(serde_json::to_string(&drafts)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(complainant: &str) -> FirForm {
        FirForm {
            complainant: complainant.to_string(),
            ..FirForm::default()
        }
    }

    #[test]
    fn test_default_name_and_wire_shape() {
        let draft = SavedDraft::new(form("Ramesh Kumar"), "FIRST INFORMATION REPORT");
        assert!(draft.name.starts_with("Ramesh Kumar - "));
        assert!(draft.timestamp > 0);

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["formData"]["complainant"], "Ramesh Kumar");
        assert_eq!(json["content"], "FIRST INFORMATION REPORT");
        assert!(json.get("form_data").is_none());

        let unnamed = SavedDraft::new(form("  "), "");
        assert!(unnamed.name.starts_with("FIR - "));
    }

    #[test]
    fn test_prepend_keeps_newest_first() {
        let first = SavedDraft::new(form("A"), "one");
        let second = SavedDraft::new(form("B"), "two").with_name("Second");

        let stored = prepend_draft(None, first.clone()).unwrap();
        let stored = prepend_draft(Some(&stored), second.clone()).unwrap();

        let drafts: Vec<SavedDraft> = serde_json::from_str(&stored).unwrap();
        assert_eq!(drafts, vec![second, first]);

        assert!(prepend_draft(Some("not json"), SavedDraft::new(form("C"), "")).is_err());
    }
}

//! Session language
//!
//! The assistant runs symmetrically in English and Hindi. User-visible
//! strings that the core produces itself are picked per language here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Language of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    /// Code used on the wire and in configuration
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    /// English name used inside model prompts
    pub fn name(self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Hi => "Hindi",
        }
    }

    /// The other language
    pub fn toggle(self) -> Self {
        match self {
            Language::En => Language::Hi,
            Language::Hi => Language::En,
        }
    }

    /// Pick the string matching this language
    pub fn pick<'a>(self, en: &'a str, hi: &'a str) -> &'a str {
        match self {
            Language::En => en,
            Language::Hi => hi,
        }
    }

    /// Shown when the remote service could not be reached
    pub fn apology(self) -> &'static str {
        self.pick(
            "Sorry, a connection issue occurred.",
            "क्षमा करें, समस्या आ गई है।",
        )
    }

    /// First assistant message of every session
    pub fn welcome(self) -> &'static str {
        self.pick(
            "Namaste! I am Nyaya Sahayak. Ask me any question related to Indian Law.",
            "नमस्ते! मैं न्याय सहायक हूँ। मुझसे भारतीय कानून से संबंधित कोई भी प्रश्न पूछें।",
        )
    }

    /// Appended to the agent system instruction so `response_text` comes back
    /// in the session language
    pub fn response_directive(self) -> &'static str {
        self.pick(
            " The user prefers English. Ensure 'response_text' is in English.",
            " The user prefers Hindi. Ensure 'response_text' is in Hindi.",
        )
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "hi" | "hindi" | "हिन्दी" | "हिंदी" => Ok(Language::Hi),
            other => Err(AgentError::validation(format!("Unsupported language: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_toggle() {
        assert_eq!("hi".parse::<Language>().unwrap(), Language::Hi);
        assert_eq!("English".parse::<Language>().unwrap(), Language::En);
        assert!("fr".parse::<Language>().is_err());
        assert_eq!(Language::En.toggle(), Language::Hi);
        assert_eq!(Language::Hi.to_string(), "hi");
    }

    #[test]
    fn test_serde_codes() {
        assert_eq!(serde_json::to_string(&Language::Hi).unwrap(), "\"hi\"");
        let lang: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(lang, Language::En);
    }
}

//! FIR slot-filling dialogue
//!
//! A local state machine over the thirteen [`FirField`]s. One field is asked
//! per turn, every answer is echoed back, and the dialogue only advances on
//! an affirmative reply. Values the remote model extracted out of order are
//! kept as hints and echoed for confirmation when their field comes up.
//!
//! ```text
//! Collecting(f) --answer--> Confirming(f, v) --yes--> Collecting(next) | Summarizing
//!      ^                        |   |
//!      +--------- no -----------+   +--correction--> Confirming(f, v')
//! (too many re-asks) -> ManualEntry(f) --manual value--> Collecting(next) | Summarizing
//! Summarizing --yes--> Complete
//! Summarizing --no + field--> Collecting(field) -> ... -> Summarizing
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use super::fields::{FirField, FirRecord};
use super::prompts;
use crate::error::{AgentError, Result};
use crate::language::Language;

/// Where the dialogue stands
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DialogueState {
    /// Waiting for an answer to `field`
    Collecting { field: FirField },

    /// `candidate` was echoed back and awaits a yes/no
    Confirming { field: FirField, candidate: String },

    /// Re-ask cap reached; only a manual value can move on
    ManualEntry { field: FirField },

    /// All fields confirmed, waiting for the go-ahead
    Summarizing,

    /// Record handed off for generation
    Complete,
}

impl DialogueState {
    /// The field this state is about, if any
    pub fn field(&self) -> Option<FirField> {
        match self {
            DialogueState::Collecting { field }
            | DialogueState::Confirming { field, .. }
            | DialogueState::ManualEntry { field } => Some(*field),
            DialogueState::Summarizing | DialogueState::Complete => None,
        }
    }
}

/// One entry of the confirmation audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub field: FirField,
    pub value: String,
    pub at: DateTime<Utc>,
    /// Entered through the manual fallback rather than confirmed in chat
    pub manual: bool,
    /// Re-confirmation of a field reopened from the summary
    pub amendment: bool,
}

/// How a free-text reply reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Affirm,
    /// Leads with an affirmative and goes on with more text ("yes, Ramesh
    /// Kumar"); holds that text with connectors and filler removed
    AffirmWith(String),
    /// A negative, possibly followed by the corrected value
    Deny { correction: Option<String> },
    /// Anything else, with leading filler ("actually", "it is") removed
    Answer(String),
}

static DENY: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:no|nope|nah|wrong|incorrect|not\s+correct|not\s+right|that'?s\s+(?:wrong|incorrect|not\s+right)|that\s+is\s+(?:wrong|incorrect|not\s+right)|nahi|nahin|galat|नहीं|नही|ना|गलत)(?:\s+है)?(?:[\s,.:;!।-]+|$)(?P<rest>.*)$",
    )
    .ok()
});

static CORRECTION_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:actually|sorry|i\s+meant|i\s+mean|it\s+should\s+be|should\s+be|it\s+is|it's|its|the\s+correct\s+(?:one|value|answer)\s+is|correct\s+(?:one|value)\s+is|वास्तव\s+में|असल\s+में|दरअसल)(?:[\s,:;-]+|$)",
    )
    .ok()
});

const AFFIRM_WORDS: &[&str] = &[
    "yes", "yeah", "yep", "yup", "y", "correct", "right", "ok", "okay", "sure", "confirm",
    "confirmed", "proceed", "generate", "haan", "han", "haa", "ji", "हाँ", "हां", "जी", "सही",
    "ठीक", "बिल्कुल",
];

static NAMED_VALUE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)^\s*the\s+\p{L}+(?:'s)?(?:\s+\p{L}+)?\s+(?:is|should\s+be)\s+").ok());

const CONNECTOR_WORDS: &[&str] = &["but", "and", "though", "however", "lekin", "par", "लेकिन", "पर", "मगर"];

const NEGATIVE_WORDS: &[&str] = &[
    "no", "not", "don't", "dont", "wrong", "incorrect", "change", "wait", "nahi", "nahin", "galat",
    "नहीं", "नही", "गलत", "बदलें", "रुकें",
];

const FILLER_WORDS: &[&str] = &[
    "it", "is", "it's", "its", "that", "that's", "thats", "please", "sir", "madam", "go",
    "ahead", "absolutely", "exactly", "now", "true", "है", "हैं", "करें", "करो", "अब",
];

/// Strip filler like "actually" or "it is" and surrounding quotes
pub fn clean_answer(input: &str) -> String {
    let mut text = input.trim().to_string();
    if let Some(re) = CORRECTION_PREFIX.as_ref() {
        loop {
            let stripped = re.replace(&text, "").trim().to_string();
            if stripped == text || stripped.is_empty() {
                break;
            }
            text = stripped;
        }
    }
    text.trim_matches(|c: char| c == '"' || c == '\'' || c == '“' || c == '”')
        .trim()
        .to_string()
}

fn normalize_token(token: &str) -> String {
    token
        .trim_matches(|c: char| matches!(c, ',' | '.' | '!' | '?' | '।' | ';' | ':' | '-'))
        .to_lowercase()
}

fn is_affirm(token: &str) -> bool {
    AFFIRM_WORDS.contains(&normalize_token(token).as_str())
}

fn is_filler(token: &str) -> bool {
    let token = normalize_token(token);
    token.is_empty() || AFFIRM_WORDS.contains(&token.as_str()) || FILLER_WORDS.contains(&token.as_str())
}

/// True when any word of `input` is a negative
fn has_negative(input: &str) -> bool {
    input
        .split_whitespace()
        .any(|t| NEGATIVE_WORDS.contains(&normalize_token(t).as_str()))
}

/// The text after a leading affirmative, with filler and connectors removed
/// from both ends; `None` when `input` does not start with an affirmative
fn after_affirmative(input: &str) -> Option<String> {
    let mut tokens: Vec<&str> = input.split_whitespace().collect();
    if !tokens.first().is_some_and(|t| is_affirm(t)) {
        return None;
    }

    let lead = tokens
        .iter()
        .take_while(|t| is_filler(t) || CONNECTOR_WORDS.contains(&normalize_token(t).as_str()))
        .count();
    tokens.drain(..lead);
    while tokens.last().is_some_and(|t| is_filler(t)) {
        tokens.pop();
    }

    Some(clean_correction(&tokens.join(" ")))
}

/// True when `text` carries something besides negatives and filler
fn is_meaningful(text: &str) -> bool {
    text.split_whitespace()
        .any(|t| !is_filler(t) && !NEGATIVE_WORDS.contains(&normalize_token(t).as_str()))
}

/// Compare two values ignoring case, spacing and trailing punctuation
pub fn same_value(a: &str, b: &str) -> bool {
    let norm = |s: &str| {
        s.split_whitespace()
            .map(normalize_token)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    };
    norm(&clean_answer(a)) == norm(&clean_answer(b))
}

/// Like [`clean_answer`], also dropping a lead such as "the name is" that
/// only makes sense in a correction
fn clean_correction(input: &str) -> String {
    let text = match NAMED_VALUE.as_ref() {
        Some(re) => re.replace(input, "").to_string(),
        None => input.to_string(),
    };
    clean_answer(&text)
}

/// Classify a reply to an echo or to the final summary
pub fn classify_reply(input: &str) -> Reply {
    let tokens: Vec<&str> = input.split_whitespace().filter(|t| !normalize_token(t).is_empty()).collect();

    let affirmative =
        !tokens.is_empty() && tokens.iter().any(|t| is_affirm(t)) && tokens.iter().all(|t| is_filler(t));
    if affirmative {
        return Reply::Affirm;
    }

    if let Some(rest) = after_affirmative(input) {
        return if rest.is_empty() {
            Reply::Affirm
        } else if !is_meaningful(&rest) {
            Reply::Deny { correction: None }
        } else {
            Reply::AffirmWith(rest)
        };
    }

    if let Some(caps) = DENY.as_ref().and_then(|re| re.captures(input)) {
        let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or_default();
        let correction = clean_correction(rest);
        return Reply::Deny {
            correction: is_meaningful(&correction).then_some(correction),
        };
    }

    Reply::Answer(clean_answer(input))
}

/// Local FIR collection state machine
#[derive(Debug, Clone)]
pub struct FirDialogue {
    language: Language,
    state: DialogueState,
    record: FirRecord,
    hints: HashMap<FirField, String>,
    reasks: HashMap<FirField, u32>,
    max_reasks: u32,
    audit: Vec<Confirmation>,
    reopened: bool,
}

impl FirDialogue {
    /// Start a dialogue; returns it with the opening prompt
    ///
    /// `hints` are out-of-order values keyed by canonical field name; unknown
    /// keys are ignored.
    pub fn start<I, K, V>(language: Language, max_reasks: u32, hints: I) -> (Self, String)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut dialogue = Self {
            language,
            state: DialogueState::Collecting {
                field: FirField::ComplainantName,
            },
            record: FirRecord::new(),
            hints: HashMap::new(),
            reasks: HashMap::new(),
            max_reasks,
            audit: Vec::new(),
            reopened: false,
        };
        dialogue.add_hints(hints);

        let first = dialogue.enter(FirField::ComplainantName);
        info!(hints = dialogue.hints.len(), "FIR dialogue started");
        let prompt = format!("{}\n\n{}", prompts::intro(language), first);
        (dialogue, prompt)
    }

    /// Record out-of-order values; already confirmed fields are not touched
    pub fn add_hints<I, K, V>(&mut self, hints: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in hints {
            let Some(field) = FirField::from_key(key.as_ref()) else {
                debug!(key = key.as_ref(), "ignoring unknown FIR hint");
                continue;
            };
            let value = value.into();
            if self.record.get(field).is_none() && !value.trim().is_empty() {
                self.hints.insert(field, value.trim().to_string());
            }
        }
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn record(&self) -> &FirRecord {
        &self.record
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Confirmations in the order they happened
    pub fn audit_log(&self) -> &[Confirmation] {
        &self.audit
    }

    pub fn is_complete(&self) -> bool {
        self.state == DialogueState::Complete
    }

    /// The field currently being collected or confirmed
    pub fn current_field(&self) -> Option<FirField> {
        self.state.field()
    }

    /// Re-asks spent on a field so far
    pub fn reasks(&self, field: FirField) -> u32 {
        self.reasks.get(&field).copied().unwrap_or(0)
    }

    /// The prompt for the current state, without changing anything
    pub fn current_prompt(&self) -> String {
        match &self.state {
            DialogueState::Collecting { field } => prompts::ask(*field, self.language),
            DialogueState::Confirming { field, candidate } => prompts::echo(*field, candidate, self.language),
            DialogueState::ManualEntry { field } => prompts::manual_entry(*field, self.language),
            DialogueState::Summarizing => prompts::summary(&self.record, self.language),
            DialogueState::Complete => prompts::already_complete(self.language).to_string(),
        }
    }

    /// Advance on one user utterance and return the next prompt
    pub fn handle(&mut self, input: &str) -> String {
        let language = self.language;
        let state = self.state.clone();

        match state {
            DialogueState::Collecting { field } => {
                let answer = clean_answer(input);
                if answer.is_empty() {
                    return self.reask(field, prompts::empty_answer(language));
                }
                self.propose(field, answer)
            }
            DialogueState::Confirming { field, candidate } => match classify_reply(input) {
                Reply::Affirm => self.confirm(field, candidate, false),
                Reply::AffirmWith(value) if same_value(&value, &candidate) => {
                    self.confirm(field, candidate, false)
                }
                Reply::AffirmWith(value) => {
                    if self.bump(field) {
                        return self.to_manual(field);
                    }
                    self.propose(field, value)
                }
                Reply::Deny { correction: Some(value) } | Reply::Answer(value) if !value.is_empty() => {
                    if self.bump(field) {
                        return self.to_manual(field);
                    }
                    self.propose(field, value)
                }
                Reply::Deny { .. } | Reply::Answer(_) => self.reask(field, prompts::retry(language)),
            },
            DialogueState::ManualEntry { field } => prompts::manual_entry(field, language),
            DialogueState::Summarizing => match classify_reply(input) {
                Reply::Affirm => self.complete(),
                reply => match FirField::mentioned_in(input) {
                    Some(field) => self.reopen(field),
                    None if matches!(reply, Reply::AffirmWith(_)) && !has_negative(input) => self.complete(),
                    None => format!(
                        "{}\n\n{}",
                        prompts::summary_unclear(language),
                        prompts::confirm_generate(language)
                    ),
                },
            },
            DialogueState::Complete => prompts::already_complete(language).to_string(),
        }
    }

    fn complete(&mut self) -> String {
        self.state = DialogueState::Complete;
        info!(fields = self.record.len(), "FIR dialogue complete");
        prompts::generating(self.language).to_string()
    }

    /// Leave manual entry with a structured value
    pub fn supply_manual(&mut self, field: FirField, value: &str) -> Result<String> {
        match self.state {
            DialogueState::ManualEntry { field: expected } if expected == field => {}
            _ => {
                return Err(AgentError::validation(format!(
                    "{} is not awaiting manual entry",
                    field.key()
                )))
            }
        }

        let value = value.trim();
        if value.is_empty() {
            return Err(AgentError::validation(format!("{} must not be empty", field.key())));
        }

        Ok(self.confirm(field, value.to_string(), true))
    }

    fn enter(&mut self, field: FirField) -> String {
        match self.hints.remove(&field) {
            Some(hint) => {
                let prompt = prompts::echo_hint(field, &hint, self.language);
                self.state = DialogueState::Confirming { field, candidate: hint };
                prompt
            }
            None => {
                self.state = DialogueState::Collecting { field };
                prompts::ask(field, self.language)
            }
        }
    }

    fn propose(&mut self, field: FirField, candidate: String) -> String {
        let prompt = prompts::echo(field, &candidate, self.language);
        self.state = DialogueState::Confirming { field, candidate };
        prompt
    }

    fn confirm(&mut self, field: FirField, value: String, manual: bool) -> String {
        debug!(field = field.key(), manual, "FIR field confirmed");
        self.record.set(field, value.clone());
        self.hints.remove(&field);
        self.audit.push(Confirmation {
            field,
            value,
            at: Utc::now(),
            manual,
            amendment: self.reopened,
        });

        let noted = prompts::noted(field, self.language);
        let next = if self.reopened {
            self.reopened = false;
            None
        } else {
            field.next()
        };

        let next = next.or_else(|| self.record.missing().first().copied());
        let prompt = match next {
            Some(next) => self.enter(next),
            None => {
                self.state = DialogueState::Summarizing;
                prompts::summary(&self.record, self.language)
            }
        };
        format!("{} {}", noted, prompt)
    }

    /// Count one re-ask; true once the cap is exceeded
    fn bump(&mut self, field: FirField) -> bool {
        let count = self.reasks.entry(field).or_insert(0);
        *count += 1;
        *count > self.max_reasks
    }

    fn reask(&mut self, field: FirField, lead: &str) -> String {
        if self.bump(field) {
            return self.to_manual(field);
        }
        self.state = DialogueState::Collecting { field };
        format!("{} {}", lead, prompts::ask(field, self.language))
    }

    fn to_manual(&mut self, field: FirField) -> String {
        info!(field = field.key(), "re-ask cap reached, switching to manual entry");
        self.state = DialogueState::ManualEntry { field };
        prompts::manual_entry(field, self.language)
    }

    fn reopen(&mut self, field: FirField) -> String {
        debug!(field = field.key(), "reopening FIR field from summary");
        self.reopened = true;
        self.reasks.remove(&field);
        self.state = DialogueState::Collecting { field };
        prompts::ask(field, self.language)
    }
}

//! First Information Report collection
//!
//! - [`fields`]: the thirteen ordered fields and the record they fill
//! - [`dialogue`]: the local slot-filling state machine
//! - [`form`]: the structured single-form entry point and its validation

pub mod dialogue;
pub mod fields;
pub mod form;
mod prompts;

pub use dialogue::{classify_reply, Confirmation, DialogueState, FirDialogue, Reply};
pub use fields::{FirField, FirRecord};
pub use form::{FirForm, FormErrors, FormField, IncidentType};

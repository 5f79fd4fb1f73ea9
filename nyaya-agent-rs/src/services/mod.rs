//! Service-specific client implementations
//!
//! This module contains the client for the remote generation service.

pub mod gemini;
mod common;

pub use common::UserAgent;

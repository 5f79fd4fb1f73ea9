//! Cross-module tests
//!
//! Scenario tests drive a whole session against a mocked generator; the
//! Gemini tests run the real client against a WireMock server.

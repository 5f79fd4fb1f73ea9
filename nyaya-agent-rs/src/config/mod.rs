//! Configuration management for the agent core
//!
//! This module provides utilities for loading and validating configuration
//! for the generation client and the dialogue layer, with support for
//! environment variables.

use std::collections::HashMap;
use std::env;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::language::Language;
use crate::util::parse_duration;

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get an integer configuration value
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value
            .trim()
            .parse::<i64>()
            .map_err(|e| AgentError::configuration(format!("Invalid integer for key {}: {}", key, e)))
    }

    /// Get a duration configuration value ("30s", "2m", "500ms")
    fn get_duration(&self, key: &str) -> Result<Duration> {
        let value = self.get_string(key)?;
        parse_duration(&value)
            .ok_or_else(|| AgentError::configuration(format!("Invalid duration for key {}: {}", key, value)))
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_string(key).unwrap_or_else(|_| default.to_string())
    }

    /// Get an integer configuration value with a default
    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    /// Get a duration configuration value with a default
    fn get_duration_or(&self, key: &str, default: Duration) -> Duration {
        self.get_duration(key).unwrap_or(default)
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,

    /// Optional namespace for variables (e.g., "GEMINI")
    namespace: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set a namespace for environment variables
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Format a configuration key as an environment variable
    fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        if let Some(ref namespace) = self.namespace {
            env_key.push_str(namespace);
            env_key.push('_');
        }

        // Uppercase and replace non-alphanumeric with underscores
        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key).map_err(|e| match e {
            env::VarError::NotPresent => {
                AgentError::configuration(format!("Environment variable not set: {}", env_key))
            }
            env::VarError::NotUnicode(_) => AgentError::configuration(format!(
                "Environment variable is not valid unicode: {}",
                env_key
            )),
        })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| AgentError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// A composite config provider that tries multiple providers in order
#[derive(Debug, Clone, Default)]
pub struct CompositeConfigProvider<P: ConfigProvider> {
    providers: Vec<P>,
}

impl<P: ConfigProvider> CompositeConfigProvider<P> {
    /// Create a new composite config provider
    pub fn new() -> Self {
        Self { providers: Vec::new() }
    }

    /// Add a provider to the chain
    pub fn add_provider(&mut self, provider: P) {
        self.providers.push(provider);
    }

    /// Create a new provider with an initial list
    pub fn with_providers(providers: Vec<P>) -> Self {
        Self { providers }
    }
}

impl<P: ConfigProvider> ConfigProvider for CompositeConfigProvider<P> {
    fn get_string(&self, key: &str) -> Result<String> {
        for provider in &self.providers {
            if let Ok(value) = provider.get_string(key) {
                return Ok(value);
            }
        }

        Err(AgentError::configuration(format!(
            "Configuration key not found in any provider: {}",
            key
        )))
    }
}

/// Global default configuration provider
///
/// Looks up `NYAYA_<KEY>` first, then the bare `<KEY>` (so a plain
/// `GEMINI_API_KEY` in the environment is honoured).
pub static DEFAULT_PROVIDER: Lazy<Arc<CompositeConfigProvider<EnvConfigProvider>>> = Lazy::new(|| {
    Arc::new(CompositeConfigProvider::with_providers(vec![
        EnvConfigProvider::new().with_prefix("NYAYA"),
        EnvConfigProvider::new(),
    ]))
});

/// Trait for component configuration
pub trait ServiceConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;

    /// Service name
    fn service_name(&self) -> &str;
}

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_REASONING_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_FAST_MODEL: &str = "gemini-3-flash-preview";

/// Configuration for the Generative Language API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key
    pub api_key: String,

    /// Base URL (can be changed for proxies and tests)
    pub base_url: String,

    /// Model used for chat turns and document generation
    pub reasoning_model: String,

    /// Model used for translation
    pub fast_model: String,

    /// Per-attempt timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,

    /// Retries after the first attempt
    pub max_retries: u32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            reasoning_model: DEFAULT_REASONING_MODEL.to_string(),
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 1,
        }
    }
}

impl GeminiConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();

        let api_key = provider.get_string("gemini_api_key").map_err(|_| {
            AgentError::configuration("Gemini API key is required (set NYAYA_GEMINI_API_KEY)")
        })?;
        let base_url = provider.get_string_or("gemini_base_url", &defaults.base_url);
        let reasoning_model = provider.get_string_or("gemini_reasoning_model", &defaults.reasoning_model);
        let fast_model = provider.get_string_or("gemini_fast_model", &defaults.fast_model);
        let timeout = provider.get_duration_or("gemini_timeout", defaults.timeout);
        let max_retries = provider.get_int_or("gemini_max_retries", defaults.max_retries as i64);

        let config = Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            reasoning_model,
            fast_model,
            timeout,
            max_retries: max_retries.max(0) as u32,
        };

        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for GeminiConfig {
    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AgentError::configuration("Gemini API key is required"));
        }

        url::Url::parse(&self.base_url)
            .map_err(|e| AgentError::configuration(format!("Invalid Gemini base URL {}: {}", self.base_url, e)))?;

        if self.reasoning_model.is_empty() || self.fast_model.is_empty() {
            return Err(AgentError::configuration("Gemini model names must not be empty"));
        }

        if self.timeout.is_zero() {
            return Err(AgentError::configuration("Gemini timeout must be positive"));
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "gemini"
    }
}

/// Configuration for the conversational layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// How many times a single FIR field may be re-asked before manual entry
    pub max_reasks: u32,

    /// Language a new session starts in
    pub default_language: Language,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_reasks: 3,
            default_language: Language::En,
        }
    }
}

impl DialogueConfig {
    /// Load configuration from a config provider; every key is optional
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let defaults = Self::default();

        let max_reasks = provider.get_int_or("dialogue_max_reasks", defaults.max_reasks as i64);
        let default_language = match provider.get_string("dialogue_language") {
            Ok(value) => value.parse::<Language>().map_err(|e| {
                AgentError::configuration(format!("Invalid value for key dialogue_language: {}", e))
            })?,
            Err(_) => defaults.default_language,
        };

        let config = Self {
            max_reasks: max_reasks.max(0) as u32,
            default_language,
        };

        config.validate()?;
        Ok(config)
    }
}

impl ServiceConfig for DialogueConfig {
    fn validate(&self) -> Result<()> {
        if self.max_reasks == 0 {
            return Err(AgentError::configuration("dialogue re-ask cap must be at least 1"));
        }
        Ok(())
    }

    fn service_name(&self) -> &str {
        "dialogue"
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

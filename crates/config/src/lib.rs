//! Configuration loading, validation, and management for fraudhound.
//!
//! Loads configuration from a TOML file with `FRAUDHOUND_*` environment
//! variable overrides. Validates all settings at startup so the engine
//! never runs with an out-of-range threshold or a zero iteration budget.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Configuration errors surfaced at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reasoning / classification capability endpoint settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Investigation loop parameters.
    #[serde(default)]
    pub engine: EngineConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Log level filter used when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            engine: EngineConfig::default(),
            gateway: GatewayConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider", &self.provider)
            .field("engine", &self.engine)
            .field("gateway", &self.gateway)
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Settings for the outbound LLM capability client.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key for the reasoning endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OpenAI-compatible base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model name sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature — low for judgment consistency.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.2
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            temperature: default_temperature(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Investigation loop parameters.
///
/// The stagnation cutoff and synthesis threshold are empirically chosen
/// operating points; they are configuration, not constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Hard budget of Observe→Think→Act cycles.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Confidence at which a synthesis recommendation ends the loop.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Iterations after which persistently low confidence ends the loop.
    #[serde(default = "default_stagnation_window")]
    pub stagnation_window: u32,

    /// The "persistently low" confidence bound for the stagnation cutoff.
    #[serde(default = "default_stagnation_confidence")]
    pub stagnation_confidence: f64,

    /// How many trailing steps are shown to the reasoner each cycle.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Deadline for any single external call (reasoning or tool), seconds.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

fn default_max_iterations() -> u32 {
    10
}
fn default_confidence_threshold() -> f64 {
    0.7
}
fn default_stagnation_window() -> u32 {
    5
}
fn default_stagnation_confidence() -> f64 {
    0.3
}
fn default_history_window() -> usize {
    5
}
fn default_call_timeout_secs() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            confidence_threshold: default_confidence_threshold(),
            stagnation_window: default_stagnation_window(),
            stagnation_confidence: default_stagnation_confidence(),
            history_window: default_history_window(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

/// HTTP gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8460
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, then apply environment overrides and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config: AppConfig = toml::from_str(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a file.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables take precedence over file values.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("FRAUDHOUND_API_KEY") {
            if !key.is_empty() {
                self.provider.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("FRAUDHOUND_API_URL") {
            if !url.is_empty() {
                self.provider.api_url = url;
            }
        }
        if let Ok(model) = std::env::var("FRAUDHOUND_MODEL") {
            if !model.is_empty() {
                self.provider.model = model;
            }
        }
        if let Ok(port) = std::env::var("FRAUDHOUND_PORT") {
            if let Ok(port) = port.parse() {
                self.gateway.port = port;
            }
        }
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.max_iterations == 0 {
            return Err(ConfigError::Invalid("max_iterations must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.engine.confidence_threshold) {
            return Err(ConfigError::Invalid(
                "confidence_threshold must be within [0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.engine.stagnation_confidence) {
            return Err(ConfigError::Invalid(
                "stagnation_confidence must be within [0, 1]".into(),
            ));
        }
        if self.engine.call_timeout_secs == 0 {
            return Err(ConfigError::Invalid("call_timeout_secs must be at least 1".into()));
        }
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::Invalid(
                "temperature must be within [0, 2]".into(),
            ));
        }
        Ok(())
    }
}

//! Model Router for completion calls
//!
//! Decides which models a completion may use and in what order:
//! - Primary model, then an optional fallback model
//! - Bounded retries per model, each attempt under a timeout
//! - Health tracking (consecutive failures skip a model until it recovers)
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/tilbod/config/models.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/models.toml");

/// Completion model configuration
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model tried first
    pub primary_model: String,
    /// Model tried when the primary is exhausted
    pub fallback_model: Option<String>,
    /// Timeout for one completion call
    pub timeout: Duration,
    /// Retries per model after the first attempt
    pub max_retries: u32,
    /// Consecutive failures before a model is skipped
    pub failure_threshold: u32,
    /// Time before a skipped model is tried again
    pub recovery_wait: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            primary_model: "gemma3".to_string(),
            fallback_model: Some("llama3.2".to_string()),
            timeout: Duration::from_secs(60),
            max_retries: 1,
            failure_threshold: 3,
            recovery_wait: Duration::from_secs(300),
        }
    }
}

/// Health status of a model
#[derive(Debug, Default)]
struct ModelHealth {
    /// Number of consecutive failures
    failures: u32,
    /// When the model crossed the failure threshold
    unhealthy_since: Option<Instant>,
}

/// Model Router for primary/fallback selection
#[derive(Debug)]
pub struct ModelRouter {
    config: ModelConfig,
    health: HashMap<String, ModelHealth>,
}

impl ModelRouter {
    /// Create a new model router with default configuration
    pub fn new() -> Result<Self> {
        Ok(Self::with_config(load_config()?))
    }

    /// Create with an explicit configuration (for testing)
    pub fn with_config(config: ModelConfig) -> Self {
        Self {
            config,
            health: HashMap::new(),
        }
    }

    /// Replace the primary model (e.g. from OLLAMA_MODEL)
    pub fn set_primary_model(&mut self, model: &str) {
        self.config.primary_model = model.to_string();
    }

    /// Models to try, in order. An unhealthy primary is skipped when a
    /// fallback exists; with no healthy model the primary is returned anyway.
    pub fn candidates(&self) -> Vec<String> {
        let mut models = Vec::with_capacity(2);
        if self.is_healthy(&self.config.primary_model) {
            models.push(self.config.primary_model.clone());
        }
        if let Some(ref fallback) = self.config.fallback_model {
            if fallback != &self.config.primary_model && self.is_healthy(fallback) {
                models.push(fallback.clone());
            }
        }
        if models.is_empty() {
            models.push(self.config.primary_model.clone());
        }
        models
    }

    /// Record a successful call
    pub fn record_success(&mut self, model: &str) {
        let health = self.health.entry(model.to_string()).or_default();
        health.failures = 0;
        health.unhealthy_since = None;
    }

    /// Record a failed call, returns true if model is now unhealthy
    pub fn record_failure(&mut self, model: &str) -> bool {
        let threshold = self.config.failure_threshold;
        let health = self.health.entry(model.to_string()).or_default();
        health.failures += 1;
        if health.failures >= threshold && health.unhealthy_since.is_none() {
            health.unhealthy_since = Some(Instant::now());
        }
        health.failures >= threshold
    }

    /// Check if a model is considered healthy
    pub fn is_healthy(&self, model: &str) -> bool {
        match self.health.get(model) {
            Some(health) if health.failures >= self.config.failure_threshold => health
                .unhealthy_since
                .is_some_and(|since| since.elapsed() >= self.config.recovery_wait),
            _ => true,
        }
    }

    /// Get the router configuration
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

impl Default for ModelRouter {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_config(ModelConfig::default()))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tilbod").join("config").join("models.toml"))
}

/// Load configuration (override first, then default)
fn load_config() -> Result<ModelConfig> {
    let content = match default_config_path() {
        Some(path) if path.exists() => fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read model config: {}", e)))?,
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    defaults: Option<RawDefaults>,
    health: Option<RawHealth>,
}

#[derive(Debug, Deserialize)]
struct RawDefaults {
    model: Option<String>,
    fallback_model: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawHealth {
    failure_threshold: Option<u32>,
    recovery_wait_secs: Option<u64>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<ModelConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid model config TOML: {}", e)))?;

    let mut config = ModelConfig::default();

    if let Some(defaults) = raw.defaults {
        if let Some(model) = defaults.model {
            config.primary_model = model;
        }
        if let Some(fallback) = defaults.fallback_model {
            // An empty string disables the fallback
            config.fallback_model = (!fallback.is_empty()).then_some(fallback);
        }
        if let Some(timeout) = defaults.timeout_secs {
            config.timeout = Duration::from_secs(timeout);
        }
        if let Some(retries) = defaults.max_retries {
            config.max_retries = retries;
        }
    }

    if let Some(health) = raw.health {
        if let Some(threshold) = health.failure_threshold {
            config.failure_threshold = threshold.max(1);
        }
        if let Some(wait) = health.recovery_wait_secs {
            config.recovery_wait = Duration::from_secs(wait);
        }
    }

    Ok(config)
}

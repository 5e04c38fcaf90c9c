//! Mock backend for testing
//!
//! Returns canned responses chosen by prompt substring, can be told to fail
//! or stall, and records every call so tests can inspect the prompts sent.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::model_router::{ModelConfig, ModelRouter};

use super::CompletionBackend;

/// Mock completion backend
///
/// Clones share the call log, so a test can keep one handle and give another
/// to the code under test.
#[derive(Clone)]
pub struct MockBackend {
    /// (prompt substring, response), first match wins
    responses: Vec<(String, String)>,
    default_response: String,
    failing_models: HashSet<String>,
    fail_all: bool,
    delay: Option<Duration>,
    /// Whether health_check should return true
    pub healthy: bool,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    router: Arc<RwLock<ModelRouter>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy, answers "[]")
    pub fn new() -> Self {
        Self::with_config(ModelConfig {
            primary_model: "mock".to_string(),
            fallback_model: Some("mock-fallback".to_string()),
            timeout: Duration::from_secs(5),
            max_retries: 0,
            ..Default::default()
        })
    }

    /// Create with an explicit model configuration
    pub fn with_config(config: ModelConfig) -> Self {
        Self {
            responses: Vec::new(),
            default_response: "[]".to_string(),
            failing_models: HashSet::new(),
            fail_all: false,
            delay: None,
            healthy: true,
            calls: Arc::new(Mutex::new(Vec::new())),
            router: Arc::new(RwLock::new(ModelRouter::with_config(config))),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Answer `response` to any prompt containing `needle`
    pub fn with_response(mut self, needle: &str, response: &str) -> Self {
        self.responses.push((needle.to_string(), response.to_string()));
        self
    }

    /// Answer for prompts matching no needle
    pub fn with_default_response(mut self, response: &str) -> Self {
        self.default_response = response.to_string();
        self
    }

    /// Every call fails
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Calls against `model` fail
    pub fn failing_model(mut self, model: &str) -> Self {
        self.failing_models.insert(model.to_string());
        self
    }

    /// Sleep before answering (for timeout tests)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every (model, prompt) received so far
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, prompt)| prompt).collect()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((model.to_string(), prompt.to_string()));
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_all || self.failing_models.contains(model) {
            return Err(Error::Completion(format!("mock failure for {}", model)));
        }

        let response = self
            .responses
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, response)| response.clone())
            .unwrap_or_else(|| self.default_response.clone());
        Ok(response)
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }

    fn router(&self) -> &Arc<RwLock<ModelRouter>> {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_responses() {
        let mock = MockBackend::new()
            .with_response("KFC", "[{\"name\": \"Fata\"}]")
            .with_default_response("{}");

        assert_eq!(mock.generate("mock", "offers from KFC").await.unwrap(), "[{\"name\": \"Fata\"}]");
        assert_eq!(mock.generate("mock", "something else").await.unwrap(), "{}");
        assert_eq!(mock.prompts().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let mock = MockBackend::new().failing_model("bad");
        assert!(mock.generate("bad", "x").await.is_err());
        assert!(mock.generate("good", "x").await.is_ok());
    }

    #[tokio::test]
    async fn test_unhealthy() {
        assert!(!MockBackend::unhealthy().health_check().await);
    }
}

//! Ollama backend implementation
//!
//! HTTP client for the Ollama generate API. Model choice comes from the
//! model router (see `config/models.toml`).

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::model_router::ModelRouter;

use super::CompletionBackend;

/// Ollama backend with model router integration
///
/// # Configuration
///
/// Configure models via `~/.local/share/tilbod/config/models.toml`:
///
/// ```toml
/// [defaults]
/// model = "gemma3"
/// fallback_model = "llama3.2"
/// timeout_secs = 60
/// ```
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    router: Arc<RwLock<ModelRouter>>,
}

impl OllamaBackend {
    /// Create a new Ollama backend with `model` as the primary model
    pub fn new(base_url: &str, model: &str) -> Self {
        let mut router = ModelRouter::default();
        router.set_primary_model(model);
        Self::with_router(base_url, router)
    }

    /// Create with a custom router
    pub fn with_router(base_url: &str, router: ModelRouter) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            router: Arc::new(RwLock::new(router)),
        }
    }

    /// Create from environment variables
    ///
    /// Required: `OLLAMA_HOST`. Optional: `OLLAMA_MODEL` replaces the
    /// configured primary model.
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        Some(match std::env::var("OLLAMA_MODEL") {
            Ok(model) => Self::new(&host, &model),
            Err(_) => Self::with_router(&host, ModelRouter::default()),
        })
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let request = OllamaRequest {
            model,
            prompt,
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let ollama_response: OllamaResponse = response.json().await?;
        debug!(
            model = %model,
            chars = ollama_response.response.len(),
            "Ollama response"
        );

        Ok(ollama_response.response)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn host(&self) -> &str {
        &self.base_url
    }

    fn router(&self) -> &Arc<RwLock<ModelRouter>> {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let backend = OllamaBackend::new("http://localhost:11434/", "gemma3");
        assert_eq!(backend.host(), "http://localhost:11434");
    }

    #[test]
    fn test_model_overrides_primary() {
        let backend = OllamaBackend::new("http://localhost:11434", "qwen2.5");
        assert_eq!(backend.models()[0], "qwen2.5");
    }

    #[test]
    fn test_request_shape() {
        let request = OllamaRequest {
            model: "gemma3",
            prompt: "hæ",
            stream: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gemma3");
        assert_eq!(json["stream"], false);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unhealthy() {
        let backend = OllamaBackend::new("http://127.0.0.1:9", "gemma3");
        assert!(!backend.health_check().await);
    }
}

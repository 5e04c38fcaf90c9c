//! Pluggable completion backend abstraction
//!
//! The extraction pipeline only ever needs `complete(prompt) -> text`; model
//! choice, timeouts and fallback live behind that call.
//!
//! # Architecture
//!
//! - `CompletionBackend` trait: one raw `generate` call per backend, plus the
//!   shared `complete` that walks the model router
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! // Create from environment
//! let ai = AIClient::from_env();
//!
//! if let Some(ref client) = ai {
//!     let text = client.complete("Return [] as JSON").await?;
//! }
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, openai_compatible, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Primary model name (default: from models.toml)
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required for openai_compatible backend)
//! - `OPENAI_COMPATIBLE_MODEL`: Primary model name (default: from models.toml)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

mod mock;
mod ollama;
mod openai_compatible;
pub mod parsing;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model_router::ModelRouter;

/// Trait defining the interface for all completion backends
///
/// Backends implement `generate`; `complete` is shared and applies the
/// router's candidate order, per-attempt timeout and retry bound.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// One completion request against a specific model
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;

    /// Router shared by clones of this backend
    fn router(&self) -> &Arc<RwLock<ModelRouter>>;

    /// Primary model, then fallback; each model gets `1 + max_retries`
    /// attempts under the configured timeout. Errors with
    /// `Error::Completion` once every attempt failed.
    async fn complete(&self, prompt: &str) -> Result<String> {
        let (candidates, timeout, retries) = {
            let router = self
                .router()
                .read()
                .map_err(|_| Error::Completion("Failed to acquire model router lock".into()))?;
            (
                router.candidates(),
                router.config().timeout,
                router.config().max_retries,
            )
        };

        let mut last_error = String::from("no model configured");
        for model in &candidates {
            for attempt in 1..=retries + 1 {
                let error = match tokio::time::timeout(timeout, self.generate(model, prompt)).await
                {
                    Ok(Ok(text)) => {
                        record_outcome(self.router(), model, true);
                        debug!(model = %model, attempt, chars = text.len(), "Completion succeeded");
                        return Ok(text);
                    }
                    Ok(Err(e)) => e.to_string(),
                    Err(_) => format!("timed out after {:?}", timeout),
                };
                record_outcome(self.router(), model, false);
                warn!(model = %model, attempt, error = %error, "Completion attempt failed");
                last_error = format!("{}: {}", model, error);
            }
        }

        Err(Error::Completion(last_error))
    }

    /// Models `complete` would try right now
    fn models(&self) -> Vec<String> {
        self.router()
            .read()
            .map(|router| router.candidates())
            .unwrap_or_default()
    }
}

fn record_outcome(router: &RwLock<ModelRouter>, model: &str, success: bool) {
    if let Ok(mut router) = router.write() {
        if success {
            router.record_success(model);
        } else if router.record_failure(model) {
            warn!(model = %model, "Model marked unhealthy");
        }
    }
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// OpenAI-compatible backend (vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from environment variables
    ///
    /// Checks `AI_BACKEND` to determine which backend to use:
    /// - `ollama` (default): Uses OLLAMA_HOST and OLLAMA_MODEL
    /// - `openai_compatible`: Uses OPENAI_COMPATIBLE_HOST and OPENAI_COMPATIBLE_MODEL
    /// - `mock`: Creates a mock backend for testing
    ///
    /// Returns None if the required environment variables are not set.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(AIClient::Ollama),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env().map(AIClient::OpenAICompatible)
            }
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(AIClient::Ollama)
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Short backend name (for logging)
    pub fn kind(&self) -> &'static str {
        match self {
            AIClient::Ollama(_) => "ollama",
            AIClient::OpenAICompatible(_) => "openai_compatible",
            AIClient::Mock(_) => "mock",
        }
    }
}

// Implement CompletionBackend for AIClient by delegating to the inner backend
#[async_trait]
impl CompletionBackend for AIClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        match self {
            AIClient::Ollama(b) => b.generate(model, prompt).await,
            AIClient::OpenAICompatible(b) => b.generate(model, prompt).await,
            AIClient::Mock(b) => b.generate(model, prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }

    fn router(&self) -> &Arc<RwLock<ModelRouter>> {
        match self {
            AIClient::Ollama(b) => b.router(),
            AIClient::OpenAICompatible(b) => b.router(),
            AIClient::Mock(b) => b.router(),
        }
    }
}

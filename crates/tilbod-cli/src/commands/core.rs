//! Shared utilities for commands
//!
//! - `open_vocabulary` - Load the food vocabulary from a file or the data dir
//! - `build_extractor` - Pick the food item extractor for a run

use std::path::Path;

use anyhow::{bail, Context, Result};
use tilbod_core::vocabulary::VocabularyStore;
use tilbod_core::{
    AIClient, FoodExtractor, JsonFileStore, LlmFoodExtractor, MemoryStore, PromptLibrary,
    RegexFoodExtractor, VocabularyRepository,
};
use tracing::warn;

use crate::cli::ExtractorKind;

/// Vocabulary store for an explicit path, else the data dir, else memory
pub fn vocabulary_store(path: Option<&Path>) -> Box<dyn VocabularyStore> {
    match path {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => match JsonFileStore::default_location() {
            Some(store) => Box::new(store),
            None => {
                warn!("No data directory available, new food types will not be saved");
                Box::new(MemoryStore::new())
            }
        },
    }
}

pub fn open_vocabulary(path: Option<&Path>) -> Result<VocabularyRepository> {
    VocabularyRepository::load(vocabulary_store(path)).context("Failed to load food vocabulary")
}

/// Build the food item extractor; `llm` needs a configured backend
pub fn build_extractor(
    kind: ExtractorKind,
    client: Option<&AIClient>,
    prompts: &mut PromptLibrary,
) -> Result<Box<dyn FoodExtractor>> {
    match (kind, client) {
        (ExtractorKind::Regex, _) => Ok(Box::new(RegexFoodExtractor::new())),
        (ExtractorKind::Llm, Some(client)) => {
            let extractor = LlmFoodExtractor::new(client.clone(), prompts)
                .context("Failed to load food item prompt")?
                .with_regex_fallback();
            Ok(Box::new(extractor))
        }
        (ExtractorKind::Llm, None) => bail!(
            "--extractor llm needs a completion backend (set OLLAMA_HOST, or AI_BACKEND with its host)"
        ),
    }
}

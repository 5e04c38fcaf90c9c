//! Tilbod Core Library
//!
//! Shared functionality for the tilbod restaurant offer scraper:
//! - Field extractors (price, weekdays, hours, pickup/delivery, people count)
//! - Source adapters with an ordered structural -> heuristic -> AI fallback
//! - Food item extraction (regex lexicon or completion-backed)
//! - Meal classification and display enrichment
//! - Controlled food vocabulary with a single-writer repository
//! - Pluggable completion backends (Ollama, OpenAI-compatible, mock)
//! - Model router with primary/fallback selection and health tracking
//! - Prompt library for customizable prompts
//! - Orchestrator, persistence projection and snapshot export

pub mod ai;
pub mod classify;
pub mod display;
pub mod error;
pub mod export;
pub mod fields;
pub mod food;
pub mod model_router;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod sources;
pub mod vocabulary;

pub use ai::{AIClient, CompletionBackend, MockBackend, OllamaBackend, OpenAICompatibleBackend};
pub use classify::classify;
pub use display::enrich;
pub use error::{Error, Result};
pub use export::{
    export_offers_csv, ExportFormat, MemorySink, OfferSink, PersistedFoodItem, PersistedOffer,
    Snapshot,
};
pub use food::{FoodExtractor, FoodInfo, LlmFoodExtractor, RegexFoodExtractor};
pub use model_router::{ModelConfig, ModelRouter};
pub use models::{
    ChoiceSet, EnhancedOffer, FoodCategory, FoodItem, MealType, PickupDelivery, RawOffer, Size,
    SizeUnit, StandardizedTag, Weekday,
};
pub use pipeline::{Orchestrator, PipelineConfig, Progress, RestaurantOutcome, RunReport};
pub use prompts::{Prompt, PromptHeader, PromptId, PromptLibrary, PromptOrigin};
pub use sources::{
    load_restaurants, AiSource, HttpFetcher, Page, PageFetcher, RestaurantConfig, StaticFetcher,
    StrategyChain, StrategyKind,
};
pub use vocabulary::{JsonFileStore, MemoryStore, VocabularyRepository, VocabularyStore};

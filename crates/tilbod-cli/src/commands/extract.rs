//! Single-offer extraction command, for trying extractors on a piece of text

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tilbod_core::sources::postprocess::finalize;
use tilbod_core::{
    enrich, AIClient, EnhancedOffer, FoodExtractor, PromptLibrary, RawOffer, RestaurantConfig,
    VocabularyRepository,
};

use super::core::{build_extractor, open_vocabulary};
use crate::cli::ExtractorKind;

/// Field extraction, food extraction and enrichment for one offer
pub async fn extract_offer(
    name: &str,
    text: &str,
    restaurant: &str,
    extractor: &dyn FoodExtractor,
    vocabulary: &mut VocabularyRepository,
) -> Result<EnhancedOffer> {
    let offer = RawOffer::new(name, restaurant, "manual")
        .ok_or_else(|| anyhow!("Offer name must not be blank"))?
        .with_description(text);
    let config = RestaurantConfig::ai_only(restaurant, "manual");
    let offer = finalize(&config, vec![offer], None)
        .pop()
        .ok_or_else(|| anyhow!("Offer was dropped during post-processing"))?;

    let food = extractor
        .extract_batch(std::slice::from_ref(&offer), vocabulary)
        .await
        .pop()
        .unwrap_or_default();
    vocabulary.flush();

    Ok(enrich(EnhancedOffer::new(offer, food.food_items)))
}

pub async fn cmd_extract(
    vocabulary_path: Option<&Path>,
    text: &str,
    name: &str,
    restaurant: &str,
    kind: ExtractorKind,
) -> Result<()> {
    let mut vocabulary = open_vocabulary(vocabulary_path)?;
    let client = AIClient::from_env();
    let mut prompts = PromptLibrary::new();
    let extractor = build_extractor(kind, client.as_ref(), &mut prompts)?;

    let offer = extract_offer(name, text, restaurant, extractor.as_ref(), &mut vocabulary).await?;
    let json = serde_json::to_string_pretty(&offer).context("Failed to serialize offer")?;
    println!("{}", json);
    Ok(())
}

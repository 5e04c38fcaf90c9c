//! Completion-backed food item extraction
//!
//! All offers of one restaurant go out in a single prompt together with the
//! controlled vocabulary. A failed batch is retried offer by offer; an offer
//! that still fails gets the regex result (when configured) or the empty
//! sentinel.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::ai::parsing::parse_json_object;
use crate::ai::{AIClient, CompletionBackend};
use crate::error::Result;
use crate::models::{FoodCategory, FoodItem, RawOffer, Size};
use crate::prompts::{Prompt, PromptId, PromptLibrary};
use crate::vocabulary::{VocabularyEntry, VocabularyRepository};

use super::declension::normalize_name;
use super::lexicon;
use super::{FoodExtractor, FoodInfo, RegexFoodExtractor};

/// Group name for alternatives the model left ungrouped
const DEFAULT_CHOICE_GROUP: &str = "options";

pub struct LlmFoodExtractor {
    client: AIClient,
    prompt: Prompt,
    fallback: Option<RegexFoodExtractor>,
}

impl LlmFoodExtractor {
    /// Resolve the food prompt once; the template does not change mid-run
    pub fn new(client: AIClient, prompts: &mut PromptLibrary) -> Result<Self> {
        let prompt = prompts.get(PromptId::ExtractFoodItems)?.clone();
        Ok(Self {
            client,
            prompt,
            fallback: None,
        })
    }

    /// Use the regex strategy for offers the model could not handle
    pub fn with_regex_fallback(mut self) -> Self {
        self.fallback = Some(RegexFoodExtractor::new());
        self
    }

    fn render(&self, restaurant: &str, offers: &[(usize, &RawOffer)], vocabulary: &str) -> String {
        let listing = offers
            .iter()
            .map(|(index, offer)| offer_line(*index, offer))
            .collect::<Vec<_>>()
            .join("\n");

        self.prompt.render(&[
            ("restaurant", restaurant),
            ("vocabulary", vocabulary),
            ("offers", listing.as_str()),
        ])
    }

    async fn request(
        &self,
        restaurant: &str,
        offers: &[(usize, &RawOffer)],
        vocabulary: &VocabularyRepository,
    ) -> Result<BatchResponse> {
        let prompt = self.render(restaurant, offers, &vocabulary.prompt_listing());
        let text = self.client.complete(&prompt).await?;
        parse_json_object(&text)
    }

    fn degraded(&self, offer: &RawOffer) -> FoodInfo {
        match self.fallback {
            Some(ref regex) => regex.extract(offer),
            None => FoodInfo::empty(),
        }
    }
}

fn offer_line(index: usize, offer: &RawOffer) -> String {
    let mut line = format!("{}: {}", index, offer.name);
    if let Some(ref description) = offer.description {
        line.push_str(" | ");
        line.push_str(description);
    }
    if let Some(ref choices) = offer.choices {
        line.push_str(&format!(
            " | choose one ({}): {}",
            choices.group,
            choices.options.join(", ")
        ));
    }
    line
}

/// Model answer for a batch
#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    offers: Vec<OfferItems>,
    #[serde(default)]
    new_categories: Vec<NewCategory>,
}

#[derive(Debug, Deserialize)]
struct OfferItems {
    index: usize,
    #[serde(default)]
    food_items: Vec<ModelItem>,
}

#[derive(Debug, Deserialize)]
struct ModelItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    quantity: Option<u32>,
    /// Either `{"unit", "value"}` or a bare string like "12\"" or "stór"
    #[serde(default)]
    size: Option<serde_json::Value>,
    #[serde(default)]
    modifiers: Vec<String>,
    #[serde(default)]
    is_choice: bool,
    #[serde(default)]
    choice_group: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NewCategory {
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: String,
}

impl ModelItem {
    fn into_food_item(self, vocabulary: &VocabularyRepository) -> Option<FoodItem> {
        let kind = self.kind.trim().to_lowercase();
        if kind.is_empty() {
            return None;
        }
        let category = self
            .category
            .as_deref()
            .and_then(|c| c.parse::<FoodCategory>().ok())
            .or_else(|| vocabulary.get(&kind).map(|entry| entry.category))
            .unwrap_or_default();
        let name = match normalize_name(&self.name) {
            name if name.is_empty() => kind.clone(),
            name => name,
        };

        let mut item = FoodItem::new(kind, name, category)
            .with_quantity(self.quantity.unwrap_or(1))
            .with_size(self.size.and_then(parse_size));
        item.modifiers = self
            .modifiers
            .into_iter()
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        if self.is_choice {
            let group = self
                .choice_group
                .filter(|g| !g.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CHOICE_GROUP.to_string());
            item = item.as_choice(group);
        }
        Some(item)
    }
}

fn parse_size(value: serde_json::Value) -> Option<Size> {
    match value {
        serde_json::Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                lexicon::size(text).or_else(|| Some(Size::descriptor(text.to_lowercase())))
            }
        }
        serde_json::Value::Null => None,
        other => serde_json::from_value(other).ok(),
    }
}

/// Record new types, from the explicit list and from items using unknown types
fn learn_categories(
    response: &BatchResponse,
    vocabulary: &mut VocabularyRepository,
) -> usize {
    let mut added = 0;
    for proposal in &response.new_categories {
        let category = proposal
            .category
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or_default();
        if vocabulary.append(&proposal.name, VocabularyEntry::new(category, &proposal.description)) {
            added += 1;
        }
    }
    for item in response.offers.iter().flat_map(|o| &o.food_items) {
        let category = item
            .category
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or_default();
        if vocabulary.append(&item.kind, VocabularyEntry::new(category, "")) {
            added += 1;
        }
    }
    added
}

fn food_info(items: Vec<ModelItem>, vocabulary: &VocabularyRepository) -> FoodInfo {
    FoodInfo::from_items(
        items
            .into_iter()
            .filter_map(|item| item.into_food_item(vocabulary))
            .collect(),
    )
}

#[async_trait]
impl FoodExtractor for LlmFoodExtractor {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn extract_batch(
        &self,
        offers: &[RawOffer],
        vocabulary: &mut VocabularyRepository,
    ) -> Vec<FoodInfo> {
        if offers.is_empty() {
            return Vec::new();
        }
        let restaurant = offers[0].restaurant.clone();
        let indexed: Vec<(usize, &RawOffer)> = offers.iter().enumerate().collect();

        let mut results = vec![FoodInfo::empty(); offers.len()];
        let mut answered = vec![false; offers.len()];

        match self.request(&restaurant, &indexed, vocabulary).await {
            Ok(mut response) => {
                let learned = learn_categories(&response, vocabulary);
                for entry in std::mem::take(&mut response.offers) {
                    if entry.index < offers.len() && !answered[entry.index] {
                        results[entry.index] = food_info(entry.food_items, vocabulary);
                        answered[entry.index] = true;
                    }
                }
                debug!(
                    restaurant = %restaurant,
                    answered = answered.iter().filter(|a| **a).count(),
                    offers = offers.len(),
                    learned,
                    "Food batch parsed"
                );
            }
            Err(e) => {
                warn!(
                    restaurant = %restaurant,
                    offers = offers.len(),
                    error = %e,
                    "Food batch failed, retrying per offer"
                );
            }
        }

        for (index, offer) in offers.iter().enumerate() {
            if answered[index] {
                continue;
            }
            match self.request(&restaurant, &[(0, offer)], vocabulary).await {
                Ok(response) => {
                    learn_categories(&response, vocabulary);
                    let items = response
                        .offers
                        .into_iter()
                        .find(|entry| entry.index == 0)
                        .map(|entry| entry.food_items)
                        .unwrap_or_default();
                    results[index] = food_info(items, vocabulary);
                }
                Err(e) => {
                    warn!(offer = %offer.name, error = %e, "Food extraction failed for offer");
                    results[index] = self.degraded(offer);
                }
            }
        }

        if vocabulary.is_dirty() {
            info!(entries = vocabulary.len(), "Flushing food vocabulary");
        }
        vocabulary.flush();
        results
    }
}

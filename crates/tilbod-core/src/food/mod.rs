//! Food item extraction
//!
//! Two interchangeable strategies turn offer text into typed food items:
//! - `RegexFoodExtractor` - lexicon scan over phrases, deterministic, never fails
//! - `LlmFoodExtractor` - one batched completion per restaurant, using the
//!   controlled vocabulary, with per-offer retries and a regex fallback
//!
//! Both return one `FoodInfo` per offer, already merged.

mod declension;
mod lexicon;
mod llm;
mod regex_strategy;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::classify;
use crate::models::{FoodItem, RawOffer, Size};
use crate::vocabulary::VocabularyRepository;

pub use declension::{normalize_name, normalize_word};
pub use lexicon::{entry_for, LexiconEntry};
pub use llm::LlmFoodExtractor;
pub use regex_strategy::{extract_items, RegexFoodExtractor};

/// Food decomposition of one offer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodInfo {
    pub food_items: Vec<FoodItem>,
    pub total_items: u32,
    pub is_combo: bool,
}

impl FoodInfo {
    /// Merge `items` and derive the totals from the merged list
    pub fn from_items(items: Vec<FoodItem>) -> Self {
        let food_items = merge(items);
        Self {
            total_items: classify::total_items(&food_items),
            is_combo: classify::is_combo(&food_items),
            food_items,
        }
    }

    /// Sentinel substituted when extraction fails
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.food_items.is_empty()
    }
}

/// Strategy turning a batch of offers into food decompositions
///
/// Implementations never fail: degraded paths yield `FoodInfo::empty()`.
/// The returned vector is index-aligned with `offers`.
#[async_trait]
pub trait FoodExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract_batch(
        &self,
        offers: &[RawOffer],
        vocabulary: &mut VocabularyRepository,
    ) -> Vec<FoodInfo>;
}

/// Items describing the same thing; choice alternatives stay apart by name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct MergeKey {
    kind: String,
    size: Option<Size>,
    choice_group: Option<String>,
    alternative: Option<String>,
}

impl MergeKey {
    fn of(item: &FoodItem) -> Self {
        Self {
            kind: item.kind.clone(),
            size: item.size.clone(),
            choice_group: item.choice_group.clone(),
            alternative: item.is_choice.then(|| item.name.clone()),
        }
    }
}

/// Combine items sharing (type, size): quantities add up and modifiers are
/// unioned. First-seen order is kept, so merging twice changes nothing.
pub fn merge(items: Vec<FoodItem>) -> Vec<FoodItem> {
    let mut merged: Vec<FoodItem> = Vec::with_capacity(items.len());
    let mut index: HashMap<MergeKey, usize> = HashMap::new();

    for item in items {
        let key = MergeKey::of(&item);
        match index.get(&key) {
            Some(&at) => {
                let existing = &mut merged[at];
                existing.quantity += item.quantity;
                existing.modifiers.extend(item.modifiers);
            }
            None => {
                index.insert(key, merged.len());
                merged.push(item);
            }
        }
    }

    merged
}

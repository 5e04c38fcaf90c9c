//! Lexicon-driven food extraction
//!
//! Offer text is cut into phrases on punctuation and the conjunctions
//! "og"/"með"/"ásamt"/"fyrir". Each phrase is scanned against the lexicon; a
//! phrase holding "X eða Y" turns into alternatives sharing one choice group.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::declension::normalize_name;
use super::lexicon::{self, LEXICON};
use super::{FoodExtractor, FoodInfo};
use crate::models::{ChoiceSet, FoodCategory, FoodItem, RawOffer};
use crate::vocabulary::VocabularyRepository;

/// Shorter phrases are noise ("og", "2", "-")
const MIN_PHRASE_CHARS: usize = 3;

static PHRASE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[|+\n]|[.,;:](?:\s|$)|\b(?:og|með|ásamt|fyrir|and|with)\b")
        .expect("valid regex")
});

static ALTERNATIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:eða|or)\b|/").expect("valid regex"));

/// Deterministic extractor; the vocabulary is not consulted
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexFoodExtractor;

impl RegexFoodExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Items from an offer's name, description and attached choice set
    pub fn extract(&self, offer: &RawOffer) -> FoodInfo {
        let mut items = match &offer.description {
            Some(description) => {
                let mut items = extract_items(description);
                let seen: HashSet<String> = items.iter().map(|i| i.kind.clone()).collect();
                items.extend(
                    extract_items(&offer.name)
                        .into_iter()
                        .filter(|item| !seen.contains(&item.kind)),
                );
                items
            }
            None => extract_items(&offer.name),
        };

        if let Some(choices) = &offer.choices {
            let alternatives = choice_items(choices);
            // The alternatives replace plain mentions of the same kinds
            let kinds: HashSet<&str> = alternatives.iter().map(|i| i.kind.as_str()).collect();
            items.retain(|item| item.is_choice || !kinds.contains(item.kind.as_str()));
            items.extend(alternatives);
        }

        let info = FoodInfo::from_items(items);
        debug!(
            offer = %offer.name,
            items = info.food_items.len(),
            total = info.total_items,
            "Regex food extraction"
        );
        info
    }
}

#[async_trait]
impl FoodExtractor for RegexFoodExtractor {
    fn name(&self) -> &'static str {
        "regex"
    }

    async fn extract_batch(
        &self,
        offers: &[RawOffer],
        _vocabulary: &mut VocabularyRepository,
    ) -> Vec<FoodInfo> {
        offers.iter().map(|offer| self.extract(offer)).collect()
    }
}

/// Food items found in free text, unmerged, in reading order
pub fn extract_items(text: &str) -> Vec<FoodItem> {
    let mut groups = GroupNames::default();
    let mut items = Vec::new();

    for phrase in PHRASE_BREAK.split(text) {
        let phrase = phrase.trim();
        if phrase.chars().count() < MIN_PHRASE_CHARS {
            continue;
        }

        let parts: Vec<Vec<FoodItem>> = ALTERNATIVE
            .split(phrase)
            .map(scan_phrase)
            .filter(|found| !found.is_empty())
            .collect();

        if parts.len() < 2 {
            items.extend(parts.into_iter().flatten());
            continue;
        }

        let alternatives: Vec<FoodItem> = parts.into_iter().flatten().collect();
        let group = groups.next(&alternatives);
        items.extend(alternatives.into_iter().map(|item| item.as_choice(group.clone())));
    }

    items
}

/// Lexicon scan of one phrase; each entry contributes at most one item and a
/// word claimed by an earlier entry is not matched again
fn scan_phrase(phrase: &str) -> Vec<FoodItem> {
    let lower = phrase.to_lowercase();
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut found: Vec<(usize, FoodItem)> = Vec::new();

    for (entry, pattern) in LEXICON.iter() {
        let Some(m) = pattern
            .find_iter(phrase)
            .find(|m| !claimed.iter().any(|r| r.start < m.end() && m.start() < r.end))
        else {
            continue;
        };
        claimed.push(m.range());

        let mut item = FoodItem::new(entry.kind, normalize_name(m.as_str()), entry.category)
            .with_quantity(lexicon::quantity(phrase, m.start()))
            .with_size(lexicon::size(phrase));
        item.modifiers = entry
            .modifiers
            .iter()
            .filter(|modifier| lower.contains(*modifier))
            .map(|modifier| modifier.to_string())
            .collect();
        found.push((m.start(), item));
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, item)| item).collect()
}

/// Items for a choice set attached by a source adapter
fn choice_items(choices: &ChoiceSet) -> Vec<FoodItem> {
    choices
        .options
        .iter()
        .filter_map(|option| {
            let name = normalize_name(option);
            if name.is_empty() {
                return None;
            }
            let item = match scan_phrase(option).into_iter().next() {
                Some(mut item) => {
                    item.name = name;
                    item
                }
                None => FoodItem::new("item", name, FoodCategory::Main),
            };
            Some(item.as_choice(choices.group.clone()))
        })
        .collect()
}

/// Names choice groups after what they offer ("drinks", "mains") and keeps
/// them unique within one text
#[derive(Default)]
struct GroupNames {
    used: HashMap<String, u32>,
}

impl GroupNames {
    fn next(&mut self, alternatives: &[FoodItem]) -> String {
        let first = alternatives.first().map(|item| item.category);
        let base = match first {
            Some(category) if alternatives.iter().all(|item| item.category == category) => {
                format!("{}s", category.as_str())
            }
            _ => "options".to_string(),
        };
        let count = self.used.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            format!("{}_{}", base, count)
        }
    }
}

//! Shared clean-up applied to every strategy's output

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::fields::{fill_offer_fields, scale_short_price, PriceWindow};
use crate::models::{collapse_whitespace, ChoiceSet, RawOffer};

use super::config::{PriceCorrection, RestaurantConfig};

/// "Veldu á milli A, B eða C", "Choose between A or B"
static CHOICE_INTRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:veldu(?:\s+á\s+milli|\s+um)?|val\s+um|þú\s+velur|choose(?:\s+between|\s+from)?|choice\s+of)\s*:?\s+([^.!|\n]+)",
    )
    .expect("valid regex")
});

static OPTION_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*,\s*|\s+(?:eða|or|og|and)\s+").expect("valid regex"));

/// Group name for choice sets found in free text
pub const DETECTED_CHOICE_GROUP: &str = "choice";

/// Apply corrections, choice sets and field extraction, then drop duplicates.
///
/// `price_window` bounds prices filled in from text; the chain passes the
/// window of model-backed sources.
pub fn finalize(
    restaurant: &RestaurantConfig,
    offers: Vec<RawOffer>,
    price_window: Option<PriceWindow>,
) -> Vec<RawOffer> {
    let before = offers.len();
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(offers.len());

    for mut offer in offers {
        if let (Some(PriceCorrection::ScaleShort), Some(price)) =
            (restaurant.price_correction, offer.price)
        {
            offer.price = Some(scale_short_price(price));
        }

        if offer.choices.is_none() {
            offer.choices = restaurant
                .choice_for(&offer.name)
                .or_else(|| offer.description.as_deref().and_then(detect_choice_set));
        }

        let text = offer.text();
        fill_offer_fields(&mut offer, &text, price_window);
        if offer.suits_people.is_none() {
            offer.suits_people = restaurant.default_suits_people;
        }

        if seen.insert(fingerprint(&offer)) {
            out.push(offer);
        }
    }

    if out.len() < before {
        debug!(
            restaurant = %restaurant.name,
            dropped = before - out.len(),
            "Dropped duplicate offers"
        );
    }
    out
}

/// Alternatives introduced by "veldu"/"choose"; needs at least two options
pub fn detect_choice_set(text: &str) -> Option<ChoiceSet> {
    let caps = CHOICE_INTRO.captures(text)?;
    let options: Vec<String> = OPTION_SPLIT
        .split(caps.get(1)?.as_str())
        .map(|option| collapse_whitespace(option.trim_matches(|c: char| c.is_ascii_punctuation())))
        .filter(|option| !option.is_empty())
        .collect();
    (options.len() >= 2).then(|| ChoiceSet {
        group: DETECTED_CHOICE_GROUP.to_string(),
        options,
    })
}

/// SHA-256 over (restaurant, normalized name, price)
pub fn fingerprint(offer: &RawOffer) -> String {
    let mut hasher = Sha256::new();
    hasher.update(offer.restaurant.as_bytes());
    hasher.update([0u8]);
    hasher.update(collapse_whitespace(&offer.name.to_lowercase()).as_bytes());
    hasher.update([0u8]);
    if let Some(price) = offer.price {
        hasher.update(price.to_be_bytes());
    }
    hex::encode(hasher.finalize())
}

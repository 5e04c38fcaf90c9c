//! Field extractors
//!
//! Stateless functions turning raw offer text into primitive fields:
//! - `price` - krónur amounts with Icelandic separators
//! - `weekdays` - declined day names and weekday/weekend group terms
//! - `hours` - explicit time ranges and named meal times
//! - `pickup` - pickup/delivery keywords
//! - `people` - head counts ("4 manna", "fyrir 2")
//!
//! `fill_offer_fields` runs all of them over an offer and only fills the
//! fields a source adapter left empty.

mod hours;
mod people;
mod pickup;
mod price;
mod weekdays;

use std::sync::LazyLock;

use regex::Regex;

use crate::models::RawOffer;

pub use hours::extract_hours;
pub use people::extract_suits_people;
pub use pickup::extract_pickup_delivery;
pub use price::{extract_price, extract_price_in_window, scale_short_price, PriceWindow};
pub use weekdays::extract_weekdays;

/// Clause boundaries used when quoting availability evidence
static CLAUSE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\n;|!]+|\.\s+").expect("valid regex"));

/// "kl." ends in a period without ending the clause
static ABBREVIATION_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:kl|ca|t\.d)$").expect("valid regex"));

/// Words that signal the text talks about when an offer applies
const TEMPORAL_INDICATORS: &[&str] = &[
    "dag", "dög", "helg", "kl", "frá", "milli", "til", "hádeg", "kvöld", "morgun", "nótt",
    "opið", "gildir", "aðeins", "alla", "tilboð", "day", "weekend", "hours",
];

/// Quote the clauses that carry weekday or hour evidence.
///
/// Returns None unless weekdays or hours were actually extracted and the text
/// contains a temporal indicator.
pub fn extract_availability_text(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    if !TEMPORAL_INDICATORS.iter().any(|w| lower.contains(w)) {
        return None;
    }
    if extract_weekdays(text).is_empty() && extract_hours(text).is_empty() {
        return None;
    }

    let clauses: Vec<&str> = split_clauses(text)
        .into_iter()
        .filter(|clause| {
            !extract_weekdays(clause).is_empty() || !extract_hours(clause).is_empty()
        })
        .collect();

    if clauses.is_empty() {
        Some(text.trim().to_string())
    } else {
        Some(clauses.join(" | "))
    }
}

fn split_clauses(text: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut start = 0;
    for m in CLAUSE_BREAK.find_iter(text) {
        if m.as_str().starts_with('.') && ABBREVIATION_END.is_match(&text[start..m.start()]) {
            continue;
        }
        clauses.push(text[start..m.start()].trim());
        start = m.end();
    }
    clauses.push(text[start..].trim());
    clauses.retain(|clause| !clause.is_empty());
    clauses
}

/// Fill any missing primitive fields of `offer` from `text`.
///
/// With a `price_window` the price is read the way model output is read and
/// anything outside the window stays unset.
pub fn fill_offer_fields(offer: &mut RawOffer, text: &str, price_window: Option<PriceWindow>) {
    if offer.price.is_none() {
        offer.price = match price_window {
            Some(window) => extract_price_in_window(text, window),
            None => extract_price(text),
        };
    }
    if offer.pickup_delivery.is_none() {
        offer.pickup_delivery = extract_pickup_delivery(text);
    }
    if offer.suits_people.is_none() {
        offer.suits_people = extract_suits_people(text);
    }
    if offer.available_weekdays.is_empty() {
        offer.available_weekdays = extract_weekdays(text);
    }
    if offer.available_hours.is_empty() {
        offer.available_hours = extract_hours(text);
    }
    if offer.availability_text.is_none() {
        offer.availability_text = extract_availability_text(text);
    }
}

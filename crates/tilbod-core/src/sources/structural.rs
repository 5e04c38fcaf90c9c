//! Structural strategies: configured selector sets and script patterns,
//! and the keyword-driven content heuristic used when neither matches

use std::collections::HashSet;

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::error::Result;
use crate::fields::{extract_price, extract_weekdays};
use crate::models::{collapse_whitespace, RawOffer};

use super::config::{parse_selector, RestaurantConfig, SelectorSet};
use super::page::Page;
use super::OfferSource;

/// Selector sets first, then script patterns
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralSource;

#[async_trait]
impl OfferSource for StructuralSource {
    fn name(&self) -> &'static str {
        "structural"
    }

    async fn scrape_offers(
        &self,
        restaurant: &RestaurantConfig,
        page: &Page,
    ) -> Result<Vec<RawOffer>> {
        let offers = scrape_selector_sets(restaurant, page)?;
        if !offers.is_empty() {
            return Ok(offers);
        }
        scrape_script_patterns(restaurant, page)
    }
}

/// First selector set yielding at least one offer wins
pub fn scrape_selector_sets(restaurant: &RestaurantConfig, page: &Page) -> Result<Vec<RawOffer>> {
    if restaurant.selector_sets.is_empty() {
        return Ok(Vec::new());
    }
    let document = page.document();
    for (index, set) in restaurant.selector_sets.iter().enumerate() {
        let offers = scrape_set(&document, set, restaurant, &page.url)?;
        if !offers.is_empty() {
            debug!(
                restaurant = %restaurant.name,
                set = index,
                container = %set.container,
                offers = offers.len(),
                "Selector set matched"
            );
            return Ok(offers);
        }
    }
    Ok(Vec::new())
}

fn scrape_set(
    document: &Html,
    set: &SelectorSet,
    restaurant: &RestaurantConfig,
    source: &str,
) -> Result<Vec<RawOffer>> {
    let container = parse_selector(&set.container)?;
    let names = compile(&set.name)?;
    let prices = compile(&set.price)?;
    let descriptions = compile(&set.description)?;

    let mut offers = Vec::new();
    for card in document.select(&container) {
        let name = first_text(card, &names);
        let Some(offer) = RawOffer::new(name.unwrap_or_default(), &restaurant.name, source) else {
            continue;
        };
        let description = all_text(card, &descriptions);
        let price = first_text(card, &prices).and_then(|text| extract_price(&text));
        offers.push(offer.with_description(description).with_price(price));
    }
    Ok(offers)
}

fn compile(selectors: &[String]) -> Result<Vec<Selector>> {
    selectors.iter().map(|s| parse_selector(s)).collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of the first selector that matches a non-empty element
fn first_text(card: ElementRef<'_>, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        card.select(selector)
            .map(element_text)
            .find(|text| !text.is_empty())
    })
}

/// Every match of the first selector that matches anything, joined
fn all_text(card: ElementRef<'_>, selectors: &[Selector]) -> String {
    for selector in selectors {
        let parts: Vec<String> = card
            .select(selector)
            .map(element_text)
            .filter(|text| !text.is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join(" | ");
        }
    }
    String::new()
}

/// Offers embedded in page scripts (`"day_name":"…","product_name":"…"`)
pub fn scrape_script_patterns(restaurant: &RestaurantConfig, page: &Page) -> Result<Vec<RawOffer>> {
    if restaurant.script_patterns.is_empty() {
        return Ok(Vec::new());
    }
    let scripts = page.scripts();
    let mut offers = Vec::new();

    for script_pattern in &restaurant.script_patterns {
        let regex = Regex::new(&script_pattern.pattern)?;
        for script in &scripts {
            for caps in regex.captures_iter(script) {
                let Some(name) = caps.name("name").map(|m| m.as_str()) else {
                    continue;
                };
                let Some(mut offer) = RawOffer::new(name, &restaurant.name, &page.url) else {
                    continue;
                };
                let day = caps.name("day").map(|m| m.as_str()).unwrap_or_default();

                let description = match caps.name("description") {
                    Some(m) => Some(m.as_str().to_string()),
                    None => script_pattern
                        .description
                        .as_ref()
                        .map(|t| t.replace("{day}", day).replace("{name}", name)),
                };
                if let Some(description) = description {
                    offer = offer.with_description(description);
                }
                offer.price = caps.name("price").and_then(|m| extract_price(m.as_str()));
                if !day.is_empty() {
                    offer.available_weekdays = extract_weekdays(day);
                }
                offers.push(offer);
            }
        }
    }

    if !offers.is_empty() {
        debug!(restaurant = %restaurant.name, offers = offers.len(), "Script patterns matched");
    }
    Ok(offers)
}

/// Words that mark a block as talking about an offer
const OFFER_KEYWORDS: &[&str] = &[
    "tilboð", "tilbod", "máltíð", "maltid", "pakki", "offer", "deal", "combo", "meal",
    "pizz", "borgar", "burger", "kjúkling", "bátur", "franskar", "gos",
];

/// Blocks longer than this are page sections, not offer cards
const MAX_BLOCK_CHARS: usize = 400;
const MIN_BLOCK_CHARS: usize = 10;
const MAX_NAME_CHARS: usize = 80;

static BLOCK_SELECTOR: std::sync::LazyLock<Selector> = std::sync::LazyLock::new(|| {
    Selector::parse("article, li, div, section").expect("valid selector")
});

static HEADING_SELECTOR: std::sync::LazyLock<Selector> = std::sync::LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, strong, b").expect("valid selector")
});

/// Innermost blocks carrying an offer keyword and a price
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentHeuristicSource;

#[async_trait]
impl OfferSource for ContentHeuristicSource {
    fn name(&self) -> &'static str {
        "content_heuristic"
    }

    async fn scrape_offers(
        &self,
        restaurant: &RestaurantConfig,
        page: &Page,
    ) -> Result<Vec<RawOffer>> {
        Ok(scrape_by_content(restaurant, page))
    }
}

pub fn scrape_by_content(restaurant: &RestaurantConfig, page: &Page) -> Vec<RawOffer> {
    let document = page.document();

    let candidates: Vec<ElementRef<'_>> = document
        .select(&BLOCK_SELECTOR)
        .filter(|block| {
            let text = element_text(*block);
            let chars = text.chars().count();
            if !(MIN_BLOCK_CHARS..=MAX_BLOCK_CHARS).contains(&chars) {
                return false;
            }
            let lower = text.to_lowercase();
            OFFER_KEYWORDS.iter().any(|k| lower.contains(k)) && extract_price(&text).is_some()
        })
        .collect();

    let ids: HashSet<_> = candidates.iter().map(|c| c.id()).collect();
    let mut offers = Vec::new();
    for block in candidates {
        // A candidate containing another candidate is a wrapper, not a card
        if block.descendants().skip(1).any(|n| ids.contains(&n.id())) {
            continue;
        }
        if let Some(offer) = offer_from_block(block, restaurant, &page.url) {
            offers.push(offer);
        }
    }

    if offers.is_empty() {
        warn!(restaurant = %restaurant.name, "Content heuristic found no offer blocks");
    } else {
        debug!(restaurant = %restaurant.name, offers = offers.len(), "Content heuristic matched");
    }
    offers
}

fn offer_from_block(block: ElementRef<'_>, restaurant: &RestaurantConfig, source: &str) -> Option<RawOffer> {
    let text = element_text(block);
    let name = block
        .select(&HEADING_SELECTOR)
        .map(element_text)
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| text.chars().take(MAX_NAME_CHARS).collect());

    let description = text
        .strip_prefix(name.as_str())
        .unwrap_or(&text)
        .trim()
        .to_string();
    let price = extract_price(&text);
    RawOffer::new(name, &restaurant.name, source)
        .map(|offer| offer.with_description(description).with_price(price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Weekday;
    use crate::sources::config::{ScriptPattern, StrategyKind};

    fn bullan() -> RestaurantConfig {
        let mut restaurant = RestaurantConfig::ai_only("Búllan", "https://tommis.is/#tilbod");
        restaurant.strategy = StrategyKind::Structural;
        restaurant.selector_sets = vec![
            SelectorSet {
                container: "div.missing".into(),
                name: vec!["h3".into()],
                price: vec![],
                description: vec![],
            },
            SelectorSet {
                container: "div#tilbod div.col-sm-4".into(),
                name: vec!["h3".into()],
                price: vec!["div.price span".into()],
                description: vec!["div.offers-block p".into()],
            },
        ];
        restaurant
    }

    const BULLAN: &str = r#"<div id="tilbod">
        <div class="col-sm-4"><h3>Tilboð 1</h3>
            <div class="offers-block"><p>Búlluborgari, franskar og gos</p></div>
            <div class="price"><span>2.990 kr.</span></div></div>
        <div class="col-sm-4"><h3>Tilboð 2</h3>
            <div class="offers-block"><p>2 Búlluborgarar, 2 barnaborgarar</p><p>stór franskar, 2 l gos</p></div>
            <div class="price"><span>8.490 kr.</span></div></div>
        <div class="col-sm-4"><h3>  </h3></div>
    </div>"#;

    #[test]
    fn test_first_matching_set_wins() {
        let page = Page::new("https://tommis.is/#tilbod", BULLAN);
        let offers = scrape_selector_sets(&bullan(), &page).unwrap();
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].name, "Tilboð 1");
        assert_eq!(offers[0].price, Some(2990));
        assert_eq!(offers[0].description.as_deref(), Some("Búlluborgari, franskar og gos"));
        assert_eq!(
            offers[1].description.as_deref(),
            Some("2 Búlluborgarar, 2 barnaborgarar | stór franskar, 2 l gos")
        );
        assert_eq!(offers[1].restaurant, "Búllan");
    }

    #[test]
    fn test_script_patterns() {
        let mut restaurant = RestaurantConfig::ai_only("Subway", "https://subway.is");
        restaurant.script_patterns = vec![ScriptPattern {
            pattern: r#""day_name":"(?P<day>[^"]+)","product_name":"(?P<name>[^"]+)""#.into(),
            description: Some("Máltíð dagsins {day}".into()),
        }];
        let html = r#"<script>{"items":[{"day_name":"Mánudagur","product_name":"Kjúklingabátur"},
            {"day_name":"Þriðjudagur","product_name":"Skinkubátur"}]}</script>"#;
        let offers = scrape_script_patterns(&restaurant, &Page::new("https://subway.is", html)).unwrap();

        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].name, "Kjúklingabátur");
        assert_eq!(offers[0].available_weekdays, vec![Weekday::Monday]);
        assert_eq!(offers[1].description.as_deref(), Some("Máltíð dagsins Þriðjudagur"));
    }

    #[test]
    fn test_content_heuristic_takes_innermost_block() {
        let html = r#"<main><div class="wrapper">
            <div class="card"><h4>Fjölskyldutilboð</h4><p>2 stórar pizzur og 2 l gos</p><p>5.990 kr</p></div>
            <div class="card"><h4>Hádegistilboð</h4><p>Pizza og gos 1.790 kr</p></div>
            <div class="about">Opið alla daga</div>
        </div></main>"#;
        let restaurant = RestaurantConfig::ai_only("Pizzan", "https://pizzan.is");
        let offers = scrape_by_content(&restaurant, &Page::new("https://pizzan.is", html));

        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].name, "Fjölskyldutilboð");
        assert_eq!(offers[0].price, Some(5990));
        assert_eq!(offers[1].name, "Hádegistilboð");
    }

    #[test]
    fn test_content_heuristic_ignores_priceless_text() {
        let html = "<div>Tilboð vikunnar koma bráðum</div>";
        let restaurant = RestaurantConfig::ai_only("Pizzan", "https://pizzan.is");
        assert!(scrape_by_content(&restaurant, &Page::new("https://pizzan.is", html)).is_empty());
    }
}

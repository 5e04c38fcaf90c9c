//! Source adapters: discovering offers on a restaurant page
//!
//! Every strategy implements `OfferSource` and emits `RawOffer`s. DOM and
//! script handling stays in this module; everything downstream sees text.
//!
//! `StrategyChain` applies the fallback policy for one restaurant:
//! 1. Structural: configured selector sets (first set with a match wins),
//!    then configured script patterns
//! 2. Content heuristic: innermost blocks with an offer keyword and a price
//! 3. AI: the model reads the page text (when a backend is configured)
//!
//! `prefer_ai` moves step 3 to the front; `strategy = "ai"` uses it alone.
//! The chain's output always goes through `postprocess::finalize`.

mod ai;
pub mod config;
mod page;
pub mod postprocess;
mod structural;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::fields::PriceWindow;
use crate::models::RawOffer;

pub use ai::AiSource;
pub use config::{
    load_restaurants, parse_restaurants, ChoiceOffer, PriceCorrection, RestaurantConfig,
    ScriptPattern, SelectorSet, StrategyKind,
};
pub use page::{HttpFetcher, Page, PageFetcher, StaticFetcher};
pub use structural::{ContentHeuristicSource, StructuralSource};

/// One way of finding offers on a fetched page
#[async_trait]
pub trait OfferSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Bounds for prices read from this source's free text
    fn price_window(&self) -> Option<PriceWindow> {
        None
    }

    async fn scrape_offers(
        &self,
        restaurant: &RestaurantConfig,
        page: &Page,
    ) -> Result<Vec<RawOffer>>;
}

/// Offers found for one restaurant and the strategy that found them
#[derive(Debug, Clone, Default)]
pub struct ChainResult {
    pub offers: Vec<RawOffer>,
    pub strategy: Option<&'static str>,
}

/// Ordered fallback across strategies
pub struct StrategyChain {
    structural: Box<dyn OfferSource>,
    heuristic: Box<dyn OfferSource>,
    ai: Option<Box<dyn OfferSource>>,
}

impl Default for StrategyChain {
    fn default() -> Self {
        Self::new(None)
    }
}

impl StrategyChain {
    pub fn new(ai: Option<AiSource>) -> Self {
        Self {
            structural: Box::new(StructuralSource),
            heuristic: Box::new(ContentHeuristicSource),
            ai: ai.map(|source| Box::new(source) as Box<dyn OfferSource>),
        }
    }

    pub fn has_ai(&self) -> bool {
        self.ai.is_some()
    }

    fn order(&self, restaurant: &RestaurantConfig) -> Vec<&dyn OfferSource> {
        let ai = self.ai.as_deref();
        let mut order: Vec<&dyn OfferSource> = Vec::with_capacity(3);
        match restaurant.strategy {
            StrategyKind::Ai => order.extend(ai),
            StrategyKind::Structural => {
                if restaurant.prefer_ai {
                    order.extend(ai);
                }
                order.push(self.structural.as_ref());
                order.push(self.heuristic.as_ref());
                if !restaurant.prefer_ai {
                    order.extend(ai);
                }
            }
        }
        order
    }

    /// Run strategies in order until one yields offers. Strategy errors are
    /// logged and the next strategy is tried.
    pub async fn scrape_offers(&self, restaurant: &RestaurantConfig, page: &Page) -> ChainResult {
        let order = self.order(restaurant);
        if order.is_empty() {
            warn!(restaurant = %restaurant.name, "No strategy available (AI backend not configured)");
        }

        for source in order {
            match source.scrape_offers(restaurant, page).await {
                Ok(offers) if !offers.is_empty() => {
                    let offers = postprocess::finalize(restaurant, offers, source.price_window());
                    info!(
                        restaurant = %restaurant.name,
                        strategy = source.name(),
                        offers = offers.len(),
                        "Offers found"
                    );
                    return ChainResult {
                        offers,
                        strategy: Some(source.name()),
                    };
                }
                Ok(_) => {
                    debug!(restaurant = %restaurant.name, strategy = source.name(), "No offers");
                }
                Err(e) => {
                    warn!(
                        restaurant = %restaurant.name,
                        strategy = source.name(),
                        error = %e,
                        "Strategy failed"
                    );
                }
            }
        }
        ChainResult::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AIClient, MockBackend};
    use crate::prompts::PromptLibrary;

    fn ai_source(mock: MockBackend) -> AiSource {
        AiSource::new(
            AIClient::Mock(mock),
            &mut PromptLibrary::embedded_only(),
            2000,
            PriceWindow::default(),
        )
        .unwrap()
    }

    const MODEL_OFFERS: &str = r#"[{"name": "Tilboð frá gervigreind", "price": 1990}]"#;

    fn structural(prefer_ai: bool) -> RestaurantConfig {
        let mut restaurant = RestaurantConfig::ai_only("Pizzan", "https://pizzan.is");
        restaurant.strategy = StrategyKind::Structural;
        restaurant.prefer_ai = prefer_ai;
        restaurant.selector_sets = vec![SelectorSet {
            container: "div.offer".into(),
            name: vec!["h3".into()],
            price: vec![".price".into()],
            description: vec![],
        }];
        restaurant
    }

    const CARDS: &str = r#"<div class="offer"><h3>Pizza tilboð</h3><span class="price">2.490 kr</span></div>"#;

    #[tokio::test]
    async fn test_structural_before_ai() {
        let mock = MockBackend::new().with_default_response(MODEL_OFFERS);
        let chain = StrategyChain::new(Some(ai_source(mock.clone())));
        let result = chain
            .scrape_offers(&structural(false), &Page::new("https://pizzan.is", CARDS))
            .await;

        assert_eq!(result.strategy, Some("structural"));
        assert_eq!(result.offers[0].name, "Pizza tilboð");
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_prefer_ai() {
        let mock = MockBackend::new().with_default_response(MODEL_OFFERS);
        let chain = StrategyChain::new(Some(ai_source(mock)));
        let result = chain
            .scrape_offers(&structural(true), &Page::new("https://pizzan.is", CARDS))
            .await;
        assert_eq!(result.strategy, Some("ai"));
    }

    #[tokio::test]
    async fn test_falls_through_to_ai() {
        let mock = MockBackend::new().with_default_response(MODEL_OFFERS);
        let chain = StrategyChain::new(Some(ai_source(mock)));
        let page = Page::new("https://pizzan.is", "<p>Velkomin</p>");
        let result = chain.scrape_offers(&structural(false), &page).await;

        assert_eq!(result.strategy, Some("ai"));
        assert_eq!(result.offers[0].price, Some(1990));
    }

    #[tokio::test]
    async fn test_failing_ai_yields_nothing() {
        let chain = StrategyChain::new(Some(ai_source(MockBackend::new().failing())));
        let restaurant = RestaurantConfig::ai_only("Pizzan", "https://pizzan.is");
        let result = chain
            .scrape_offers(&restaurant, &Page::new("https://pizzan.is", CARDS))
            .await;
        assert!(result.offers.is_empty());
        assert_eq!(result.strategy, None);
    }

    #[tokio::test]
    async fn test_ai_only_without_backend() {
        let chain = StrategyChain::default();
        let restaurant = RestaurantConfig::ai_only("Pizzan", "https://pizzan.is");
        let result = chain
            .scrape_offers(&restaurant, &Page::new("https://pizzan.is", CARDS))
            .await;
        assert!(result.offers.is_empty());
    }

    #[tokio::test]
    async fn test_model_offer_prices_stay_in_window() {
        let response = r#"[
            {"name": "Aukasósa", "description": "Aukasósa 150 kr", "price": null},
            {"name": "Gjafabréf", "description": "Gjafabréf 50.000 kr", "price": null},
            {"name": "Hádegistilboð", "description": "Borgari og gos 2.190 kr", "price": null}
        ]"#;
        let chain = StrategyChain::new(Some(ai_source(
            MockBackend::new().with_default_response(response),
        )));
        let restaurant = RestaurantConfig::ai_only("Pizzan", "https://pizzan.is");
        let result = chain
            .scrape_offers(&restaurant, &Page::new("https://pizzan.is", "<p>Tilboð</p>"))
            .await;

        let window = PriceWindow::default();
        assert_eq!(result.offers.len(), 3);
        for offer in &result.offers {
            assert!(
                offer.price.map_or(true, |p| window.contains(p)),
                "{} priced {:?}",
                offer.name,
                offer.price
            );
        }
        assert_eq!(result.offers[0].price, None);
        assert_eq!(result.offers[1].price, None);
        assert_eq!(result.offers[2].price, Some(2190));
    }
}

//! Scrape run orchestration
//!
//! Per restaurant, strictly in order: fetch -> strategy chain -> food
//! extraction -> classification -> enrichment -> sink. A failed restaurant
//! is recorded in the report and the run moves on; a fixed delay separates
//! restaurants.

use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::display::enrich;
use crate::error::{Error, Result};
use crate::export::{OfferSink, PersistedOffer};
use crate::fields::PriceWindow;
use crate::food::FoodExtractor;
use crate::models::{EnhancedOffer, RawOffer};
use crate::sources::{PageFetcher, RestaurantConfig, StrategyChain};
use crate::vocabulary::VocabularyRepository;

/// Run settings
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Pause between restaurants
    pub delay: Duration,
    /// Upper bound on one page fetch
    pub fetch_timeout: Duration,
    /// Characters of page text sent to the model
    pub ai_text_budget: usize,
    /// Accepted prices for model-found offers
    pub ai_price_window: PriceWindow,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            fetch_timeout: Duration::from_secs(30),
            ai_text_budget: 12_000,
            ai_price_window: PriceWindow::default(),
        }
    }
}

/// Progress callbacks for a run; all optional
pub trait Progress {
    fn begin(&mut self, _total: usize) {}
    fn restaurant_done(&mut self, _outcome: &RestaurantOutcome) {}
}

/// No-op progress
pub struct Silent;

impl Progress for Silent {}

/// Result of one restaurant
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantOutcome {
    pub restaurant: String,
    pub strategy: Option<&'static str>,
    pub offers_found: usize,
    pub offers_stored: usize,
    pub error: Option<String>,
}

impl RestaurantOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Summary of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub restaurants: Vec<RestaurantOutcome>,
    #[serde(skip)]
    pub offers: Vec<EnhancedOffer>,
}

impl RunReport {
    pub fn processed(&self) -> usize {
        self.restaurants.len()
    }

    pub fn succeeded(&self) -> usize {
        self.restaurants.iter().filter(|r| r.succeeded()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &RestaurantOutcome> {
        self.restaurants.iter().filter(|r| !r.succeeded())
    }

    pub fn offers_found(&self) -> usize {
        self.restaurants.iter().map(|r| r.offers_found).sum()
    }

    pub fn offers_stored(&self) -> usize {
        self.restaurants.iter().map(|r| r.offers_stored).sum()
    }

    /// Percentage of restaurants that succeeded
    pub fn success_rate(&self) -> f64 {
        if self.restaurants.is_empty() {
            return 0.0;
        }
        self.succeeded() as f64 * 100.0 / self.processed() as f64
    }
}

/// Drives a scrape run. Owns the vocabulary for the run (single writer).
pub struct Orchestrator {
    fetcher: Box<dyn PageFetcher>,
    chain: StrategyChain,
    extractor: Box<dyn FoodExtractor>,
    vocabulary: VocabularyRepository,
    config: PipelineConfig,
}

impl Orchestrator {
    pub fn new(
        fetcher: Box<dyn PageFetcher>,
        chain: StrategyChain,
        extractor: Box<dyn FoodExtractor>,
        vocabulary: VocabularyRepository,
        config: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            chain,
            extractor,
            vocabulary,
            config,
        }
    }

    pub fn vocabulary(&self) -> &VocabularyRepository {
        &self.vocabulary
    }

    /// Process every restaurant in order
    pub async fn run(
        &mut self,
        restaurants: &[RestaurantConfig],
        sink: &mut dyn OfferSink,
        progress: &mut dyn Progress,
    ) -> RunReport {
        let mut report = RunReport::default();
        progress.begin(restaurants.len());
        info!(
            restaurants = restaurants.len(),
            extractor = self.extractor.name(),
            ai = self.chain.has_ai(),
            "Starting scrape run"
        );

        for (index, restaurant) in restaurants.iter().enumerate() {
            if index > 0 && !self.config.delay.is_zero() {
                tokio::time::sleep(self.config.delay).await;
            }

            let outcome = match self.process_restaurant(restaurant).await {
                Ok((strategy, offers)) => {
                    let persisted: Vec<PersistedOffer> =
                        offers.iter().map(PersistedOffer::from).collect();
                    let found = offers.len();
                    report.offers.extend(offers);
                    match sink.store(&restaurant.name, &persisted) {
                        Ok(stored) => RestaurantOutcome {
                            restaurant: restaurant.name.clone(),
                            strategy,
                            offers_found: found,
                            offers_stored: stored,
                            error: None,
                        },
                        Err(e) => {
                            warn!(restaurant = %restaurant.name, error = %e, "Failed to store offers");
                            RestaurantOutcome {
                                restaurant: restaurant.name.clone(),
                                strategy,
                                offers_found: found,
                                offers_stored: 0,
                                error: Some(format!("store: {}", e)),
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(restaurant = %restaurant.name, error = %e, "Restaurant failed");
                    RestaurantOutcome {
                        restaurant: restaurant.name.clone(),
                        strategy: None,
                        offers_found: 0,
                        offers_stored: 0,
                        error: Some(e.to_string()),
                    }
                }
            };
            progress.restaurant_done(&outcome);
            report.restaurants.push(outcome);
        }

        self.vocabulary.flush();
        info!(
            processed = report.processed(),
            succeeded = report.succeeded(),
            offers = report.offers_found(),
            stored = report.offers_stored(),
            "Scrape run finished"
        );
        report
    }

    /// Fetch, scrape and enhance one restaurant's offers
    pub async fn process_restaurant(
        &mut self,
        restaurant: &RestaurantConfig,
    ) -> Result<(Option<&'static str>, Vec<EnhancedOffer>)> {
        info!(restaurant = %restaurant.name, url = %restaurant.offers_page, "Scraping");
        let page = tokio::time::timeout(
            self.config.fetch_timeout,
            self.fetcher.fetch(&restaurant.offers_page),
        )
        .await
        .map_err(|_| Error::Fetch {
            url: restaurant.offers_page.clone(),
            reason: format!("timed out after {:?}", self.config.fetch_timeout),
        })??;

        let found = self.chain.scrape_offers(restaurant, &page).await;
        let offers = self.enhance(found.offers).await;
        log_field_stats(&restaurant.name, &offers);
        Ok((found.strategy, offers))
    }

    /// Food extraction, classification and enrichment for one batch
    pub async fn enhance(&mut self, offers: Vec<RawOffer>) -> Vec<EnhancedOffer> {
        if offers.is_empty() {
            return Vec::new();
        }
        let food = self.extractor.extract_batch(&offers, &mut self.vocabulary).await;
        info!(
            extractor = self.extractor.name(),
            offers = offers.len(),
            with_items = food.iter().filter(|f| !f.is_empty()).count(),
            "Food items extracted"
        );

        offers
            .into_iter()
            .zip(food)
            .map(|(offer, info)| enrich(EnhancedOffer::new(offer, info.food_items)))
            .collect()
    }
}

/// How many offers carry each field
pub fn field_stats(offers: &[EnhancedOffer]) -> [(&'static str, usize); 8] {
    let count = |f: fn(&EnhancedOffer) -> bool| offers.iter().filter(|o| f(o)).count();
    [
        ("description", count(|o| o.offer.description.is_some())),
        ("price", count(|o| o.offer.price.is_some())),
        ("pickup_delivery", count(|o| o.offer.pickup_delivery.is_some())),
        ("suits_people", count(|o| o.offer.suits_people.is_some())),
        ("available_weekdays", count(|o| !o.offer.available_weekdays.is_empty())),
        ("available_hours", count(|o| !o.offer.available_hours.is_empty())),
        ("availability_text", count(|o| o.offer.availability_text.is_some())),
        ("food_items", count(|o| !o.food_items.is_empty())),
    ]
}

/// Per-field extraction counts for operator audit
pub fn log_field_stats(restaurant: &str, offers: &[EnhancedOffer]) {
    for (field, extracted) in field_stats(offers) {
        info!(restaurant = %restaurant, "{} extracted: {}/{}", field, extracted, offers.len());
    }
}

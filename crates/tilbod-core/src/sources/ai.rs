//! Generic completion-backed strategy: the model reads the page text
//!
//! Candidates come back as a JSON array of {name, description, price, link}.
//! Anything without a name or with a price outside the window is dropped.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::ai::parsing::parse_json_array;
use crate::ai::{AIClient, CompletionBackend};
use crate::error::Result;
use crate::fields::{extract_price_in_window, PriceWindow};
use crate::models::RawOffer;
use crate::prompts::{Prompt, PromptId, PromptLibrary};

use super::config::RestaurantConfig;
use super::page::Page;
use super::OfferSource;

pub struct AiSource {
    client: AIClient,
    prompt: Prompt,
    text_budget: usize,
    price_window: PriceWindow,
}

impl AiSource {
    pub fn new(
        client: AIClient,
        prompts: &mut PromptLibrary,
        text_budget: usize,
        price_window: PriceWindow,
    ) -> Result<Self> {
        let prompt = prompts.get(PromptId::ExtractOffers)?.clone();
        Ok(Self {
            client,
            prompt,
            text_budget,
            price_window,
        })
    }

    fn render(&self, restaurant: &str, page_text: &str) -> String {
        self.prompt
            .render(&[("restaurant", restaurant), ("page_text", page_text)])
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    /// Numbers or strings like "2.990 kr"
    #[serde(default)]
    price: Option<serde_json::Value>,
    #[serde(default)]
    link: Option<String>,
}

/// Cut at a char boundary
fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((at, _)) => &text[..at],
        None => text,
    }
}

/// `Err(())` when the price is present but unusable
fn candidate_price(value: Option<&serde_json::Value>, window: PriceWindow) -> std::result::Result<Option<u32>, ()> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => {
            let price = n.as_f64().ok_or(())?;
            if price.fract() != 0.0 || price < 0.0 {
                return Err(());
            }
            let price = price as u32;
            window.contains(price).then_some(Some(price)).ok_or(())
        }
        Some(serde_json::Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(text)) => {
            let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            let plain = digits
                .parse::<u32>()
                .ok()
                .filter(|p| window.contains(*p));
            plain
                .or_else(|| extract_price_in_window(text, window))
                .map(Some)
                .ok_or(())
        }
        Some(_) => Err(()),
    }
}

impl Candidate {
    fn into_offer(self, restaurant: &RestaurantConfig, page: &Page, window: PriceWindow) -> Option<RawOffer> {
        let price = match candidate_price(self.price.as_ref(), window) {
            Ok(price) => price,
            Err(()) => {
                debug!(name = ?self.name, price = ?self.price, "Dropping candidate with implausible price");
                return None;
            }
        };
        let source = self
            .link
            .filter(|link| link.starts_with("http://") || link.starts_with("https://"))
            .unwrap_or_else(|| page.url.clone());
        let offer = RawOffer::new(self.name.unwrap_or_default(), &restaurant.name, source)?;
        Some(
            offer
                .with_description(self.description.unwrap_or_default())
                .with_price(price),
        )
    }
}

#[async_trait]
impl OfferSource for AiSource {
    fn name(&self) -> &'static str {
        "ai"
    }

    fn price_window(&self) -> Option<PriceWindow> {
        Some(self.price_window)
    }

    async fn scrape_offers(
        &self,
        restaurant: &RestaurantConfig,
        page: &Page,
    ) -> Result<Vec<RawOffer>> {
        let text = page.text_view();
        let page_text = truncate_chars(&text, self.text_budget);
        let prompt = self.render(&restaurant.name, page_text);

        let response = self.client.complete(&prompt).await?;
        let candidates: Vec<Candidate> = parse_json_array(&response)?;
        let found = candidates.len();

        let offers: Vec<RawOffer> = candidates
            .into_iter()
            .filter_map(|c| c.into_offer(restaurant, page, self.price_window))
            .collect();
        debug!(
            restaurant = %restaurant.name,
            candidates = found,
            accepted = offers.len(),
            "Model offers validated"
        );
        Ok(offers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;

    fn source(mock: MockBackend, budget: usize) -> AiSource {
        AiSource::new(
            AIClient::Mock(mock),
            &mut PromptLibrary::embedded_only(),
            budget,
            PriceWindow::default(),
        )
        .unwrap()
    }

    fn restaurant() -> RestaurantConfig {
        RestaurantConfig::ai_only("Pizzan", "https://pizzan.is/tilbod")
    }

    #[tokio::test]
    async fn test_candidates_validated() {
        let response = r#"Here are the offers:
        [
            {"name": "Hádegistilboð", "description": "Pizza og gos", "price": 1790, "link": null},
            {"name": "Fjölskyldutilboð", "description": "2 pizzur", "price": "5.990 kr", "link": "https://pizzan.is/fjolskylda"},
            {"name": "", "description": "no name", "price": 2000},
            {"name": "Gjafabréf", "price": 50000},
            {"name": "Sósa", "price": 150},
            {"name": "Verð á síðu", "price": null}
        ]"#;
        let mock = MockBackend::new().with_default_response(response);
        let page = Page::new("https://pizzan.is/tilbod", "<p>Tilboð</p>");

        let offers = source(mock, 1000).scrape_offers(&restaurant(), &page).await.unwrap();
        let names: Vec<&str> = offers.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Hádegistilboð", "Fjölskyldutilboð", "Verð á síðu"]);
        assert_eq!(offers[1].price, Some(5990));
        assert_eq!(offers[1].source, "https://pizzan.is/fjolskylda");
        assert_eq!(offers[0].source, "https://pizzan.is/tilbod");
        assert_eq!(offers[2].price, None);
    }

    #[tokio::test]
    async fn test_page_text_is_bounded() {
        let mock = MockBackend::new();
        let html = format!("<p>{}</p>", "þ".repeat(5000));
        let page = Page::new("https://pizzan.is", html);

        source(mock.clone(), 100).scrape_offers(&restaurant(), &page).await.unwrap();
        let prompt = &mock.prompts()[0];
        assert!(prompt.contains(&"þ".repeat(100)));
        assert!(!prompt.contains(&"þ".repeat(101)));
    }

    #[tokio::test]
    async fn test_malformed_response_is_error() {
        let mock = MockBackend::new().with_default_response("no offers, sorry");
        let page = Page::new("https://pizzan.is", "<p>x</p>");
        assert!(source(mock, 100).scrape_offers(&restaurant(), &page).await.is_err());
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("ábcd", 2), "áb");
        assert_eq!(truncate_chars("ab", 5), "ab");
    }
}

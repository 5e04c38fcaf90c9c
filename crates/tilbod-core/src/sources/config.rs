//! Restaurant list configuration
//!
//! Which page to fetch per restaurant and how its offers are found.
//! Loaded from TOML; the shipped list is embedded and an override file in the
//! data dir takes precedence.
//!
//! ```toml
//! [[restaurant]]
//! name = "Búllan"
//! offers_page = "https://tommis.is/#tilbod"
//!
//! [[restaurant.selector_sets]]
//! container = "div#tilbod div.col-sm-4"
//! name = ["h3"]
//! price = ["div.price span"]
//! description = ["div.offers-block p"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::ChoiceSet;

/// Embedded restaurant list (compiled into binary)
const DEFAULT_RESTAURANTS: &str = include_str!("../../../../config/restaurants.toml");

/// How offers are discovered for a restaurant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Selector sets and script patterns, then the content heuristic, then AI
    #[default]
    Structural,
    /// Completion-backed page reading only
    Ai,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structural => "structural",
            Self::Ai => "ai",
        }
    }
}

/// Per-restaurant price fix-ups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceCorrection {
    /// Three-digit prices lost their trailing zero (199 -> 1990)
    ScaleShort,
}

/// One way of reading offer cards off a page. Field selectors are tried in
/// order inside each container; description matches are joined with " | ".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorSet {
    pub container: String,
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default)]
    pub price: Vec<String>,
    #[serde(default)]
    pub description: Vec<String>,
}

/// Regex run over `<script>` contents. Named groups: `name` (required),
/// `description`, `price`, `day`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptPattern {
    pub pattern: String,
    /// Used when the pattern has no `description` group; `{day}` and
    /// `{name}` are substituted
    #[serde(default)]
    pub description: Option<String>,
}

/// Attach a named choice set to offers whose name contains `needle`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceOffer {
    pub needle: String,
    pub group: String,
    pub options: Vec<String>,
}

impl ChoiceOffer {
    pub fn choice_set(&self) -> ChoiceSet {
        ChoiceSet {
            group: self.group.clone(),
            options: self.options.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantConfig {
    pub name: String,
    pub offers_page: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Ask the model before trying selectors
    #[serde(default)]
    pub prefer_ai: bool,
    #[serde(default)]
    pub selector_sets: Vec<SelectorSet>,
    #[serde(default)]
    pub script_patterns: Vec<ScriptPattern>,
    #[serde(default)]
    pub choice_offers: Vec<ChoiceOffer>,
    #[serde(default)]
    pub price_correction: Option<PriceCorrection>,
    #[serde(default)]
    pub default_suits_people: Option<u32>,
}

impl RestaurantConfig {
    /// Minimal entry for a page read by the model alone
    pub fn ai_only(name: &str, offers_page: &str) -> Self {
        Self {
            name: name.to_string(),
            offers_page: offers_page.to_string(),
            website: None,
            strategy: StrategyKind::Ai,
            prefer_ai: false,
            selector_sets: Vec::new(),
            script_patterns: Vec::new(),
            choice_offers: Vec::new(),
            price_correction: None,
            default_suits_people: None,
        }
    }

    /// Reject selectors and patterns that would fail at scrape time
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("Restaurant with empty name".into()));
        }
        if self.offers_page.trim().is_empty() {
            return Err(Error::Config(format!("{}: offers_page is empty", self.name)));
        }
        for set in &self.selector_sets {
            let all = std::iter::once(&set.container)
                .chain(&set.name)
                .chain(&set.price)
                .chain(&set.description);
            for selector in all {
                parse_selector(selector).map_err(|e| {
                    Error::Config(format!("{}: {}", self.name, e))
                })?;
            }
        }
        for script in &self.script_patterns {
            let regex = Regex::new(&script.pattern)
                .map_err(|e| Error::Config(format!("{}: bad script pattern: {}", self.name, e)))?;
            if !regex.capture_names().flatten().any(|n| n == "name") {
                return Err(Error::Config(format!(
                    "{}: script pattern needs a `name` group",
                    self.name
                )));
            }
        }
        if self.default_suits_people == Some(0) {
            return Err(Error::Config(format!(
                "{}: default_suits_people must be at least 1",
                self.name
            )));
        }
        Ok(())
    }

    pub fn choice_for(&self, offer_name: &str) -> Option<ChoiceSet> {
        let lower = offer_name.to_lowercase();
        self.choice_offers
            .iter()
            .find(|c| lower.contains(&c.needle.to_lowercase()))
            .map(ChoiceOffer::choice_set)
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| Error::Config(format!("Invalid selector '{}': {:?}", selector, e)))
}

#[derive(Debug, Deserialize)]
struct RestaurantFile {
    #[serde(default, rename = "restaurant")]
    restaurants: Vec<RestaurantConfig>,
}

/// Parse and validate a restaurant list
pub fn parse_restaurants(content: &str) -> Result<Vec<RestaurantConfig>> {
    let file: RestaurantFile = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid restaurant list: {}", e)))?;
    if file.restaurants.is_empty() {
        return Err(Error::Config("Restaurant list is empty".into()));
    }
    for restaurant in &file.restaurants {
        restaurant.validate()?;
    }
    Ok(file.restaurants)
}

/// Load the restaurant list: explicit path, else the override in the data
/// dir, else the embedded list
pub fn load_restaurants(path: Option<&Path>) -> Result<Vec<RestaurantConfig>> {
    let path = path.map(Path::to_path_buf).or_else(|| {
        default_restaurants_path().filter(|p| p.exists())
    });
    match path {
        Some(path) => {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            parse_restaurants(&content)
        }
        None => parse_restaurants(DEFAULT_RESTAURANTS),
    }
}

/// Default restaurant list override path
pub fn default_restaurants_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tilbod").join("config").join("restaurants.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_list_is_valid() {
        let restaurants = parse_restaurants(DEFAULT_RESTAURANTS).unwrap();
        let names: Vec<&str> = restaurants.iter().map(|r| r.name.as_str()).collect();
        assert!(names.contains(&"Búllan"));
        assert!(names.contains(&"Subway"));

        let kfc = restaurants.iter().find(|r| r.name == "KFC").unwrap();
        assert_eq!(kfc.price_correction, Some(PriceCorrection::ScaleShort));

        let subway = restaurants.iter().find(|r| r.name == "Subway").unwrap();
        assert_eq!(subway.default_suits_people, Some(1));
        assert!(!subway.script_patterns.is_empty());
    }

    #[test]
    fn test_defaults() {
        let restaurants = parse_restaurants(
            r#"
[[restaurant]]
name = "Pizzan"
offers_page = "https://pizzan.is/tilbod"
"#,
        )
        .unwrap();
        assert_eq!(restaurants[0].strategy, StrategyKind::Structural);
        assert!(!restaurants[0].prefer_ai);
        assert!(restaurants[0].selector_sets.is_empty());
    }

    #[test]
    fn test_bad_selector_rejected() {
        let result = parse_restaurants(
            r#"
[[restaurant]]
name = "Broken"
offers_page = "https://example.is"

[[restaurant.selector_sets]]
container = "div[["
"#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_script_pattern_needs_name_group() {
        let result = parse_restaurants(
            r#"
[[restaurant]]
name = "Broken"
offers_page = "https://example.is"

[[restaurant.script_patterns]]
pattern = '"title":"([^"]+)"'
"#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_list_is_fatal() {
        assert!(parse_restaurants("").is_err());
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = load_restaurants(Some(Path::new("/nonexistent/restaurants.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_choice_for_matches_needle() {
        let mut restaurant = RestaurantConfig::ai_only("Subway", "https://subway.is");
        restaurant.choice_offers.push(ChoiceOffer {
            needle: "bátur dagsins".into(),
            group: "subs".into(),
            options: vec!["Skinkubátur".into(), "Kjúklingabátur".into()],
        });
        let choice = restaurant.choice_for("Bátur dagsins 15cm").unwrap();
        assert_eq!(choice.group, "subs");
        assert!(restaurant.choice_for("Veisluplatti").is_none());
    }
}

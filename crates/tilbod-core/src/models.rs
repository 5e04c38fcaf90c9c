//! Domain models for tilbod

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::classify;

/// Day of the week, stored as the canonical nominative-singular Icelandic word
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "mánudagur")]
    Monday,
    #[serde(rename = "þriðjudagur")]
    Tuesday,
    #[serde(rename = "miðvikudagur")]
    Wednesday,
    #[serde(rename = "fimmtudagur")]
    Thursday,
    #[serde(rename = "föstudagur")]
    Friday,
    #[serde(rename = "laugardagur")]
    Saturday,
    #[serde(rename = "sunnudagur")]
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
        Self::Sunday,
    ];

    /// Monday through Friday ("virka daga")
    pub const WORKDAYS: [Weekday; 5] = [
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
    ];

    /// Saturday and Sunday ("helgar")
    pub const WEEKEND: [Weekday; 2] = [Self::Saturday, Self::Sunday];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monday => "mánudagur",
            Self::Tuesday => "þriðjudagur",
            Self::Wednesday => "miðvikudagur",
            Self::Thursday => "fimmtudagur",
            Self::Friday => "föstudagur",
            Self::Saturday => "laugardagur",
            Self::Sunday => "sunnudagur",
        }
    }

    /// Stem shared by every declined form ("mánu" + dagur/degi/dags/...)
    pub(crate) fn stem(&self) -> &'static str {
        match self {
            Self::Monday => "mánu",
            Self::Tuesday => "þriðju",
            Self::Wednesday => "miðviku",
            Self::Thursday => "fimmtu",
            Self::Friday => "föstu",
            Self::Saturday => "laugar",
            Self::Sunday => "sunnu",
        }
    }

    pub(crate) fn english(&self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }
}

impl std::str::FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| day.as_str() == lower || day.english() == lower)
            .ok_or_else(|| format!("Unknown weekday: {}", s))
    }
}

impl std::fmt::Display for Weekday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How an offer can be received
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupDelivery {
    #[serde(rename = "sækja")]
    Pickup,
    #[serde(rename = "sending")]
    Delivery,
    #[serde(rename = "sækja/sending")]
    Both,
}

impl PickupDelivery {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pickup => "sækja",
            Self::Delivery => "sending",
            Self::Both => "sækja/sending",
        }
    }
}

impl std::fmt::Display for PickupDelivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Coarse food category, also the order of the display groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FoodCategory {
    #[default]
    Main,
    Side,
    Drink,
    Dessert,
}

impl FoodCategory {
    pub const ALL: [FoodCategory; 4] = [Self::Main, Self::Side, Self::Drink, Self::Dessert];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Side => "side",
            Self::Drink => "drink",
            Self::Dessert => "dessert",
        }
    }
}

impl std::str::FromStr for FoodCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "main" | "mains" | "aðalréttur" => Ok(Self::Main),
            "side" | "sides" | "meðlæti" => Ok(Self::Side),
            "drink" | "drinks" | "drykkur" => Ok(Self::Drink),
            "dessert" | "desserts" | "eftirréttur" => Ok(Self::Dessert),
            _ => Err(format!("Unknown food category: {}", s)),
        }
    }
}

impl std::fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Composition class of an offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Individual,
    Combo,
    Sharing,
    Family,
    Dessert,
    Snack,
    #[default]
    Unknown,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Combo => "combo",
            Self::Sharing => "sharing",
            Self::Family => "family",
            Self::Dessert => "dessert",
            Self::Snack => "snack",
            Self::Unknown => "unknown",
        }
    }

    /// Glyph shown in front of the visual summary
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Family => "👨‍👩‍👧‍👦",
            Self::Sharing => "👥",
            Self::Combo => "🍽️",
            Self::Individual => "🧑",
            Self::Dessert => "🍰",
            Self::Snack => "🥨",
            Self::Unknown => "🍽️",
        }
    }
}

impl std::str::FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "individual" => Ok(Self::Individual),
            "combo" => Ok(Self::Combo),
            "sharing" => Ok(Self::Sharing),
            "family" => Ok(Self::Family),
            "dessert" => Ok(Self::Dessert),
            "snack" => Ok(Self::Snack),
            "unknown" => Ok(Self::Unknown),
            _ => Err(format!("Unknown meal type: {}", s)),
        }
    }
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unit of a food item size
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeUnit {
    Inches,
    Liters,
    /// Free-form descriptor such as "stór" or "medium"
    Descriptor,
}

/// Size of a food item: a measured value or a descriptor word
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Size {
    pub unit: SizeUnit,
    pub value: String,
}

impl Size {
    pub fn inches(value: impl Into<String>) -> Self {
        Self {
            unit: SizeUnit::Inches,
            value: value.into(),
        }
    }

    pub fn liters(value: impl Into<String>) -> Self {
        Self {
            unit: SizeUnit::Liters,
            value: value.into(),
        }
    }

    pub fn descriptor(value: impl Into<String>) -> Self {
        Self {
            unit: SizeUnit::Descriptor,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.unit {
            SizeUnit::Inches => write!(f, "{}\"", self.value),
            SizeUnit::Liters => write!(f, "{} l", self.value),
            SizeUnit::Descriptor => write!(f, "{}", self.value),
        }
    }
}

/// Display attributes resolved for a food item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDisplay {
    /// Iconify identifier, e.g. "twemoji:pizza"
    pub icon: String,
    /// Hex color for the icon
    pub color: String,
    /// Emoji used in the visual summary string
    pub glyph: String,
}

/// One recognized food or drink component of an offer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    /// Key from the controlled vocabulary (pizza, burger, soda, ...)
    #[serde(rename = "type")]
    pub kind: String,
    /// Nominative-singular name as it appeared in the offer
    pub name: String,
    pub category: FoodCategory,
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub modifiers: BTreeSet<String>,
    #[serde(default)]
    pub is_choice: bool,
    #[serde(default)]
    pub choice_group: Option<String>,
    /// Set by display enrichment, stripped before persistence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<ItemDisplay>,
}

impl FoodItem {
    pub fn new(kind: impl Into<String>, name: impl Into<String>, category: FoodCategory) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            category,
            quantity: 1,
            size: None,
            modifiers: BTreeSet::new(),
            is_choice: false,
            choice_group: None,
            display: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }

    pub fn with_size(mut self, size: Option<Size>) -> Self {
        self.size = size;
        self
    }

    /// Mark as one alternative of a choose-one group
    pub fn as_choice(mut self, group: impl Into<String>) -> Self {
        self.is_choice = true;
        self.choice_group = Some(group.into());
        self
    }
}

/// A named list of alternatives attached to a composite offer
/// ("veldu einn af þremur bátum")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceSet {
    pub group: String,
    pub options: Vec<String>,
}

/// An offer as discovered on a restaurant page, before food extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOffer {
    #[serde(rename = "offer_name")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Price in whole krónur
    #[serde(default, rename = "price_kr")]
    pub price: Option<u32>,
    #[serde(default)]
    pub pickup_delivery: Option<PickupDelivery>,
    #[serde(default)]
    pub suits_people: Option<u32>,
    #[serde(default)]
    pub available_weekdays: Vec<Weekday>,
    #[serde(default)]
    pub available_hours: Vec<String>,
    #[serde(default)]
    pub availability_text: Option<String>,
    /// URL the offer was scraped from
    #[serde(rename = "source_url")]
    pub source: String,
    pub restaurant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<ChoiceSet>,
}

impl RawOffer {
    /// Create an offer; returns None when the name is blank
    pub fn new(
        name: impl AsRef<str>,
        restaurant: impl Into<String>,
        source: impl Into<String>,
    ) -> Option<Self> {
        let name = collapse_whitespace(name.as_ref());
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            description: None,
            price: None,
            pickup_delivery: None,
            suits_people: None,
            available_weekdays: Vec::new(),
            available_hours: Vec::new(),
            availability_text: None,
            source: source.into(),
            restaurant: restaurant.into(),
            choices: None,
        })
    }

    pub fn with_description(mut self, description: impl AsRef<str>) -> Self {
        let description = collapse_whitespace(description.as_ref());
        self.description = (!description.is_empty()).then_some(description);
        self
    }

    pub fn with_price(mut self, price: Option<u32>) -> Self {
        self.price = price;
        self
    }

    /// Name and description joined, the text every extractor reads
    pub fn text(&self) -> String {
        match &self.description {
            Some(description) => format!("{} {}", self.name, description),
            None => self.name.clone(),
        }
    }
}

/// A standardized display tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardizedTag {
    pub label: String,
    pub icon: String,
    pub color: String,
}

/// Fallback visual summary for offers with no recognized items
pub const GENERIC_VISUAL_SUMMARY: &str = "🍽️ General offer";

/// An offer with food decomposition, classification and display data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedOffer {
    #[serde(flatten)]
    pub offer: RawOffer,
    pub food_items: Vec<FoodItem>,
    pub main_items: Vec<FoodItem>,
    pub side_items: Vec<FoodItem>,
    pub drink_items: Vec<FoodItem>,
    pub dessert_items: Vec<FoodItem>,
    pub meal_type: MealType,
    pub is_combo: bool,
    pub total_food_items: u32,
    pub visual_summary: String,
    pub standardized_tags: Vec<StandardizedTag>,
}

impl EnhancedOffer {
    /// Classify a raw offer's food items. Display fields start at their
    /// fallback values until enrichment runs.
    pub fn new(offer: RawOffer, food_items: Vec<FoodItem>) -> Self {
        let meal_type = classify::classify(&food_items, &offer.text());
        let mut enhanced = Self {
            is_combo: classify::is_combo(&food_items),
            total_food_items: classify::total_items(&food_items),
            offer,
            food_items,
            main_items: Vec::new(),
            side_items: Vec::new(),
            drink_items: Vec::new(),
            dessert_items: Vec::new(),
            meal_type,
            visual_summary: GENERIC_VISUAL_SUMMARY.to_string(),
            standardized_tags: Vec::new(),
        };
        enhanced.refresh_views();
        enhanced
    }

    /// Rebuild the per-category lists from `food_items`
    pub fn refresh_views(&mut self) {
        let mut views: [Vec<FoodItem>; 4] = Default::default();
        for item in &self.food_items {
            let slot = match item.category {
                FoodCategory::Main => 0,
                FoodCategory::Side => 1,
                FoodCategory::Drink => 2,
                FoodCategory::Dessert => 3,
            };
            views[slot].push(item.clone());
        }
        let [main, side, drink, dessert] = views;
        self.main_items = main;
        self.side_items = side;
        self.drink_items = drink;
        self.dessert_items = dessert;
    }

    pub fn items_in(&self, category: FoodCategory) -> &[FoodItem] {
        match category {
            FoodCategory::Main => &self.main_items,
            FoodCategory::Side => &self.side_items,
            FoodCategory::Drink => &self.drink_items,
            FoodCategory::Dessert => &self.dessert_items,
        }
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_from_str() {
        assert_eq!("Mánudagur".parse::<Weekday>().unwrap(), Weekday::Monday);
        assert_eq!("sunday".parse::<Weekday>().unwrap(), Weekday::Sunday);
        assert!("dagur".parse::<Weekday>().is_err());
    }

    #[test]
    fn test_weekday_serializes_as_icelandic() {
        let json = serde_json::to_string(&vec![Weekday::Thursday, Weekday::Saturday]).unwrap();
        assert_eq!(json, r#"["fimmtudagur","laugardagur"]"#);
    }

    #[test]
    fn test_raw_offer_rejects_blank_name() {
        assert!(RawOffer::new("   ", "KFC", "https://kfc.is").is_none());
        let offer = RawOffer::new("  Tilboð \n 1 ", "KFC", "https://kfc.is").unwrap();
        assert_eq!(offer.name, "Tilboð 1");
    }

    #[test]
    fn test_food_item_quantity_never_zero() {
        let item = FoodItem::new("pizza", "pizza", FoodCategory::Main).with_quantity(0);
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_meal_type_roundtrip_str() {
        for meal in [
            MealType::Individual,
            MealType::Combo,
            MealType::Sharing,
            MealType::Family,
            MealType::Dessert,
            MealType::Snack,
            MealType::Unknown,
        ] {
            assert_eq!(meal.as_str().parse::<MealType>().unwrap(), meal);
        }
    }

    #[test]
    fn test_enhanced_offer_partitions_items() {
        let offer = RawOffer::new("Tilboð", "Test", "https://example.is").unwrap();
        let items = vec![
            FoodItem::new("pizza", "pizza", FoodCategory::Main),
            FoodItem::new("fries", "franskar", FoodCategory::Side),
            FoodItem::new("soda", "gos", FoodCategory::Drink),
            FoodItem::new("cookie", "kaka", FoodCategory::Dessert),
        ];
        let enhanced = EnhancedOffer::new(offer, items);
        assert_eq!(enhanced.main_items.len(), 1);
        assert_eq!(enhanced.side_items.len(), 1);
        assert_eq!(enhanced.drink_items.len(), 1);
        assert_eq!(enhanced.dessert_items.len(), 1);
        assert_eq!(enhanced.visual_summary, GENERIC_VISUAL_SUMMARY);
    }

    #[test]
    fn test_size_display() {
        assert_eq!(Size::inches("12").to_string(), "12\"");
        assert_eq!(Size::liters("2").to_string(), "2 l");
        assert_eq!(Size::descriptor("stór").to_string(), "stór");
    }
}

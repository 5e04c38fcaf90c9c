//! Export and persistence projections for enhanced offers
//!
//! Supports:
//! - `PersistedOffer`: core fields only, display data stripped, handed to an `OfferSink`
//! - JSON snapshot of the full EnhancedOffer set for a presentation layer
//! - Flat CSV of core fields

use std::fs;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{
    EnhancedOffer, FoodCategory, FoodItem, MealType, PickupDelivery, Size, Weekday,
};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Pick the format from a file extension (`.csv`, else JSON)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

/// A food item as stored: no display attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedFoodItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub category: FoodCategory,
    pub quantity: u32,
    pub size: Option<Size>,
    pub modifiers: Vec<String>,
    pub is_choice: bool,
    pub choice_group: Option<String>,
}

impl From<&FoodItem> for PersistedFoodItem {
    fn from(item: &FoodItem) -> Self {
        Self {
            kind: item.kind.clone(),
            name: item.name.clone(),
            category: item.category,
            quantity: item.quantity,
            size: item.size.clone(),
            modifiers: item.modifiers.iter().cloned().collect(),
            is_choice: item.is_choice,
            choice_group: item.choice_group.clone(),
        }
    }
}

/// Core fields of an offer, as handed to persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedOffer {
    pub offer_name: String,
    pub description: Option<String>,
    pub price_kr: Option<u32>,
    pub pickup_delivery: Option<PickupDelivery>,
    pub suits_people: Option<u32>,
    pub available_weekdays: Vec<Weekday>,
    pub available_hours: Vec<String>,
    pub availability_text: Option<String>,
    pub source_url: String,
    pub restaurant: String,
    pub meal_type: MealType,
    pub is_combo: bool,
    pub total_food_items: u32,
    pub food_items: Vec<PersistedFoodItem>,
}

impl From<&EnhancedOffer> for PersistedOffer {
    fn from(enhanced: &EnhancedOffer) -> Self {
        let offer = &enhanced.offer;
        Self {
            offer_name: offer.name.clone(),
            description: offer.description.clone(),
            price_kr: offer.price,
            pickup_delivery: offer.pickup_delivery,
            suits_people: offer.suits_people,
            available_weekdays: offer.available_weekdays.clone(),
            available_hours: offer.available_hours.clone(),
            availability_text: offer.availability_text.clone(),
            source_url: offer.source.clone(),
            restaurant: offer.restaurant.clone(),
            meal_type: enhanced.meal_type,
            is_combo: enhanced.is_combo,
            total_food_items: enhanced.total_food_items,
            food_items: enhanced.food_items.iter().map(PersistedFoodItem::from).collect(),
        }
    }
}

/// Persistence collaborator
pub trait OfferSink: Send {
    /// Store one restaurant's offers, returns how many were stored
    fn store(&mut self, restaurant: &str, offers: &[PersistedOffer]) -> Result<usize>;
}

/// Keeps offers in memory, replacing a restaurant's previous batch
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    offers: Vec<PersistedOffer>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offers(&self) -> &[PersistedOffer] {
        &self.offers
    }
}

impl OfferSink for MemorySink {
    fn store(&mut self, restaurant: &str, offers: &[PersistedOffer]) -> Result<usize> {
        self.offers.retain(|o| o.restaurant != restaurant);
        self.offers.extend_from_slice(offers);
        Ok(offers.len())
    }
}

/// Full snapshot for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub generated_at: String,
    pub restaurants: Vec<String>,
    pub offers: Vec<EnhancedOffer>,
}

impl Snapshot {
    pub fn new(offers: Vec<EnhancedOffer>) -> Self {
        let mut restaurants: Vec<String> = Vec::new();
        for offer in &offers {
            if !restaurants.contains(&offer.offer.restaurant) {
                restaurants.push(offer.offer.restaurant.clone());
            }
        }
        Self {
            generated_at: Utc::now().to_rfc3339(),
            restaurants,
            offers,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_creating_dirs(path, &self.to_json()?)
    }
}

/// One CSV row per offer
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    restaurant: &'a str,
    offer_name: &'a str,
    description: &'a str,
    price_kr: Option<u32>,
    pickup_delivery: Option<&'a str>,
    suits_people: Option<u32>,
    available_weekdays: String,
    available_hours: String,
    meal_type: &'a str,
    is_combo: bool,
    total_food_items: u32,
    food_items: String,
    source_url: &'a str,
}

/// Flat CSV of core fields; list fields are joined with "; "
pub fn export_offers_csv(offers: &[PersistedOffer]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for offer in offers {
        writer.serialize(CsvRow {
            restaurant: &offer.restaurant,
            offer_name: &offer.offer_name,
            description: offer.description.as_deref().unwrap_or(""),
            price_kr: offer.price_kr,
            pickup_delivery: offer.pickup_delivery.as_ref().map(PickupDelivery::as_str),
            suits_people: offer.suits_people,
            available_weekdays: offer
                .available_weekdays
                .iter()
                .map(Weekday::as_str)
                .collect::<Vec<_>>()
                .join("; "),
            available_hours: offer.available_hours.join("; "),
            meal_type: offer.meal_type.as_str(),
            is_combo: offer.is_combo,
            total_food_items: offer.total_food_items,
            food_items: offer
                .food_items
                .iter()
                .map(|item| format!("{}x {}", item.quantity, item.name))
                .collect::<Vec<_>>()
                .join("; "),
            source_url: &offer.source_url,
        })?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| crate::error::Error::InvalidData(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| crate::error::Error::InvalidData(format!("CSV is not UTF-8: {}", e)))
}

pub fn write_offers_csv(path: &Path, offers: &[PersistedOffer]) -> Result<()> {
    write_creating_dirs(path, &export_offers_csv(offers)?)
}

fn write_creating_dirs(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemDisplay, RawOffer};

    fn enhanced() -> EnhancedOffer {
        let mut offer = RawOffer::new("Tilboð 1", "Búllan", "https://tommis.is")
            .unwrap()
            .with_description("Borgari, franskar og gos")
            .with_price(Some(2990));
        offer.available_weekdays = vec![Weekday::Monday, Weekday::Tuesday];
        let mut burger = FoodItem::new("burger", "borgari", FoodCategory::Main);
        burger.display = Some(ItemDisplay {
            icon: "fluent-emoji:hamburger".into(),
            color: "#D2691E".into(),
            glyph: "🍔".into(),
        });
        let fries = FoodItem::new("fries", "franskar", FoodCategory::Side);
        EnhancedOffer::new(offer, vec![burger, fries])
    }

    #[test]
    fn test_persisted_offer_strips_display() {
        let persisted = PersistedOffer::from(&enhanced());
        let json = serde_json::to_value(&persisted).unwrap();
        assert_eq!(json["offer_name"], "Tilboð 1");
        assert_eq!(json["price_kr"], 2990);
        assert_eq!(json["meal_type"], "combo");
        assert!(json.get("visual_summary").is_none());
        assert!(json["food_items"][0].get("display").is_none());
        assert_eq!(json["food_items"][0]["type"], "burger");
    }

    #[test]
    fn test_memory_sink_replaces_restaurant_batch() {
        let persisted = PersistedOffer::from(&enhanced());
        let mut sink = MemorySink::new();
        assert_eq!(sink.store("Búllan", &[persisted.clone(), persisted.clone()]).unwrap(), 2);
        assert_eq!(sink.store("Búllan", &[persisted]).unwrap(), 1);
        assert_eq!(sink.offers().len(), 1);
    }

    #[test]
    fn test_snapshot_shape() {
        let snapshot = Snapshot::new(vec![enhanced(), enhanced()]);
        assert_eq!(snapshot.restaurants, vec!["Búllan"]);

        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert!(json["generated_at"].is_string());
        assert_eq!(json["offers"].as_array().unwrap().len(), 2);
        assert_eq!(json["offers"][0]["offer_name"], "Tilboð 1");
        assert!(json["offers"][0]["main_items"].is_array());
        assert!(json["offers"][0]["visual_summary"].is_string());
    }

    #[test]
    fn test_csv_export() {
        let csv = export_offers_csv(&[PersistedOffer::from(&enhanced())]).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("restaurant,offer_name,description,price_kr"));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Borgari, franskar og gos\""));
        assert!(row.contains("mánudagur; þriðjudagur"));
        assert!(row.contains("1x borgari; 1x franskar"));
    }

    #[test]
    fn test_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("out").join("offers.json");
        Snapshot::new(vec![enhanced()]).write_json(&json_path).unwrap();
        assert!(json_path.exists());

        let csv_path = dir.path().join("offers.csv");
        assert_eq!(ExportFormat::from_path(&csv_path), ExportFormat::Csv);
        write_offers_csv(&csv_path, &[PersistedOffer::from(&enhanced())]).unwrap();
        assert!(fs::read_to_string(&csv_path).unwrap().contains("Búllan"));
    }
}

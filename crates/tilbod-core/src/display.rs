//! Display enrichment: item icons, standardized tags and the visual summary
//!
//! Everything here is a deterministic function of the food items and the meal
//! type, so enriching an already-enriched offer reproduces the same values.

use crate::models::{
    EnhancedOffer, FoodCategory, FoodItem, ItemDisplay, MealType, StandardizedTag,
    GENERIC_VISUAL_SUMMARY,
};

/// Most tags shown for one offer
pub const MAX_TAGS: usize = 3;

/// (lexicon key, iconify id, color, glyph)
const ICONS: &[(&str, &str, &str, &str)] = &[
    ("chicken", "mdi:food-drumstick", "#D4AF37", "🍗"),
    ("wings", "mdi:food-drumstick", "#D4AF37", "🍗"),
    ("kjúklingur", "mdi:food-drumstick", "#D4AF37", "🍗"),
    ("beef", "mdi:food-steak", "#8B4513", "🥩"),
    ("nautakjöt", "mdi:food-steak", "#8B4513", "🥩"),
    ("burger", "fluent-emoji:hamburger", "#8B4513", "🍔"),
    ("kids_burger", "fluent-emoji:hamburger", "#CD853F", "🍔"),
    ("pizza", "twemoji:pizza", "#FF6B35", "🍕"),
    ("sub", "mdi:food-sandwich", "#228B22", "🥖"),
    ("bátur", "mdi:food-sandwich", "#228B22", "🥖"),
    ("sandwich", "mdi:food-hot-dog", "#228B22", "🥪"),
    ("hotdog", "mdi:food-hot-dog", "#8B4513", "🌭"),
    ("wrap", "mdi:food-hot-dog", "#228B22", "🌯"),
    ("fish", "mdi:fish", "#4A90E2", "🐟"),
    ("fries", "mdi:food-french-fries", "#8B4513", "🍟"),
    ("franskar", "mdi:food-french-fries", "#8B4513", "🍟"),
    ("salad", "noto:green-salad", "#228B22", "🥗"),
    ("bread", "mdi:bread-slice", "#DEB887", "🍞"),
    ("sauce", "game-icons:ketchup", "#FF4500", "🥫"),
    ("snack", "mdi:food-variant", "#8B4513", "🥨"),
    ("soda", "mdi:bottle-soda-classic", "#4A90E2", "🥤"),
    ("gos", "mdi:cup", "#000000", "🥤"),
    ("juice", "mdi:cup", "#FFA500", "🧃"),
    ("coffee", "mdi:coffee", "#8B4513", "☕"),
    ("water", "mdi:cup-water", "#87CEEB", "💧"),
    ("ice_cream", "mdi:ice-cream", "#FF69B4", "🍦"),
    ("cookie", "mdi:cookie", "#D2691E", "🍪"),
    ("cake", "mdi:cake-variant", "#FF69B4", "🍰"),
    ("dessert", "mdi:ice-cream", "#FF69B4", "🍨"),
];

/// Generic icons for categories; desserts have none and go through the
/// substring match
const CATEGORY_ICONS: &[(&str, &str, &str, &str)] = &[
    ("main", "mdi:food", "#8B4513", "🍽️"),
    ("side", "mdi:food-fork-drink", "#228B22", "🥔"),
    ("drink", "mdi:cup", "#4A90E2", "🥤"),
];

const DEFAULT_ICON: (&str, &str, &str) = ("mdi:food", "#8B4513", "🍽️");

/// Tag labels with their icon and color
const TAG_ICONS: &[(&str, &str, &str)] = &[
    ("Kjúklingur", "mdi:food-drumstick", "#D4AF37"),
    ("Nautakjöt", "mdi:food-steak", "#8B4513"),
    ("Pizza", "twemoji:pizza", "#FF6B35"),
    ("Franskar", "mdi:food-french-fries", "#8B4513"),
    ("Sub", "mdi:food-sandwich", "#228B22"),
    ("Gos", "mdi:cup", "#000000"),
    ("Drykkur", "mdi:cup", "#4A90E2"),
];

const SODA_NAMES: &[&str] = &["gos", "soda", "kók", "coke", "pepsi", "cola"];

/// Icon for an item type: exact key, then its category, then a substring
/// match in either direction, then the generic default
pub fn resolve_display(kind: &str, category: FoodCategory) -> ItemDisplay {
    let kind = kind.trim().to_lowercase();
    let found = ICONS
        .iter()
        .find(|(key, ..)| *key == kind)
        .or_else(|| {
            CATEGORY_ICONS
                .iter()
                .find(|(key, ..)| *key == category.as_str())
        })
        .or_else(|| {
            (!kind.is_empty())
                .then(|| {
                    ICONS
                        .iter()
                        .find(|(key, ..)| kind.contains(key) || key.contains(kind.as_str()))
                })
                .flatten()
        });

    let (icon, color, glyph) = match found {
        Some((_, icon, color, glyph)) => (*icon, *color, *glyph),
        None => DEFAULT_ICON,
    };
    ItemDisplay {
        icon: icon.to_string(),
        color: color.to_string(),
        glyph: glyph.to_string(),
    }
}

/// Attach display data, tags and the visual summary to an offer
pub fn enrich(mut offer: EnhancedOffer) -> EnhancedOffer {
    for item in &mut offer.food_items {
        item.display = Some(resolve_display(&item.kind, item.category));
    }
    offer.refresh_views();
    offer.standardized_tags = standardized_tags(&offer.food_items);
    offer.visual_summary = visual_summary(&offer.food_items, offer.meal_type);
    offer
}

/// Up to three tags, tested in a fixed order
pub fn standardized_tags(items: &[FoodItem]) -> Vec<StandardizedTag> {
    let mut labels: Vec<&str> = Vec::new();
    if any_item(items, |item, name| item.kind == "chicken" || name.contains("kjúkling")) {
        labels.push("Kjúklingur");
    }
    if any_item(items, |item, name| item.kind == "beef" || name.contains("nautakjöt")) {
        labels.push("Nautakjöt");
    }
    if any_item(items, |item, name| item.kind == "pizza" || name.contains("pizza")) {
        labels.push("Pizza");
    }
    if any_item(items, |item, name| {
        item.kind == "fries" || name.contains("franskar") || name.contains("pommes")
    }) {
        labels.push("Franskar");
    }
    if any_item(items, |item, name| item.kind == "sub" || name.contains("bátur") || name.contains("sub")) {
        labels.push("Sub");
    }

    let drinks: Vec<String> = items
        .iter()
        .filter(|item| item.category == FoodCategory::Drink)
        .map(|item| item.name.to_lowercase())
        .collect();
    if !drinks.is_empty() {
        let soda = drinks
            .iter()
            .any(|name| SODA_NAMES.iter().any(|soda| name.contains(soda)));
        labels.push(if soda { "Gos" } else { "Drykkur" });
    }

    labels
        .into_iter()
        .take(MAX_TAGS)
        .filter_map(|label| TAG_ICONS.iter().find(|(l, ..)| *l == label))
        .map(|(label, icon, color)| StandardizedTag {
            label: label.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
        })
        .collect()
}

fn any_item(items: &[FoodItem], test: impl Fn(&FoodItem, &str) -> bool) -> bool {
    items
        .iter()
        .any(|item| test(item, &item.name.to_lowercase()))
}

/// Glyphs grouped main, side, drink, dessert, prefixed by the meal glyph.
/// Alternatives are left out so a choice of three drinks shows no drinks.
pub fn visual_summary(items: &[FoodItem], meal_type: MealType) -> String {
    if items.is_empty() {
        return GENERIC_VISUAL_SUMMARY.to_string();
    }

    let groups: Vec<String> = FoodCategory::ALL
        .iter()
        .map(|category| {
            items
                .iter()
                .filter(|item| !item.is_choice && item.category == *category)
                .map(|item| match &item.display {
                    Some(display) => display.glyph.clone(),
                    None => resolve_display(&item.kind, item.category).glyph,
                })
                .collect::<String>()
        })
        .filter(|group| !group.is_empty())
        .collect();

    let visual = if groups.is_empty() {
        DEFAULT_ICON.2.to_string()
    } else {
        groups.join(" + ")
    };
    format!("{} {}", meal_type.glyph(), visual)
}

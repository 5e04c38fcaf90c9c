//! Meal classification
//!
//! Pure functions over a food-item list. Choice alternatives never count as
//! separate items: a choice group stands for the one item the customer picks.

use std::collections::HashSet;

use crate::models::{FoodCategory, FoodItem, MealType};

/// Lexical evidence required before an offer is called a family meal
const FAMILY_EVIDENCE: &[&str] = &["fjölskyld", "family"];

/// Sum of quantities, alternatives excluded
pub fn total_items(items: &[FoodItem]) -> u32 {
    items
        .iter()
        .filter(|item| !item.is_choice)
        .map(|item| item.quantity)
        .sum()
}

/// At least two of main/side/drink are present among the fixed items
pub fn is_combo(items: &[FoodItem]) -> bool {
    let categories: HashSet<FoodCategory> = items
        .iter()
        .filter(|item| !item.is_choice && item.category != FoodCategory::Dessert)
        .map(|item| item.category)
        .collect();
    categories.len() >= 2
}

/// Classify an offer from its items and its text.
///
/// "family" needs the word in the text; everything else follows from the
/// distinct main items.
pub fn classify(items: &[FoodItem], text: &str) -> MealType {
    if items.is_empty() {
        return MealType::Snack;
    }

    let lower = text.to_lowercase();
    if FAMILY_EVIDENCE.iter().any(|word| lower.contains(word)) {
        return MealType::Family;
    }

    let mains = distinct_mains(items);
    let has_side_or_drink = items
        .iter()
        .any(|item| matches!(item.category, FoodCategory::Side | FoodCategory::Drink));

    match mains {
        0 if items.iter().any(|item| item.category == FoodCategory::Dessert) => MealType::Dessert,
        0 => MealType::Snack,
        1 if has_side_or_drink => MealType::Combo,
        1 => MealType::Individual,
        _ => MealType::Sharing,
    }
}

/// Distinct main items; a group of main alternatives counts once
fn distinct_mains(items: &[FoodItem]) -> usize {
    let mut fixed: HashSet<(&str, &str)> = HashSet::new();
    let mut groups: HashSet<&str> = HashSet::new();
    for item in items.iter().filter(|i| i.category == FoodCategory::Main) {
        match (&item.choice_group, item.is_choice) {
            (Some(group), true) => {
                groups.insert(group.as_str());
            }
            _ => {
                fixed.insert((item.kind.as_str(), item.name.as_str()));
            }
        }
    }
    fixed.len() + groups.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: &str, category: FoodCategory) -> FoodItem {
        FoodItem::new(kind, kind, category)
    }

    #[test]
    fn test_empty_is_snack() {
        assert_eq!(classify(&[], "Fjölskyldutilboð"), MealType::Snack);
        assert_eq!(total_items(&[]), 0);
        assert!(!is_combo(&[]));
    }

    #[test]
    fn test_rules() {
        let pizza = item("pizza", FoodCategory::Main);
        let burger = item("burger", FoodCategory::Main);
        let fries = item("fries", FoodCategory::Side);
        let cookie = item("cookie", FoodCategory::Dessert);

        assert_eq!(classify(&[pizza.clone()], ""), MealType::Individual);
        assert_eq!(classify(&[pizza.clone(), fries.clone()], ""), MealType::Combo);
        assert_eq!(classify(&[pizza.clone(), burger], ""), MealType::Sharing);
        assert_eq!(classify(&[cookie.clone()], ""), MealType::Dessert);
        assert_eq!(classify(&[fries], ""), MealType::Snack);
        assert_eq!(classify(&[pizza, cookie], ""), MealType::Individual);
    }

    #[test]
    fn test_quantity_alone_is_not_sharing() {
        let pizzas = item("pizza", FoodCategory::Main).with_quantity(4);
        assert_eq!(classify(&[pizzas], "4 pizzur"), MealType::Individual);
    }

    #[test]
    fn test_family_needs_text_evidence() {
        let items = [
            item("pizza", FoodCategory::Main).with_quantity(3),
            item("soda", FoodCategory::Drink),
        ];
        assert_eq!(classify(&items, "Fjölskyldutilboð"), MealType::Family);
        assert_eq!(classify(&items, "Family deal"), MealType::Family);
        assert_eq!(classify(&items, "Stórt tilboð"), MealType::Combo);
    }

    #[test]
    fn test_main_alternatives_count_once() {
        let items = [
            FoodItem::new("sub", "skinkubátur", FoodCategory::Main).as_choice("subs"),
            FoodItem::new("sub", "túnfiskbátur", FoodCategory::Main).as_choice("subs"),
            item("soda", FoodCategory::Drink),
        ];
        assert_eq!(classify(&items, ""), MealType::Combo);
    }

    #[test]
    fn test_choice_items_excluded_from_totals() {
        let items = [
            item("burger", FoodCategory::Main).with_quantity(2),
            item("soda", FoodCategory::Drink).as_choice("drinks"),
            item("juice", FoodCategory::Drink).as_choice("drinks"),
        ];
        assert_eq!(total_items(&items), 2);
        assert!(!is_combo(&items));
    }

    #[test]
    fn test_combo_ignores_dessert() {
        let items = [item("pizza", FoodCategory::Main), item("cookie", FoodCategory::Dessert)];
        assert!(!is_combo(&items));
        let items = [item("fries", FoodCategory::Side), item("soda", FoodCategory::Drink)];
        assert!(is_combo(&items));
    }
}

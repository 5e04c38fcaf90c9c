//! Restaurant list command

use std::path::Path;

use anyhow::{Context, Result};
use tilbod_core::sources::config::default_restaurants_path;
use tilbod_core::{load_restaurants, RestaurantConfig};

/// Short description of how a restaurant's page is read
pub fn describe_strategy(restaurant: &RestaurantConfig) -> String {
    let mut parts = vec![restaurant.strategy.as_str().to_string()];
    if restaurant.prefer_ai {
        parts.push("ai first".to_string());
    }
    if !restaurant.selector_sets.is_empty() {
        parts.push(format!("{} selector sets", restaurant.selector_sets.len()));
    }
    if !restaurant.script_patterns.is_empty() {
        parts.push(format!("{} script patterns", restaurant.script_patterns.len()));
    }
    parts.join(", ")
}

pub fn cmd_restaurants(path: Option<&Path>) -> Result<()> {
    let restaurants = load_restaurants(path).context("Failed to load restaurant list")?;

    println!("Configured restaurants:\n");
    println!("{:<20} {:<40} {}", "NAME", "STRATEGY", "OFFERS PAGE");
    println!("{}", "-".repeat(100));

    for restaurant in &restaurants {
        println!(
            "{:<20} {:<40} {}",
            restaurant.name,
            describe_strategy(restaurant),
            restaurant.offers_page
        );
    }

    println!();
    let source = match path {
        Some(path) => path.display().to_string(),
        None => match default_restaurants_path().filter(|p| p.exists()) {
            Some(path) => path.display().to_string(),
            None => "built-in list".to_string(),
        },
    };
    println!("Source: {}", source);

    Ok(())
}

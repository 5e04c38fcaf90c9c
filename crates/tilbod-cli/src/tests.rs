//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;

use clap::Parser;
use tilbod_core::{
    FoodExtractor, MealType, MemoryStore, PromptLibrary, RegexFoodExtractor, VocabularyRepository,
};

use crate::cli::{Cli, Commands, ExtractorKind, PromptsAction};
use crate::commands::{self, truncate};

const RESTAURANTS: &str = r#"
[[restaurant]]
name = "Pizzan"
offers_page = "https://pizzan.is/tilbod"

[[restaurant.selector_sets]]
container = "div.offer"
name = ["h3"]
price = [".price"]

[[restaurant]]
name = "Lesarinn"
offers_page = "https://lesarinn.is"
strategy = "ai"
"#;

fn memory_vocabulary() -> VocabularyRepository {
    VocabularyRepository::load(Box::new(MemoryStore::new())).unwrap()
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_parse_run_options() {
    let cli = Cli::try_parse_from([
        "tilbod",
        "run",
        "--only",
        "KFC,Búllan",
        "--extractor",
        "llm",
        "--out",
        "offers.json",
        "--delay-secs",
        "0",
    ])
    .unwrap();

    match cli.command {
        Commands::Run {
            only,
            extractor,
            out,
            csv,
            delay_secs,
            fetch_timeout_secs,
        } => {
            assert_eq!(only, vec!["KFC", "Búllan"]);
            assert_eq!(extractor, ExtractorKind::Llm);
            assert_eq!(out.unwrap().to_str(), Some("offers.json"));
            assert!(csv.is_none());
            assert_eq!(delay_secs, 0);
            assert_eq!(fetch_timeout_secs, 30);
        }
        _ => panic!("expected run"),
    }
}

#[test]
fn test_parse_run_defaults() {
    let cli = Cli::try_parse_from(["tilbod", "run"]).unwrap();
    match cli.command {
        Commands::Run {
            only,
            extractor,
            delay_secs,
            ..
        } => {
            assert!(only.is_empty());
            assert_eq!(extractor, ExtractorKind::Regex);
            assert_eq!(delay_secs, 2);
        }
        _ => panic!("expected run"),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli =
        Cli::try_parse_from(["tilbod", "vocab", "--vocabulary", "/tmp/v.json", "-v"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.vocabulary.unwrap().to_str(), Some("/tmp/v.json"));
}

#[test]
fn test_parse_prompts_show() {
    let cli = Cli::try_parse_from(["tilbod", "prompts", "show", "extract_offers"]).unwrap();
    match cli.command {
        Commands::Prompts {
            action: Some(PromptsAction::Show { id }),
        } => assert_eq!(id, "extract_offers"),
        _ => panic!("expected prompts show"),
    }
}

#[test]
fn test_rejects_unknown_extractor() {
    assert!(Cli::try_parse_from(["tilbod", "run", "--extractor", "magic"]).is_err());
    assert!(Cli::try_parse_from(["tilbod", "extract"]).is_err());
}

// ========== Run Command Tests ==========

#[test]
fn test_select_restaurants() {
    let all = tilbod_core::sources::parse_restaurants(RESTAURANTS).unwrap();

    let selected = commands::select_restaurants(all.clone(), &["pizzan".to_string()]).unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].name, "Pizzan");

    assert_eq!(commands::select_restaurants(all.clone(), &[]).unwrap().len(), 2);
    assert!(commands::select_restaurants(all, &["Horfið".to_string()]).is_err());
}

#[test]
fn test_llm_extractor_needs_backend() {
    let mut prompts = tilbod_core::PromptLibrary::new();
    let result = commands::core::build_extractor(ExtractorKind::Llm, None, &mut prompts);
    assert!(result.is_err());

    let client = tilbod_core::AIClient::mock();
    let extractor =
        commands::core::build_extractor(ExtractorKind::Llm, Some(&client), &mut prompts).unwrap();
    assert_eq!(extractor.name(), "llm");
}

// ========== Extract Command Tests ==========

#[tokio::test]
async fn test_extract_offer() {
    let mut vocabulary = memory_vocabulary();
    let offer = commands::extract_offer(
        "Tilboð 1",
        "Stór pizza og 2 l gos. Sótt, 3.490 kr",
        "Pizzan",
        &RegexFoodExtractor::new(),
        &mut vocabulary,
    )
    .await
    .unwrap();

    assert_eq!(offer.offer.price, Some(3490));
    assert_eq!(offer.offer.restaurant, "Pizzan");
    assert_eq!(offer.meal_type, MealType::Combo);
    assert!(offer.is_combo);
    assert!(!offer.visual_summary.is_empty());
}

#[tokio::test]
async fn test_extract_offer_rejects_blank_name() {
    let mut vocabulary = memory_vocabulary();
    let result = commands::extract_offer(
        "   ",
        "Stór pizza",
        "Pizzan",
        &RegexFoodExtractor::new(),
        &mut vocabulary,
    )
    .await;
    assert!(result.is_err());
}

// ========== Listing Command Tests ==========

#[test]
fn test_cmd_restaurants_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("restaurants.toml");
    fs::write(&path, RESTAURANTS).unwrap();

    assert!(commands::cmd_restaurants(Some(&path)).is_ok());
}

#[test]
fn test_cmd_restaurants_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("restaurants.toml");
    fs::write(&path, "restaurant = 3").unwrap();

    assert!(commands::cmd_restaurants(Some(&path)).is_err());
}

#[test]
fn test_describe_strategy() {
    let restaurants = tilbod_core::sources::parse_restaurants(RESTAURANTS).unwrap();
    assert_eq!(
        commands::describe_strategy(&restaurants[0]),
        "structural, 1 selector sets"
    );
    assert_eq!(commands::describe_strategy(&restaurants[1]), "ai");
}

#[test]
fn test_cmd_vocab_with_missing_file_uses_seed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("food_categories.json");

    assert!(commands::cmd_vocab_list(Some(&path)).is_ok());
    assert!(commands::cmd_vocab_uncurated(Some(&path)).is_ok());
    assert!(commands::cmd_vocab_path(Some(&path)).is_ok());
    // Listing never writes
    assert!(!path.exists());
}

#[test]
fn test_cmd_prompts_embedded() {
    let mut library = PromptLibrary::embedded_only();
    assert!(commands::cmd_prompts_list(&mut library).is_ok());
    assert!(commands::cmd_prompts_show(&mut library, "extract_food_items").is_ok());
    assert!(commands::cmd_prompts_show(&mut library, "no_such_prompt").is_err());
    assert!(commands::cmd_prompts_path(&library).is_ok());
}

#[test]
fn test_cmd_prompts_with_broken_override() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("extract_offers.md"), "no header here").unwrap();
    let mut library = PromptLibrary::with_override_dir(dir.path().to_path_buf());

    // Listing reports the broken file; showing it fails
    assert!(commands::cmd_prompts_list(&mut library).is_ok());
    assert!(commands::cmd_prompts_show(&mut library, "extract_offers").is_err());
    assert!(commands::cmd_prompts_show(&mut library, "extract_food_items").is_ok());
    assert!(commands::cmd_prompts_path(&library).is_ok());
}

// ========== Helper Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly10!", 10), "exactly10!");
    assert_eq!(truncate("this is longer", 10), "this is...");
    assert_eq!(truncate("Fjölskyldutilboð", 8), "Fjöls...");
}

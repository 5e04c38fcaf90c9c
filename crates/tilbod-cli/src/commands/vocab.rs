//! Food vocabulary commands

use std::path::Path;

use anyhow::Result;
use tilbod_core::vocabulary::{default_vocabulary_path, VocabularyStore};

use super::core::{open_vocabulary, vocabulary_store};

/// List every food type with its category
pub fn cmd_vocab_list(path: Option<&Path>) -> Result<()> {
    let vocabulary = open_vocabulary(path)?;

    println!("Food vocabulary ({} types):\n", vocabulary.len());
    println!("{:<20} {:<10} {:<6} {}", "TYPE", "CATEGORY", "ICON", "DESCRIPTION");
    println!("{}", "-".repeat(80));

    for (kind, entry) in vocabulary.entries() {
        let icon = if entry.icon.is_empty() { "-" } else { "✓" };
        println!(
            "{:<20} {:<10} {:<6} {}",
            kind,
            entry.category.as_str(),
            icon,
            super::truncate(&entry.description, 40)
        );
    }

    Ok(())
}

/// Types proposed by a model that still need an icon
pub fn cmd_vocab_uncurated(path: Option<&Path>) -> Result<()> {
    let vocabulary = open_vocabulary(path)?;
    let pending: Vec<_> = vocabulary
        .entries()
        .iter()
        .filter(|(_, entry)| entry.icon.is_empty())
        .collect();

    if pending.is_empty() {
        println!("✅ Every food type has an icon");
        return Ok(());
    }

    println!("{} food types waiting for curation:\n", pending.len());
    for (kind, entry) in pending {
        println!("  - {} ({}): {}", kind, entry.category, entry.description);
    }
    println!();
    println!("Add an \"icon\" to these entries in {}", vocabulary_store(path).location());

    Ok(())
}

/// Show where the vocabulary is stored
pub fn cmd_vocab_path(path: Option<&Path>) -> Result<()> {
    match path.map(Path::to_path_buf).or_else(default_vocabulary_path) {
        Some(path) => {
            println!("{}", path.display());
            if !path.exists() {
                eprintln!();
                eprintln!("Note: This file does not exist yet.");
                eprintln!("It is created from the built-in seed on the first run that learns a type.");
            }
        }
        None => {
            eprintln!("Could not determine vocabulary location.");
            eprintln!("The data directory is not available on this system.");
        }
    }

    Ok(())
}

//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Tilbod - Collect and decompose restaurant offers
#[derive(Parser)]
#[command(name = "tilbod")]
#[command(about = "Scrapes Icelandic restaurant offers into structured data", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Restaurant list (defaults to the data dir override, then the built-in list)
    #[arg(long, global = true)]
    pub restaurants: Option<PathBuf>,

    /// Food vocabulary file (defaults to the data dir)
    #[arg(long, global = true)]
    pub vocabulary: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Food item extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExtractorKind {
    /// Lexicon-based, offline
    Regex,
    /// Completion-backed, falls back to regex per offer
    Llm,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape every configured restaurant
    Run {
        /// Only these restaurants (by name, case-insensitive)
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,

        /// Food item extraction strategy
        #[arg(long, value_enum, default_value_t = ExtractorKind::Regex)]
        extractor: ExtractorKind,

        /// Write the full snapshot (JSON, or core fields when the path ends in .csv)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write core fields as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Pause between restaurants
        #[arg(long, default_value = "2")]
        delay_secs: u64,

        /// Page fetch timeout
        #[arg(long, default_value = "30")]
        fetch_timeout_secs: u64,
    },

    /// Run one piece of offer text through extraction and print it as JSON
    Extract {
        /// Offer text (description)
        text: String,

        /// Offer name
        #[arg(long, default_value = "Tilboð")]
        name: String,

        /// Restaurant the text came from
        #[arg(long, default_value = "manual")]
        restaurant: String,

        /// Food item extraction strategy
        #[arg(long, value_enum, default_value_t = ExtractorKind::Regex)]
        extractor: ExtractorKind,
    },

    /// Controlled food vocabulary
    Vocab {
        #[command(subcommand)]
        action: Option<VocabAction>,
    },

    /// List configured restaurants and their strategy
    Restaurants,

    /// Manage prompt templates
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },
}

#[derive(Subcommand)]
pub enum VocabAction {
    /// List all food types
    List,
    /// Show types still waiting for an icon
    Uncurated,
    /// Show the vocabulary file location
    Path,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all prompts and their override status
    List,
    /// Show the content of a prompt
    Show {
        /// Prompt ID (extract_offers, extract_food_items)
        id: String,
    },
    /// Show the override directory path
    Path,
}

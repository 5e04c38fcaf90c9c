//! Tilbod CLI - Restaurant offer scraper
//!
//! Usage:
//!   tilbod run                      Scrape every configured restaurant
//!   tilbod run --only KFC --out offers.json
//!   tilbod extract "2 pizzur og gos"  Try extraction on a piece of text
//!   tilbod vocab                    List the food vocabulary
//!   tilbod restaurants              List configured restaurants

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tilbod_core::PromptLibrary;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Run {
            only,
            extractor,
            out,
            csv,
            delay_secs,
            fetch_timeout_secs,
        } => {
            let options = commands::RunOptions {
                only,
                extractor,
                out,
                csv,
                delay: Duration::from_secs(delay_secs),
                fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            };
            commands::cmd_run(
                cli.restaurants.as_deref(),
                cli.vocabulary.as_deref(),
                &options,
            )
            .await
        }
        Commands::Extract {
            text,
            name,
            restaurant,
            extractor,
        } => {
            commands::cmd_extract(cli.vocabulary.as_deref(), &text, &name, &restaurant, extractor)
                .await
        }
        Commands::Vocab { action } => match action {
            None | Some(VocabAction::List) => commands::cmd_vocab_list(cli.vocabulary.as_deref()),
            Some(VocabAction::Uncurated) => {
                commands::cmd_vocab_uncurated(cli.vocabulary.as_deref())
            }
            Some(VocabAction::Path) => commands::cmd_vocab_path(cli.vocabulary.as_deref()),
        },
        Commands::Restaurants => commands::cmd_restaurants(cli.restaurants.as_deref()),
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => {
                commands::cmd_prompts_list(&mut PromptLibrary::new())
            }
            Some(PromptsAction::Show { id }) => {
                commands::cmd_prompts_show(&mut PromptLibrary::new(), &id)
            }
            Some(PromptsAction::Path) => commands::cmd_prompts_path(&PromptLibrary::new()),
        },
    }
}

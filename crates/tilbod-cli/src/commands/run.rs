//! Scrape run command

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tilbod_core::export::write_offers_csv;
use tilbod_core::pipeline::Progress;
use tilbod_core::{
    load_restaurants, AIClient, AiSource, ExportFormat, HttpFetcher, MemorySink, Orchestrator,
    PipelineConfig, PromptLibrary, RestaurantConfig, RestaurantOutcome, RunReport, Snapshot,
    StrategyChain,
};
use tracing::info;

use super::core::{build_extractor, open_vocabulary};
use crate::cli::ExtractorKind;

pub struct RunOptions {
    pub only: Vec<String>,
    pub extractor: ExtractorKind,
    pub out: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    pub delay: Duration,
    pub fetch_timeout: Duration,
}

/// Prints one line per finished restaurant
struct PrintProgress {
    total: usize,
    done: usize,
}

impl Progress for PrintProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        println!("🍽️  Scraping {} restaurants...\n", total);
    }

    fn restaurant_done(&mut self, outcome: &RestaurantOutcome) {
        self.done += 1;
        match &outcome.error {
            None => println!(
                "   [{}/{}] ✅ {:<20} {} offers ({})",
                self.done,
                self.total,
                outcome.restaurant,
                outcome.offers_found,
                outcome.strategy.unwrap_or("none")
            ),
            Some(error) => println!(
                "   [{}/{}] ❌ {:<20} {}",
                self.done,
                self.total,
                outcome.restaurant,
                super::truncate(error, 60)
            ),
        }
    }
}

/// Keep only the restaurants named in `only` (case-insensitive)
pub fn select_restaurants(
    restaurants: Vec<RestaurantConfig>,
    only: &[String],
) -> Result<Vec<RestaurantConfig>> {
    if only.is_empty() {
        return Ok(restaurants);
    }
    let selected: Vec<RestaurantConfig> = restaurants
        .into_iter()
        .filter(|r| only.iter().any(|name| name.eq_ignore_ascii_case(&r.name)))
        .collect();
    if selected.is_empty() {
        bail!("No configured restaurant matches --only {}", only.join(","));
    }
    Ok(selected)
}

pub async fn cmd_run(
    restaurants_path: Option<&Path>,
    vocabulary_path: Option<&Path>,
    options: &RunOptions,
) -> Result<()> {
    let restaurants =
        load_restaurants(restaurants_path).context("Failed to load restaurant list")?;
    let restaurants = select_restaurants(restaurants, &options.only)?;
    let vocabulary = open_vocabulary(vocabulary_path)?;

    let client = AIClient::from_env();
    let mut prompts = PromptLibrary::new();
    let config = PipelineConfig {
        delay: options.delay,
        fetch_timeout: options.fetch_timeout,
        ..Default::default()
    };

    let ai_source = match &client {
        Some(client) => {
            println!("🤖 AI backend enabled ({})", client.kind());
            Some(
                AiSource::new(
                    client.clone(),
                    &mut prompts,
                    config.ai_text_budget,
                    config.ai_price_window,
                )
                .context("Failed to load offer extraction prompt")?,
            )
        }
        None => {
            println!("💡 Tip: Set OLLAMA_HOST to let a model read pages the selectors miss");
            None
        }
    };
    let extractor = build_extractor(options.extractor, client.as_ref(), &mut prompts)?;
    let fetcher = HttpFetcher::new(options.fetch_timeout).context("Failed to build HTTP client")?;

    let mut orchestrator = Orchestrator::new(
        Box::new(fetcher),
        StrategyChain::new(ai_source),
        extractor,
        vocabulary,
        config,
    );
    let mut sink = MemorySink::new();
    let mut progress = PrintProgress { total: 0, done: 0 };

    // Ctrl-C drops the run future; nothing has been written at that point
    let report = tokio::select! {
        report = orchestrator.run(&restaurants, &mut sink, &mut progress) => report,
        _ = tokio::signal::ctrl_c() => bail!("Interrupted"),
    };

    print_report(&report);

    if let Some(path) = &options.out {
        match ExportFormat::from_path(path) {
            ExportFormat::Json => Snapshot::new(report.offers.clone()).write_json(path),
            ExportFormat::Csv => write_offers_csv(path, sink.offers()),
        }
        .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
        println!("\n📄 Snapshot written to {}", path.display());
    }
    if let Some(path) = &options.csv {
        write_offers_csv(path, sink.offers())
            .with_context(|| format!("Failed to write CSV to {}", path.display()))?;
        println!("📄 CSV written to {}", path.display());
    }

    info!(vocabulary = orchestrator.vocabulary().len(), "Run complete");
    Ok(())
}

fn print_report(report: &RunReport) {
    println!();
    println!("📊 Run summary");
    println!("{}", "-".repeat(50));
    println!("   Restaurants processed: {}", report.processed());
    println!("   Succeeded:             {}", report.succeeded());

    let failed: Vec<_> = report.failed().collect();
    println!("   Failed:                {}", failed.len());
    for outcome in failed {
        println!(
            "     - {}: {}",
            outcome.restaurant,
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    println!("   Offers found:          {}", report.offers_found());
    println!("   Offers stored:         {}", report.offers_stored());
    println!("   Success rate:          {:.1}%", report.success_rate());
}

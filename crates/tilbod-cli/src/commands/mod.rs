//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (vocabulary loading, extractor selection)
//! - `extract` - Run one piece of offer text through extraction
//! - `prompts` - Prompt library management commands
//! - `restaurants` - List the configured restaurants
//! - `run` - Full scrape run with report and exports
//! - `vocab` - Food vocabulary commands

pub mod core;
pub mod extract;
pub mod prompts;
pub mod restaurants;
pub mod run;
pub mod vocab;

// Re-export command functions for main.rs
pub use extract::*;
pub use prompts::*;
pub use restaurants::*;
pub use run::*;
pub use vocab::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

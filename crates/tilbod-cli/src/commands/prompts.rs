//! Inspect the offer and food item prompts

use anyhow::{Context, Result};
use tilbod_core::{PromptId, PromptLibrary, PromptOrigin};

fn origin_label(origin: &PromptOrigin) -> String {
    match origin {
        PromptOrigin::Embedded => "embedded".to_string(),
        PromptOrigin::Override(path) => format!("override ({})", path.display()),
    }
}

/// One line per prompt; a broken override is shown instead of aborting
pub fn cmd_prompts_list(library: &mut PromptLibrary) -> Result<()> {
    println!("{:<20} {:>3}  {:<32} SOURCE", "PROMPT", "V", "INPUTS");
    println!("{}", "-".repeat(72));

    for (id, loaded) in library.load_all() {
        match loaded {
            Ok(prompt) => println!(
                "{:<20} {:>3}  {:<32} {}",
                id,
                prompt.header.version,
                id.inputs().join(", "),
                origin_label(&prompt.origin)
            ),
            Err(e) => println!("{:<20} ⚠️  override unusable: {}", id, e),
        }
    }
    Ok(())
}

pub fn cmd_prompts_show(library: &mut PromptLibrary, id: &str) -> Result<()> {
    let id: PromptId = id.parse().with_context(|| {
        let known: Vec<&str> = PromptId::ALL.iter().map(|id| id.as_str()).collect();
        format!("Known prompts: {}", known.join(", "))
    })?;
    let prompt = library.get(id)?;

    println!("# {} v{} ({})", id, prompt.header.version, prompt.header.task_type);
    println!("# source: {}", origin_label(&prompt.origin));

    let used = prompt.placeholders();
    let unused: Vec<&str> = id
        .inputs()
        .iter()
        .copied()
        .filter(|input| !used.contains(input))
        .collect();
    if !unused.is_empty() {
        println!("# not referenced: {}", unused.join(", "));
    }

    println!();
    println!("{}", prompt.body);
    Ok(())
}

/// Print the override directory and which prompts it currently replaces
pub fn cmd_prompts_path(library: &PromptLibrary) -> Result<()> {
    let Some(dir) = library.override_dir() else {
        println!("No data directory on this system; only embedded prompts are used.");
        return Ok(());
    };

    println!("{}", dir.display());
    let overridden: Vec<PromptId> = PromptId::ALL
        .into_iter()
        .filter(|&id| library.override_file(id).is_some())
        .collect();
    if overridden.is_empty() {
        println!("No overrides. Save <prompt>.md here to replace the embedded text.");
    } else {
        for id in overridden {
            println!("  {}.md", id);
        }
    }
    Ok(())
}

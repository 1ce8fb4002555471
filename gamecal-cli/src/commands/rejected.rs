use anyhow::Result;
use gamecal_core::config::GameCalConfig;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(config: &GameCalConfig) -> Result<()> {
    let ledger = config.ledger()?;
    let mut entries = ledger.entries()?;

    if entries.is_empty() {
        println!("{}", "No rejected games".dimmed());
        return Ok(());
    }

    entries.sort_by_key(|e| e.key());
    println!("{}", ledger.path().display().to_string().dimmed());
    for event in &entries {
        println!("   {} {}", event.league, event.render());
    }

    Ok(())
}

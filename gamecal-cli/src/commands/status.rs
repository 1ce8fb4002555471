use anyhow::{Context, Result};
use chrono::Utc;
use gamecal_core::config::GameCalConfig;
use gamecal_core::reconcile::Reconciler;
use gamecal_core::source::collect_upcoming;

use crate::channel::TerminalPrompt;
use crate::render::{PlanRender, Render};
use crate::sources::FeedSource;
use crate::utils::tui;

pub async fn run(config: &GameCalConfig, league: Option<&str>) -> Result<()> {
    let league = config.league(league)?;
    let remote = config.calendar(&league)?;
    let ledger = config.ledger()?;
    let rejected = ledger.keys()?;

    let spinner = tui::create_spinner(remote.render());
    let sources = FeedSource::for_league(config, &league)?;
    let now = Utc::now();
    let desired = match collect_upcoming(&sources, now).await {
        Ok(desired) => desired,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e).with_context(|| format!("Cannot plan {league}"));
        }
    };

    // Planning never prompts, so the channel is never used.
    let reconciler = Reconciler::new(remote, TerminalPrompt, ledger, league);
    let plan = reconciler.plan(&desired, now).await;
    spinner.finish_and_clear();

    println!("{}", remote.render());
    println!("{}", plan?.render_with(|event| rejected.contains(&event.key())));

    Ok(())
}

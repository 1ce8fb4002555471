use anyhow::{Context, Result};
use chrono::Utc;
use gamecal_core::config::GameCalConfig;
use gamecal_core::notify::notify_best_effort;
use gamecal_core::reconcile::Reconciler;
use gamecal_core::source::collect_upcoming;
use owo_colors::OwoColorize;

use crate::channel::Channel;
use crate::render::{Render, pluralize};
use crate::sources::FeedSource;
use crate::utils::tui;

pub async fn run(config: &GameCalConfig, league: Option<&str>, interactive: bool) -> Result<()> {
    let league = config.league(league)?;
    // Resolved up front: a league without a calendar never touches the network.
    let remote = config.calendar(&league)?;
    let channel = Channel::from_config(config, interactive)?;
    let ledger = config.ledger()?;

    let spinner = tui::create_spinner(format!("Fetching {league} schedule"));
    let sources = FeedSource::for_league(config, &league)?;
    let desired = collect_upcoming(&sources, Utc::now()).await;
    spinner.finish_and_clear();
    // Never reconcile against a partial schedule.
    let desired = desired.with_context(|| format!("Not syncing {league}"))?;

    let mut reconciler = Reconciler::new(remote, &channel, ledger, league.clone())
        .with_time_zone(config.time_zone.clone());
    if let Some(deadline) = config.run_deadline()?
        && channel.honors_deadline()
    {
        reconciler = reconciler.with_deadline(tokio::time::Instant::now() + deadline);
    }

    println!("{}", remote.render());
    let report = reconciler
        .reconcile(&desired)
        .await
        .with_context(|| format!("Reconciliation of {league} stopped"))?;

    println!("{}", report.render());

    if report.undecodable > 0 {
        println!(
            "   {}",
            format!(
                "{} unrecognized calendar {} left alone",
                report.undecodable,
                pluralize("record", report.undecodable)
            )
            .dimmed()
        );
    }

    let result = report.result();
    let failures = report.failures().count();
    println!(
        "\n{league}: {} added, {} removed{}",
        result.added,
        result.removed,
        if failures > 0 {
            format!(", {failures} failed").red().to_string()
        } else {
            String::new()
        }
    );

    if let Some(summary) = report.summary() {
        notify_best_effort(&channel, &summary).await;
    }

    Ok(())
}

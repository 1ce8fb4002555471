mod channel;
mod commands;
mod render;
mod sources;
mod telegram;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gamecal_core::config::GameCalConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gamecal")]
#[command(about = "Keep a calendar in step with league schedules, asking before every change")]
struct Cli {
    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a league's schedule into its calendar
    Sync {
        /// League to reconcile (defaults to `league` in the config)
        #[arg(short, long)]
        league: Option<String>,

        /// Ask in this terminal instead of through Telegram
        #[arg(short, long)]
        interactive: bool,
    },
    /// Show what a sync would propose, without asking or writing
    Status {
        #[arg(short, long)]
        league: Option<String>,
    },
    /// List games that were declined and will not be proposed again
    Rejected,
    /// Connect a calendar provider account
    Auth {
        provider: String, // e.g. "google"
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = GameCalConfig::load()?;

    match cli.command {
        Commands::Sync {
            league,
            interactive,
        } => commands::sync::run(&config, league.as_deref(), interactive).await,
        Commands::Status { league } => commands::status::run(&config, league.as_deref()).await,
        Commands::Rejected => commands::rejected::run(&config),
        Commands::Auth { provider } => commands::auth::run(&provider).await,
    }
}

/// Logs go to stderr; stdout is reserved for reports.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

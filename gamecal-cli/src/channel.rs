//! Where prompts and summaries go: Telegram, or this terminal.

use anyhow::{Result, bail};
use dialoguer::Confirm;
use gamecal_core::config::GameCalConfig;
use gamecal_core::confirm::{Answer, Confirmation};
use gamecal_core::error::{GameCalError, GameCalResult};
use gamecal_core::notify::Notifier;
use owo_colors::OwoColorize;

use crate::telegram::TelegramBot;

/// Asks on stdin/stdout. Waits as long as it takes.
pub struct TerminalPrompt;

impl Confirmation for TerminalPrompt {
    async fn confirm(&self, prompt: &str) -> GameCalResult<Answer> {
        let prompt = prompt.to_string();
        let answered = tokio::task::spawn_blocking(move || {
            Confirm::new().with_prompt(prompt).default(false).interact_opt()
        })
        .await
        .map_err(|e| GameCalError::Confirmation(e.to_string()))?
        .map_err(|e| GameCalError::Confirmation(e.to_string()))?;

        Ok(match answered {
            Some(true) => Answer::Yes,
            Some(false) => Answer::No,
            // Esc / q leaves the question open.
            None => Answer::Timeout,
        })
    }
}

impl Notifier for TerminalPrompt {
    async fn notify(&self, summary: &str) -> GameCalResult<()> {
        println!("\n{}", summary.bold());
        Ok(())
    }
}

pub enum Channel {
    Terminal(TerminalPrompt),
    Telegram(TelegramBot),
}

impl Channel {
    pub fn from_config(config: &GameCalConfig, interactive: bool) -> Result<Self> {
        if interactive {
            return Ok(Channel::Terminal(TerminalPrompt));
        }

        let Some(telegram) = &config.telegram else {
            bail!(
                "No [telegram] section in the config.\n\n\
                Add a bot token and chat id, or answer in this terminal with:\n  \
                gamecal sync --interactive"
            );
        };

        Ok(Channel::Telegram(TelegramBot::new(
            telegram,
            config.confirm_timeout()?,
        )))
    }

    /// A run deadline only makes sense when prompts can time out on their own.
    pub fn honors_deadline(&self) -> bool {
        matches!(self, Channel::Telegram(_))
    }
}

impl Confirmation for Channel {
    async fn confirm(&self, prompt: &str) -> GameCalResult<Answer> {
        match self {
            Channel::Terminal(terminal) => terminal.confirm(prompt).await,
            Channel::Telegram(bot) => bot.confirm(prompt).await,
        }
    }
}

impl Notifier for Channel {
    async fn notify(&self, summary: &str) -> GameCalResult<()> {
        match self {
            Channel::Terminal(terminal) => terminal.notify(summary).await,
            Channel::Telegram(bot) => bot.notify(summary).await,
        }
    }
}

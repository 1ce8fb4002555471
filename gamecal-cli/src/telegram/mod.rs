//! Telegram bot used as the confirmation channel and the notifier.
//!
//! Each prompt is a message with Yes/No buttons. The bot long-polls
//! `getUpdates` until someone presses a button on that message or the
//! answer timeout runs out.

mod api;

use std::sync::Mutex;
use std::time::Duration;

use gamecal_core::config::TelegramConfig;
use gamecal_core::confirm::{Answer, Confirmation};
use gamecal_core::error::{GameCalError, GameCalResult};
use gamecal_core::notify::Notifier;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::Instant;

use api::{
    AnswerCallbackQuery, ApiResponse, EditMessageText, GetUpdates, InlineKeyboardMarkup, Message,
    SendMessage, Update,
};

const API_BASE: &str = "https://api.telegram.org";
/// Upper bound for a single long poll.
const MAX_POLL_SECS: u64 = 50;
/// Slack on top of the long-poll time before the HTTP request itself gives up.
const HTTP_SLACK: Duration = Duration::from_secs(10);

pub struct TelegramBot {
    client: reqwest::Client,
    base_url: String,
    chat_id: String,
    answer_timeout: Duration,
    /// Next `getUpdates` offset; updates below it are acknowledged.
    offset: Mutex<i64>,
}

impl TelegramBot {
    pub fn new(config: &TelegramConfig, answer_timeout: Duration) -> Self {
        TelegramBot {
            client: reqwest::Client::new(),
            base_url: format!("{API_BASE}/bot{}", config.token),
            chat_id: config.chat_id.clone(),
            answer_timeout,
            offset: Mutex::new(0),
        }
    }

    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: &P,
        timeout: Duration,
    ) -> GameCalResult<R> {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| GameCalError::Confirmation(format!("{method}: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GameCalError::Confirmation(format!("{method}: HTTP {status}")));
        }

        response
            .json::<ApiResponse<R>>()
            .await
            .map_err(|e| GameCalError::Confirmation(format!("{method}: {}", e.without_url())))?
            .into_result()
            .map_err(|e| GameCalError::Confirmation(format!("{method}: {e}")))
    }

    async fn send(&self, text: &str, buttons: bool) -> GameCalResult<Message> {
        let params = SendMessage {
            chat_id: &self.chat_id,
            text,
            reply_markup: buttons.then(InlineKeyboardMarkup::yes_no),
        };
        self.call("sendMessage", &params, HTTP_SLACK).await
    }

    async fn poll(&self, wait: Duration) -> GameCalResult<Vec<Update>> {
        let offset = self.current_offset();
        let params = GetUpdates {
            offset,
            timeout: poll_secs(wait),
            allowed_updates: vec!["callback_query"],
        };
        let updates: Vec<Update> = self
            .call("getUpdates", &params, Duration::from_secs(params.timeout) + HTTP_SLACK)
            .await?;

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.advance_offset(last + 1);
        }
        Ok(updates)
    }

    fn current_offset(&self) -> i64 {
        self.offset.lock().map(|o| *o).unwrap_or(0)
    }

    fn advance_offset(&self, next: i64) {
        if let Ok(mut offset) = self.offset.lock() {
            *offset = (*offset).max(next);
        }
    }

    /// Rewrite the prompt so the chat shows what happened. Cosmetic; failures
    /// are only logged.
    async fn settle(&self, message_id: i64, prompt: &str, answer: Answer) {
        let text = format!("{prompt}\n\n{}", settled_label(answer));
        let params = EditMessageText {
            chat_id: &self.chat_id,
            message_id,
            text: &text,
        };
        if let Err(e) = self
            .call::<_, serde_json::Value>("editMessageText", &params, HTTP_SLACK)
            .await
        {
            tracing::debug!("Could not edit prompt: {e}");
        }
    }

    async fn acknowledge(&self, callback_query_id: &str) {
        let params = AnswerCallbackQuery { callback_query_id };
        if let Err(e) = self
            .call::<_, bool>("answerCallbackQuery", &params, HTTP_SLACK)
            .await
        {
            tracing::debug!("Could not acknowledge button press: {e}");
        }
    }
}

impl Confirmation for TelegramBot {
    async fn confirm(&self, prompt: &str) -> GameCalResult<Answer> {
        let message = self.send(prompt, true).await?;
        let deadline = Instant::now() + self.answer_timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.settle(message.message_id, prompt, Answer::Timeout).await;
                return Ok(Answer::Timeout);
            }

            for update in self.poll(remaining).await? {
                if let Some((answer, callback_id)) = answer_from(&update, &self.chat_id, message.message_id) {
                    self.acknowledge(&callback_id).await;
                    self.settle(message.message_id, prompt, answer).await;
                    return Ok(answer);
                }
            }
        }
    }
}

impl Notifier for TelegramBot {
    async fn notify(&self, summary: &str) -> GameCalResult<()> {
        self.send(summary, false)
            .await
            .map(|_| ())
            .map_err(|e| GameCalError::Notify(e.to_string()))
    }
}

/// Long-poll seconds for `wait`. Rounded up so a sub-second remainder still
/// blocks instead of returning at once.
fn poll_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.clamp(1, MAX_POLL_SECS)
}

/// The answer carried by a button press on `message_id` in the configured
/// chat, if this update is one.
fn answer_from(update: &Update, chat_id: &str, message_id: i64) -> Option<(Answer, String)> {
    let query = update.callback_query.as_ref()?;
    let message = query.message.as_ref()?;
    if message.message_id != message_id || !message.chat.is(chat_id) {
        return None;
    }

    let answer = match query.data.as_deref()? {
        api::YES => Answer::Yes,
        api::NO => Answer::No,
        _ => return None,
    };
    Some((answer, query.id.clone()))
}

fn settled_label(answer: Answer) -> &'static str {
    match answer {
        Answer::Yes => "✅ Yes",
        Answer::No => "❌ No",
        Answer::Timeout => "⌛ No answer, will ask again next run",
    }
}

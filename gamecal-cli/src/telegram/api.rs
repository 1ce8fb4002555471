//! Telegram Bot API payloads, limited to what the bot uses.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

pub const YES: &str = "yes";
pub const NO: &str = "no";

/// Every Bot API reply is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

impl<T: DeserializeOwned> ApiResponse<T> {
    pub fn into_result(self) -> Result<T, String> {
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(self
                .description
                .unwrap_or_else(|| "request was not ok".to_string())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    pub fn yes_no() -> Self {
        InlineKeyboardMarkup {
            inline_keyboard: vec![vec![
                InlineKeyboardButton {
                    text: "Yes".into(),
                    callback_data: YES.into(),
                },
                InlineKeyboardButton {
                    text: "No".into(),
                    callback_data: NO.into(),
                },
            ]],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Serialize)]
pub struct GetUpdates {
    pub offset: i64,
    /// Long-poll seconds.
    pub timeout: u64,
    pub allowed_updates: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct AnswerCallbackQuery<'a> {
    pub callback_query_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct EditMessageText<'a> {
    pub chat_id: &'a str,
    pub message_id: i64,
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

impl Chat {
    /// Whether `chat_id`, a numeric id or an `@channel` name, names this chat.
    pub fn is(&self, chat_id: &str) -> bool {
        match chat_id.strip_prefix('@') {
            Some(name) => self.username.as_deref() == Some(name),
            None => chat_id.parse::<i64>().is_ok_and(|id| id == self.id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub data: Option<String>,
    pub message: Option<Message>,
}

//! Telegram Bot API transport (long polling).

use async_trait::async_trait;
use once_cell::sync::Lazy;
use promohunter_core::chat::{ChatTransport, IncomingMessage};
use promohunter_core::TransportError;
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// How long `getUpdates` may hold the connection open (seconds)
pub const LONG_POLL_SECS: u64 = 30;

const PARSE_MODE: &str = "HTML";

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static STRIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~(.+?)~~").unwrap());
static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").unwrap());

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

pub struct TelegramTransport {
    client: Client,
    /// `{api_base}/bot{token}`
    bot_url: String,
    offset: i64,
    pending: VecDeque<IncomingMessage>,
}

impl TelegramTransport {
    pub fn new(token: &str) -> Result<Self, TransportError> {
        Self::with_api_base(token, DEFAULT_API_BASE)
    }

    pub fn with_api_base(token: &str, api_base: &str) -> Result<Self, TransportError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TransportError::Api("empty bot token".to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(LONG_POLL_SECS + 10))
            .build()?;
        Ok(Self {
            client,
            bot_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
            offset: 0,
            pending: VecDeque::new(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.bot_url, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, TransportError> {
        // The token is part of the URL; keep it out of error messages.
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let reply: ApiResponse<T> = response.json().await.map_err(reqwest::Error::without_url)?;
        unwrap_reply(method, reply)
    }

    /// The bot's own account; doubles as a token check.
    pub async fn get_me(&self) -> Result<User, TransportError> {
        self.call("getMe", &json!({})).await
    }

    async fn poll(&mut self) -> Result<(), TransportError> {
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                &json!({
                    "offset": self.offset,
                    "timeout": LONG_POLL_SECS,
                    "allowed_updates": ["message"],
                }),
            )
            .await?;

        let (next_offset, messages) = collect_messages(updates, self.offset);
        if !messages.is_empty() {
            debug!(count = messages.len(), next_offset, "received updates");
        }
        self.offset = next_offset;
        self.pending.extend(messages);
        Ok(())
    }

    async fn send_message(&self, chat_id: i64, text: &str, parse_mode: Option<&str>) -> Result<(), TransportError> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(mode) = parse_mode {
            body["parse_mode"] = json!(mode);
        }
        self.call::<Value>("sendMessage", &body).await.map(|_| ())
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn next_message(&mut self) -> Result<Option<IncomingMessage>, TransportError> {
        loop {
            if let Some(message) = self.pending.pop_front() {
                return Ok(Some(message));
            }
            self.poll().await?;
        }
    }

    /// Formatted first; text Telegram refuses to parse is resent plain.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError> {
        match self.send_message(chat_id, &to_html(text), Some(PARSE_MODE)).await {
            Err(TransportError::Api(reason)) => {
                warn!(chat_id, %reason, "formatted text rejected, sending plain text");
                self.send_message(chat_id, text, None).await
            }
            other => other,
        }
    }

    async fn send_photo(&self, chat_id: i64, url: &str, caption: &str) -> Result<(), TransportError> {
        let body = json!({
            "chat_id": chat_id,
            "photo": url,
            "caption": to_html(caption),
            "parse_mode": PARSE_MODE,
        });
        self.call::<Value>("sendPhoto", &body).await.map(|_| ())
    }
}

fn unwrap_reply<T>(method: &str, reply: ApiResponse<T>) -> Result<T, TransportError> {
    match reply {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse { description, .. } => Err(TransportError::Api(format!(
            "{} failed: {}",
            method,
            description.unwrap_or_else(|| "no description".to_string())
        ))),
    }
}

/// Convert reply Markdown (`**bold**`, `~~strike~~`, `` `code` ``,
/// `[text](url)`) to the HTML subset the Bot API accepts. Everything
/// else is escaped.
pub fn to_html(markdown: &str) -> String {
    let escaped = markdown
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;");
    let html = BOLD.replace_all(&escaped, "<b>$1</b>");
    let html = STRIKE.replace_all(&html, "<s>$1</s>");
    let html = CODE.replace_all(&html, "<code>$1</code>");
    LINK.replace_all(&html, r#"<a href="$2">$1</a>"#).into_owned()
}

/// Text messages from a batch of updates, plus the offset acknowledging them.
pub fn collect_messages(updates: Vec<Update>, offset: i64) -> (i64, Vec<IncomingMessage>) {
    let mut next_offset = offset;
    let mut messages = Vec::new();

    for update in updates {
        next_offset = next_offset.max(update.update_id + 1);
        let Some(message) = update.message else {
            continue;
        };
        let Some(text) = message.text.filter(|t| !t.trim().is_empty()) else {
            continue;
        };
        messages.push(IncomingMessage {
            chat_id: message.chat.id,
            user: message
                .from
                .map(|u| u.username.unwrap_or(u.first_name)),
            text,
        });
    }

    (next_offset, messages)
}

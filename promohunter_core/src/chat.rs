//! Chat command parsing and dispatch.
//!
//! Transports (console, Telegram) only move text around. Turning a
//! message into a search and a search into replies happens here.

use crate::config::AppConfig;
use crate::error::{SourceError, TransportError};
use crate::presenter::{render_reply, OutgoingMessage};
use crate::product::Product;
use crate::ranking::{self, RankingPolicy};
use crate::search::{Aggregator, SearchResult};
use crate::stores::build_sources;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pause after a failed poll before asking the transport again.
pub const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(2);

pub const WELCOME_TEXT: &str = "🤖 Hi! Welcome to PromoHunter!\n\n\
I find the best deals across Brazilian online stores, weighing price, \
ratings and discounts.\n\n\
Type /help to see the available commands, or just send me the name of \
the product you are looking for!";

pub const HELP_TEXT: &str = "🔍 **Available commands:**\n\n\
/start - Start the bot\n\
/help - Show this help message\n\
/search <term> - Search with the default ranking\n\
/cheapest <term> - Lowest prices first\n\
/value <term> - Best value for money (price, rating and discount)\n\
/rated <term> - Best rated products first\n\n\
**How to use:**\n\
Just send a message describing the product you want and I will find \
the best options for you!";

/// A parsed chat message.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    Start,
    Help,
    /// `policy` is `None` when the default policy applies
    Search {
        query: String,
        policy: Option<RankingPolicy>,
    },
    /// A search command sent without a term
    MissingQuery { command: String },
    Unknown { command: String },
}

impl ChatCommand {
    /// Parse a message. Blank messages yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let Some(rest) = text.strip_prefix('/') else {
            return Some(ChatCommand::Search {
                query: text.to_string(),
                policy: None,
            });
        };

        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => (head, args.trim()),
            None => (rest, ""),
        };
        // `/search@SomeBot` in group chats
        let command = head.split('@').next().unwrap_or(head).to_ascii_lowercase();

        let policy = match command.as_str() {
            "start" => return Some(ChatCommand::Start),
            "help" => return Some(ChatCommand::Help),
            "search" => None,
            "cheapest" => Some(RankingPolicy::LowestPrice),
            "value" => Some(RankingPolicy::BestValue),
            "rated" => Some(RankingPolicy::BestRating),
            _ => return Some(ChatCommand::Unknown { command }),
        };

        if args.is_empty() {
            return Some(ChatCommand::MissingQuery { command });
        }
        Some(ChatCommand::Search {
            query: args.to_string(),
            policy,
        })
    }
}

/// An inbound chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub user: Option<String>,
    pub text: String,
}

/// Moves messages between users and the bot.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    fn name(&self) -> &'static str;

    /// Wait for the next message. `Ok(None)` ends the chat loop.
    async fn next_message(&mut self) -> Result<Option<IncomingMessage>, TransportError>;

    async fn send_text(&self, chat_id: i64, text: &str) -> Result<(), TransportError>;

    async fn send_photo(&self, chat_id: i64, url: &str, caption: &str) -> Result<(), TransportError>;
}

/// Search, rank and render on behalf of a chat.
pub struct ChatService {
    aggregator: Aggregator,
    default_policy: RankingPolicy,
}

impl ChatService {
    pub fn new(aggregator: Aggregator, default_policy: RankingPolicy) -> Self {
        Self {
            aggregator,
            default_policy,
        }
    }

    /// Wire up the configured stores.
    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        let aggregator = Aggregator::new(build_sources(config)?).with_timeout(config.source_timeout());
        Ok(Self::new(aggregator, config.default_policy))
    }

    pub fn default_policy(&self) -> RankingPolicy {
        self.default_policy
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Search and select, without rendering.
    pub async fn search(
        &self,
        query: &str,
        policy: Option<RankingPolicy>,
    ) -> (SearchResult, Vec<Product>) {
        let policy = policy.unwrap_or(self.default_policy);
        let result = self.aggregator.search(query).await;
        let selected = ranking::select(&result.all_products, policy);
        debug!(policy = %policy, selected = selected.len(), "ranked");
        (result, selected)
    }

    /// Replies for one incoming text, in send order. Blank input gets none.
    pub async fn handle(&self, text: &str) -> Vec<OutgoingMessage> {
        let Some(command) = ChatCommand::parse(text) else {
            return Vec::new();
        };

        match command {
            ChatCommand::Start => vec![OutgoingMessage::text(WELCOME_TEXT)],
            ChatCommand::Help => vec![OutgoingMessage::text(HELP_TEXT)],
            ChatCommand::MissingQuery { command } => vec![OutgoingMessage::text(format!(
                "Tell me what to look for, e.g. `/{} mouse gamer`",
                command
            ))],
            ChatCommand::Unknown { command } => vec![OutgoingMessage::text(format!(
                "Unknown command /{}. Type /help to see what I can do.",
                command
            ))],
            ChatCommand::Search { query, policy } => {
                let (result, selected) = self.search(&query, policy).await;
                render_reply(&result, &selected)
            }
        }
    }
}

/// Send replies in order. A failed photo is retried once as text.
pub async fn deliver<T>(transport: &T, chat_id: i64, messages: &[OutgoingMessage])
where
    T: ChatTransport + ?Sized,
{
    for message in messages {
        let outcome = match message {
            OutgoingMessage::Text { text } => transport.send_text(chat_id, text).await,
            OutgoingMessage::Photo { url, caption } => {
                match transport.send_photo(chat_id, url, caption).await {
                    Ok(()) => Ok(()),
                    Err(e) => {
                        warn!(chat_id, error = %e, "photo send failed, sending text instead");
                        transport.send_text(chat_id, caption).await
                    }
                }
            }
        };

        if let Err(e) = outcome {
            warn!(chat_id, transport = transport.name(), error = %e, "failed to send reply");
        }
    }
}

/// Serve messages until the transport runs dry.
///
/// Neither a failed poll nor a failed send stops the loop.
pub async fn run_chat_loop<T>(transport: &mut T, service: &ChatService) -> Result<(), TransportError>
where
    T: ChatTransport + ?Sized,
{
    info!(transport = transport.name(), "chat loop started");

    loop {
        let message = match transport.next_message().await {
            Ok(Some(message)) => message,
            Ok(None) => break,
            Err(e) => {
                warn!(transport = transport.name(), error = %e, "failed to receive messages");
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                continue;
            }
        };

        info!(
            chat_id = message.chat_id,
            user = message.user.as_deref().unwrap_or("-"),
            "message received"
        );
        debug!(text = %message.text, "message text");

        let replies = service.handle(&message.text).await;
        deliver(&*transport, message.chat_id, &replies).await;
    }

    info!(transport = transport.name(), "chat loop finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(query: &str, policy: Option<RankingPolicy>) -> Option<ChatCommand> {
        Some(ChatCommand::Search {
            query: query.to_string(),
            policy,
        })
    }

    #[test]
    fn test_parse_plain_text_is_search() {
        assert_eq!(ChatCommand::parse("  mouse gamer "), search("mouse gamer", None));
        assert_eq!(ChatCommand::parse("   "), None);
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ChatCommand::parse("/start"), Some(ChatCommand::Start));
        assert_eq!(ChatCommand::parse("/HELP"), Some(ChatCommand::Help));
        assert_eq!(ChatCommand::parse("/search ssd 1tb"), search("ssd 1tb", None));
        assert_eq!(
            ChatCommand::parse("/cheapest  monitor"),
            search("monitor", Some(RankingPolicy::LowestPrice))
        );
        assert_eq!(
            ChatCommand::parse("/value teclado"),
            search("teclado", Some(RankingPolicy::BestValue))
        );
        assert_eq!(
            ChatCommand::parse("/rated\tfone"),
            search("fone", Some(RankingPolicy::BestRating))
        );
    }

    #[test]
    fn test_parse_bot_suffix() {
        assert_eq!(
            ChatCommand::parse("/search@PromoHunterBot cadeira"),
            search("cadeira", None)
        );
        assert_eq!(ChatCommand::parse("/start@PromoHunterBot"), Some(ChatCommand::Start));
    }

    #[test]
    fn test_parse_missing_query_and_unknown() {
        assert_eq!(
            ChatCommand::parse("/value"),
            Some(ChatCommand::MissingQuery {
                command: "value".to_string()
            })
        );
        assert_eq!(
            ChatCommand::parse("/buy now"),
            Some(ChatCommand::Unknown {
                command: "buy".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_handle_static_replies() {
        let service = ChatService::new(Aggregator::new(Vec::new()), RankingPolicy::default());

        let replies = service.handle("/start").await;
        assert_eq!(replies, vec![OutgoingMessage::text(WELCOME_TEXT)]);

        let replies = service.handle("/help").await;
        assert!(replies[0].body().contains("/cheapest"));

        let replies = service.handle("/rated").await;
        assert!(replies[0].body().contains("/rated mouse gamer"));

        assert!(service.handle("").await.is_empty());
    }

    #[tokio::test]
    async fn test_handle_search_without_sources_reports_no_results() {
        let service = ChatService::new(Aggregator::new(Vec::new()), RankingPolicy::default());
        let replies = service.handle("mouse").await;
        assert_eq!(replies.len(), 1);
        assert!(replies[0].body().contains("No products found"));
    }
}

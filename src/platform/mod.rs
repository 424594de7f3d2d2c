pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;

/// How the reply text should be rendered by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyFormat {
    Plain,
    Html,
}

/// Outbound text addressed to the conversation an update came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub format: ReplyFormat,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: ReplyFormat::Plain,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: ReplyFormat::Html,
        }
    }
}

/// Who the bot is, as reported by the platform on initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: u64,
    pub username: String,
}

/// Outbound side of a messaging platform.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Fetch the bot's own identity. Called once before the first update.
    async fn initialize(&self) -> Result<BotIdentity>;

    /// Deliver a reply to the given chat
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<()>;
}

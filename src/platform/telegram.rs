use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, info};

use super::{BotIdentity, Platform, Reply, ReplyFormat};

/// Telegram Bot API client backed by teloxide
pub struct TelegramPlatform {
    bot: Bot,
}

impl TelegramPlatform {
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }
}

#[async_trait]
impl Platform for TelegramPlatform {
    async fn initialize(&self) -> Result<BotIdentity> {
        let me = self
            .bot
            .get_me()
            .await
            .context("Failed to fetch bot identity from Telegram")?;

        let identity = BotIdentity {
            id: me.id.0,
            username: me.username().to_string(),
        };
        info!(
            "Telegram bot initialized as @{} ({})",
            identity.username, identity.id
        );
        Ok(identity)
    }

    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<()> {
        debug!("Sending reply to chat {}", chat_id);

        let request = self.bot.send_message(ChatId(chat_id), reply.text.clone());
        let request = match reply.format {
            ReplyFormat::Html => request.parse_mode(ParseMode::Html),
            ReplyFormat::Plain => request,
        };

        request
            .await
            .with_context(|| format!("Failed to send reply to chat {}", chat_id))?;
        Ok(())
    }
}

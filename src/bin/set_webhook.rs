//! Webhook registrar.
//!
//! One-shot utility that tells Telegram where to POST updates:
//!
//! ```text
//! set_webhook <BOT_TOKEN> <BASE_URL>
//! ```
//!
//! The webhook URL is the base URL with trailing slashes removed, followed by
//! `/<BOT_TOKEN>`, which is the path the `hookbot` server listens on.
//! Registering the same URL twice is harmless.

use std::process::ExitCode;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use url::Url;

const USAGE: &str = "Usage: set_webhook <BOT_TOKEN> <BASE_URL>";

#[derive(Debug, PartialEq, Eq)]
struct Invocation {
    token: String,
    base_url: String,
}

/// Positional arguments only, program name excluded.
fn parse_args(args: &[String]) -> Option<Invocation> {
    match args {
        [token, base_url] => Some(Invocation {
            token: token.clone(),
            base_url: base_url.clone(),
        }),
        _ => None,
    }
}

fn webhook_url(base_url: &str, token: &str) -> Result<Url> {
    let raw = format!("{}/{}", base_url.trim_end_matches('/'), token);
    Url::parse(&raw).with_context(|| format!("Invalid webhook URL: {raw}"))
}

// ── Telegram API seam ──────────────────────────────────────────────────────────

#[async_trait]
trait WebhookApi: Send + Sync {
    async fn set_webhook(&self, url: Url) -> Result<()>;
}

struct TelegramWebhookApi {
    bot: Bot,
}

#[async_trait]
impl WebhookApi for TelegramWebhookApi {
    async fn set_webhook(&self, url: Url) -> Result<()> {
        self.bot
            .set_webhook(url)
            .await
            .context("Telegram rejected setWebhook")?;
        Ok(())
    }
}

/// Build the webhook URL and register it with a single API call.
async fn register(api: &dyn WebhookApi, invocation: &Invocation) -> Result<Url> {
    let url = webhook_url(&invocation.base_url, &invocation.token)?;
    println!("Setting webhook to: {url}");
    api.set_webhook(url.clone()).await?;
    Ok(url)
}

// ── Entry point ────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let Some(invocation) = parse_args(&args) else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };

    let api = TelegramWebhookApi {
        bot: Bot::new(&invocation.token),
    };

    match register(&api, &invocation).await {
        Ok(_) => {
            println!("Webhook set successfully!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error setting webhook: {e:#}");
            ExitCode::FAILURE
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

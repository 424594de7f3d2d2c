use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use tokio::sync::OnceCell;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info_span, warn};

use crate::bot;
use crate::platform::{BotIdentity, Platform};
use crate::update::Update;

/// Shared state of the webhook receiver
pub struct AppState {
    /// Path segment an update must be posted to
    webhook_secret: String,
    platform: Arc<dyn Platform>,
    /// Filled once, by whichever update arrives first
    identity: OnceCell<BotIdentity>,
}

impl AppState {
    pub fn new(webhook_secret: impl Into<String>, platform: Arc<dyn Platform>) -> Self {
        Self {
            webhook_secret: webhook_secret.into(),
            platform,
            identity: OnceCell::new(),
        }
    }

    /// Bot identity, initializing the platform client on first use.
    /// A failed initialization leaves the cell empty so the next update retries.
    async fn identity(&self) -> Result<&BotIdentity> {
        self.identity
            .get_or_try_init(|| self.platform.initialize())
            .await
    }

    /// Route one update and deliver its reply, if any.
    pub async fn handle_update(&self, update: &Update) -> Result<()> {
        let identity = self.identity().await?;
        let message_id = update.effective_message().and_then(|m| m.message_id);

        let Some(reply) = bot::route(update, Some(identity.username.as_str())) else {
            debug!(
                "No handler for update {:?} (message {:?})",
                update.update_id, message_id
            );
            return Ok(());
        };

        let chat_id = match update.effective_message().and_then(|m| m.chat.as_ref()) {
            Some(chat) => chat.id,
            None => {
                warn!(
                    "Update {:?} (message {:?}) has no chat to reply to, dropping reply",
                    update.update_id, message_id
                );
                return Ok(());
            }
        };

        self.platform.send_reply(chat_id, &reply).await
    }
}

/// Build the HTTP surface: health checks plus the secret webhook path.
pub fn router(state: Arc<AppState>) -> Router {
    // The URI carries the bot token, so spans record the method only.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request| info_span!("http", method = %request.method()));

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/{secret}", post(webhook))
        .layer(trace_layer)
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

/// `application/json` or any `application/*+json` media type, parameters ignored.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };

    let mime = value.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    Path(secret): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    if secret != state.webhook_secret {
        return (StatusCode::NOT_FOUND, "not found");
    }

    if !has_json_content_type(&headers) {
        warn!("Rejected webhook payload without a JSON content type");
        return (StatusCode::BAD_REQUEST, "bad request");
    }

    let update = match Update::from_json_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!("Rejected webhook payload: {:#}", e);
            return (StatusCode::BAD_REQUEST, "bad request");
        }
    };

    // Always acknowledge, otherwise Telegram keeps redelivering the update.
    if let Err(e) = state.handle_update(&update).await {
        error!("Error handling update {:?}: {:#}", update.update_id, e);
    }

    (StatusCode::OK, "ok")
}

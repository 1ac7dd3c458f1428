//! Telegram bot client on teloxide, driven by a manual long-polling loop.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use teloxide::prelude::*;
use teloxide::types::{AllowedUpdate, MediaKind, MessageKind, UpdateKind};
use teloxide::{ApiError, RequestError};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::bridge::platform::DestPlatform;
use crate::common::error::{PlatformError, PlatformResult};
use crate::common::{Attachment, DestUpdate, DestinationId, Identity, InboundMessage, Origin};

/// Long-poll timeout passed to `getUpdates`.
const POLL_TIMEOUT_SECS: u32 = 30;

/// Must outlast the long poll, or the client aborts requests Telegram is
/// still holding open.
const HTTP_TIMEOUT: Duration = Duration::from_secs(45);

const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Telegram side of the bridge.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(token: impl Into<String>) -> PlatformResult<Self> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| PlatformError::Setup(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            bot: Bot::with_client(token, client),
        })
    }
}

/// Convert a Telegram message. `None` when there is no sender.
///
/// Only text and photos carry content. Anything else converts with empty
/// text, which the router drops.
pub fn convert_message(msg: &Message) -> Option<InboundMessage> {
    let from = msg.from.as_ref()?;

    let (text, attachments) = match &msg.kind {
        MessageKind::Common(common) => match &common.media_kind {
            MediaKind::Text(t) => (t.text.clone(), Vec::new()),
            MediaKind::Photo(p) => (
                p.caption.clone().unwrap_or_default(),
                p.photo
                    .iter()
                    .map(|size| Attachment {
                        file_id: size.file.id.to_string(),
                    })
                    .collect(),
            ),
            _ => (String::new(), Vec::new()),
        },
        _ => (String::new(), Vec::new()),
    };

    let sender_id = from.username.clone().unwrap_or_default();
    let sender_name = from
        .username
        .clone()
        .unwrap_or_else(|| from.first_name.clone());

    Some(InboundMessage {
        origin: Origin::Telegram {
            chat: DestinationId(msg.chat.id.0),
            user: DestinationId(from.id.0 as i64),
        },
        sender_id,
        sender_name,
        text,
        attachments,
    })
}

fn convert_update(update: Update) -> DestUpdate {
    let id = i64::from(update.id.0);
    let message = match update.kind {
        UpdateKind::Message(msg) => convert_message(&msg),
        other => {
            debug!("[Telegram] Ignoring non-message update: {:?}", other);
            None
        }
    };
    DestUpdate { id, message }
}

/// Poll `getUpdates` until the receiving side goes away.
async fn poll_updates(bot: Bot, updates: mpsc::UnboundedSender<DestUpdate>) {
    info!("[Telegram] Starting manual polling loop");
    let mut offset: i32 = 0;

    while !updates.is_closed() {
        let result = bot
            .get_updates()
            .offset(offset)
            .timeout(POLL_TIMEOUT_SECS)
            .allowed_updates(vec![AllowedUpdate::Message])
            .await;

        match result {
            Ok(batch) => {
                debug!(count = batch.len(), "[Telegram] Got updates");
                for update in batch {
                    offset = update.id.as_offset();
                    if updates.send(convert_update(update)).is_err() {
                        break;
                    }
                }
            }
            Err(RequestError::Api(ApiError::TerminatedByOtherGetUpdates)) => {
                error!("[Telegram] Another instance is polling with this token");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
            Err(e) => {
                warn!("[Telegram] getUpdates failed: {}", e);
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
        }
    }

    info!("[Telegram] Polling loop stopped");
}

#[async_trait]
impl DestPlatform for TelegramClient {
    async fn authenticate(&self) -> PlatformResult<Identity> {
        let me = self.bot.get_me().await?;
        Ok(Identity {
            id: me.user.id.to_string(),
            username: me.user.username.clone().unwrap_or_default(),
        })
    }

    fn updates(&self) -> BoxStream<'static, DestUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(poll_updates(self.bot.clone(), tx));
        stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|update| (update, rx))
        })
        .boxed()
    }

    async fn send(&self, chat: DestinationId, text: &str) -> PlatformResult<()> {
        self.bot.send_message(ChatId(chat.0), text).await?;
        Ok(())
    }

    async fn send_private(&self, user: DestinationId, text: &str) -> PlatformResult<()> {
        // A user's private chat shares the user's id.
        self.bot.send_message(ChatId(user.0), text).await?;
        Ok(())
    }

    async fn resolve_file_url(&self, file_id: &str) -> PlatformResult<String> {
        let file = self.bot.get_file(file_id).await?;
        Ok(format!(
            "https://api.telegram.org/file/bot{}/{}",
            self.bot.token(),
            file.path
        ))
    }
}

//! Interfaces the bridge needs from the two chat platforms.
//!
//! `gitter::GitterClient` and `telegram::TelegramClient` are the production
//! implementations. Both feeds are exposed as plain streams so the
//! forwarding loops stay simple consume-and-dispatch loops.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::common::error::PlatformResult;
use crate::common::{DestUpdate, DestinationId, Identity, InboundMessage};

/// Source side of the bridge (Gitter).
#[async_trait]
pub trait SourcePlatform: Send + Sync {
    async fn authenticate(&self) -> PlatformResult<Identity>;

    /// Open one subscription to the room's message feed. The stream ending
    /// means the connection closed.
    async fn open_stream(&self, room_id: &str) -> PlatformResult<BoxStream<'static, InboundMessage>>;

    async fn send(&self, room_id: &str, text: &str) -> PlatformResult<()>;
}

/// Destination side of the bridge (Telegram).
#[async_trait]
pub trait DestPlatform: Send + Sync {
    async fn authenticate(&self) -> PlatformResult<Identity>;

    /// Updates in arrival order, for the life of the process.
    fn updates(&self) -> BoxStream<'static, DestUpdate>;

    async fn send(&self, chat: DestinationId, text: &str) -> PlatformResult<()>;

    async fn send_private(&self, user: DestinationId, text: &str) -> PlatformResult<()>;

    /// Direct, time-limited download URL for a file.
    async fn resolve_file_url(&self, file_id: &str) -> PlatformResult<String>;
}

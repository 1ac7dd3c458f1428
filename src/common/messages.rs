//! Canonical message types for bridge communication.
//!
//! Both adapters convert their platform payloads into these types at the
//! boundary, so the router and the forwarding loops never see SDK types.

use std::time::Duration;

use crate::common::types::{DestinationId, Platform};

/// Where an inbound message came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// A Gitter room.
    Gitter { room_id: String },
    /// A Telegram chat. `user` is the sender's private chat.
    Telegram {
        chat: DestinationId,
        user: DestinationId,
    },
}

/// Telegram file reference attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_id: String,
}

/// Normalized view of a message event from either platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub origin: Origin,
    /// Username on the origin platform (empty if the user has none).
    pub sender_id: String,
    pub sender_name: String,
    /// Message text, or the caption for media messages.
    pub text: String,
    /// Ordered smallest to largest.
    pub attachments: Vec<Attachment>,
}

impl InboundMessage {
    pub fn platform(&self) -> Platform {
        match self.origin {
            Origin::Gitter { .. } => Platform::Gitter,
            Origin::Telegram { .. } => Platform::Telegram,
        }
    }
}

/// One update from the Telegram feed.
#[derive(Debug, Clone)]
pub struct DestUpdate {
    pub id: i64,
    /// `None` when the update has no message or no sender.
    pub message: Option<InboundMessage>,
}

/// Event produced by the stream supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    MessageReceived(InboundMessage),
    /// The stream closed. `closures` counts consecutive closures.
    /// `retry_in` is `None` once the retry ceiling is reached.
    ConnectionClosed {
        closures: u32,
        retry_in: Option<Duration>,
    },
}

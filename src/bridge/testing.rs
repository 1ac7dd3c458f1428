//! In-memory platforms for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc;

use crate::bridge::platform::{DestPlatform, SourcePlatform};
use crate::common::error::{PlatformError, PlatformResult};
use crate::common::{Attachment, DestUpdate, DestinationId, Identity, InboundMessage, Origin};

pub const ROOM: &str = "gitter-room";
pub const GROUP: DestinationId = DestinationId(-1001);

pub fn identity(username: &str) -> Identity {
    Identity {
        id: format!("id-{}", username),
        username: username.to_string(),
    }
}

pub fn gitter_message(sender: &str, text: &str) -> InboundMessage {
    InboundMessage {
        origin: Origin::Gitter {
            room_id: ROOM.to_string(),
        },
        sender_id: sender.to_string(),
        sender_name: sender.to_string(),
        text: text.to_string(),
        attachments: Vec::new(),
    }
}

pub fn telegram_message(chat: DestinationId, sender: &str, text: &str) -> InboundMessage {
    InboundMessage {
        origin: Origin::Telegram {
            chat,
            user: DestinationId(4242),
        },
        sender_id: sender.to_string(),
        sender_name: sender.to_string(),
        text: text.to_string(),
        attachments: Vec::new(),
    }
}

pub fn telegram_photo(chat: DestinationId, sender: &str, caption: &str, files: &[&str]) -> InboundMessage {
    let mut message = telegram_message(chat, sender, caption);
    message.attachments = files
        .iter()
        .map(|id| Attachment {
            file_id: id.to_string(),
        })
        .collect();
    message
}

fn setup_error(message: &str) -> PlatformError {
    PlatformError::Setup(message.to_string())
}

/// What each scripted `open_stream` call yields.
pub enum Connection {
    /// Opens and delivers these messages, then closes.
    Messages(Vec<InboundMessage>),
    /// Fails to open.
    Refused,
    /// Opens and never closes.
    Hang,
}

/// Scripted Gitter.
pub struct FakeSource {
    pub auth_fails: bool,
    connections: Mutex<VecDeque<Connection>>,
    pub opens: Mutex<u32>,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl FakeSource {
    pub fn new(connections: Vec<Connection>) -> Self {
        Self {
            auth_fails: false,
            connections: Mutex::new(connections.into()),
            opens: Mutex::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_auth() -> Self {
        Self {
            auth_fails: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn opens(&self) -> u32 {
        *self.opens.lock().unwrap()
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SourcePlatform for FakeSource {
    async fn authenticate(&self) -> PlatformResult<Identity> {
        if self.auth_fails {
            Err(setup_error("bad token"))
        } else {
            Ok(identity("gitgram-bot"))
        }
    }

    async fn open_stream(&self, _room_id: &str) -> PlatformResult<BoxStream<'static, InboundMessage>> {
        *self.opens.lock().unwrap() += 1;
        // An exhausted script refuses, which keeps the supervisor closing.
        let next = self.connections.lock().unwrap().pop_front();
        match next {
            Some(Connection::Messages(messages)) => Ok(stream::iter(messages).boxed()),
            Some(Connection::Hang) => Ok(stream::pending::<InboundMessage>().boxed()),
            Some(Connection::Refused) | None => Err(setup_error("connection refused")),
        }
    }

    async fn send(&self, room_id: &str, text: &str) -> PlatformResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((room_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Scripted Telegram. Updates are pushed through `updates_tx`.
pub struct FakeDest {
    updates_rx: Mutex<Option<mpsc::UnboundedReceiver<DestUpdate>>>,
    pub updates_tx: mpsc::UnboundedSender<DestUpdate>,
    pub file_urls: Mutex<Vec<(String, String)>>,
    pub sent: Mutex<Vec<(DestinationId, String)>>,
    pub private: Mutex<Vec<(DestinationId, String)>>,
    pub auth_fails: bool,
}

impl FakeDest {
    pub fn new() -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            updates_rx: Mutex::new(Some(updates_rx)),
            updates_tx,
            file_urls: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            private: Mutex::new(Vec::new()),
            auth_fails: false,
        }
    }

    pub fn with_file(self, file_id: &str, url: &str) -> Self {
        self.file_urls
            .lock()
            .unwrap()
            .push((file_id.to_string(), url.to_string()));
        self
    }

    pub fn push(&self, id: i64, message: Option<InboundMessage>) {
        // Receiver may already be gone in some tests.
        let _ = self.updates_tx.send(DestUpdate { id, message });
    }

    pub fn sent(&self) -> Vec<(DestinationId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn private(&self) -> Vec<(DestinationId, String)> {
        self.private.lock().unwrap().clone()
    }
}

#[async_trait]
impl DestPlatform for FakeDest {
    async fn authenticate(&self) -> PlatformResult<Identity> {
        if self.auth_fails {
            Err(setup_error("unauthorized"))
        } else {
            Ok(identity("GitgramBot"))
        }
    }

    fn updates(&self) -> BoxStream<'static, DestUpdate> {
        match self.updates_rx.lock().unwrap().take() {
            Some(rx) => stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|update| (update, rx))
            })
            .boxed(),
            None => stream::empty().boxed(),
        }
    }

    async fn send(&self, chat: DestinationId, text: &str) -> PlatformResult<()> {
        self.sent.lock().unwrap().push((chat, text.to_string()));
        Ok(())
    }

    async fn send_private(&self, user: DestinationId, text: &str) -> PlatformResult<()> {
        self.private.lock().unwrap().push((user, text.to_string()));
        Ok(())
    }

    async fn resolve_file_url(&self, file_id: &str) -> PlatformResult<String> {
        self.file_urls
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _)| id == file_id)
            .map(|(_, url)| url.clone())
            .ok_or_else(|| setup_error("file not found"))
    }
}
